use keymap::combo::{key_code, layer_keys, layer_target, layers};
use keymap::{ComboConfig, Node, TokenKind, extract_combos, generate, parse_source, tokenize};

const KEYS_PER_LAYER: usize = 60;

/// Builds a three layer keymap in which every default home-row position of
/// the base layer is a layer-tap: the left hand (15-18) switches to layer 1,
/// the right hand (53-56) to layer 2.
fn canonical_keymap() -> String {
    const LETTERS: [&str; 8] = ["KC_A", "KC_S", "KC_D", "KC_F", "KC_J", "KC_K", "KC_L", "KC_SCLN"];
    const SYMBOLS: [&str; 8] = [
        "KC_EXLM", "KC_AT", "KC_HASH", "KC_DLR", "KC_PERC", "KC_CIRC", "KC_AMPR", "KC_ASTR",
    ];
    const NAV: [&str; 8] = [
        "KC_LEFT", "KC_DOWN", "KC_UP", "KC_RGHT", "KC_HOME", "KC_PGDN", "KC_PGUP", "KC_END",
    ];

    let home = ComboConfig::default().home_row;
    let slot = |p: usize| home.iter().position(|&h| h == p);

    let base: Vec<String> = (0..KEYS_PER_LAYER)
        .map(|p| match slot(p) {
            Some(n) if n < 4 => format!("LT(8, {})", LETTERS[n]),
            Some(n) => format!("LT(9, {})", LETTERS[n]),
            None => "KC_NO".to_string(),
        })
        .collect();
    let symbols: Vec<String> = (0..KEYS_PER_LAYER)
        .map(|p| slot(p).map_or("KC_TRANSPARENT", |n| SYMBOLS[n]).to_string())
        .collect();
    let nav: Vec<String> = (0..KEYS_PER_LAYER)
        .map(|p| match slot(p) {
            // the right hand's own keys stay transparent on its layer
            Some(n) if n < 4 => NAV[n],
            _ => "KC_TRANSPARENT",
        }
        .to_string())
        .collect();

    format!(
        "keymaps(\n  LAYOUT_ergodox({}),\n  LAYOUT_ergodox({}),\n  LAYOUT_ergodox({})\n)\n",
        base.join(", "),
        symbols.join(", "),
        nav.join(", ")
    )
}

#[test]
fn definition_tokens() {
    let kinds: Vec<TokenKind> = tokenize("def f(a,b) g(a,b) end")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();

    use TokenKind::*;
    assert_eq!(
        kinds,
        vec![
            Def, Identifier, LeftParen, Identifier, Comma, Identifier, RightParen, Identifier,
            LeftParen, Identifier, Comma, Identifier, RightParen, End,
        ]
    );
}

#[test]
fn canonical_home_row_entries_are_all_toggles() {
    let config = ComboConfig::default();
    let tree = parse_source(&canonical_keymap()).unwrap();
    let base = layer_keys(&layers(&tree).unwrap()[0], &config).unwrap();

    for &p in &config.home_row {
        assert!(
            layer_target(&base[p], &config).unwrap().is_some(),
            "position {p} is not a layer-tap"
        );
    }
}

#[test]
fn canonical_combos() {
    let config = ComboConfig::default();
    let tree = parse_source(&canonical_keymap()).unwrap();
    let combos = extract_combos(&tree, &config).unwrap();

    // left hand: 4 x 7 partners land on the symbol layer, all opaque;
    // right hand: only the 4 left-hand partners are opaque on the nav layer
    assert_eq!(combos.len(), 4 * 7 + 4 * 4);

    let first = &combos[0];
    assert_eq!(first.participants, ["KC_A".to_string(), "KC_S".to_string()]);
    assert_eq!(first.result, "KC_AT");

    let j_with_a = combos
        .iter()
        .find(|c| c.participants == ["KC_J".to_string(), "KC_A".to_string()])
        .unwrap();
    assert_eq!(j_with_a.result, "KC_LEFT");

    assert!(combos.iter().all(|c| c.result != "KC_TRANSPARENT"));
    assert!(combos.iter().all(|c| c.participants[0] != c.participants[1]));

    let layers = layers(&tree).unwrap();
    let nav = layer_keys(&layers[2], &config).unwrap();
    assert_eq!(key_code(&nav[15], &config).unwrap(), "KC_LEFT");
}

#[test]
fn generate_blocks_align() {
    let rendered = generate(&canonical_keymap(), &ComboConfig::default()).unwrap();
    let declarations: Vec<&str> = rendered.declarations.lines().collect();
    let registrations: Vec<&str> = rendered.registrations.lines().collect();

    assert_eq!(declarations.len(), registrations.len());
    assert_eq!(declarations.len(), 44);
    for (n, (decl, reg)) in declarations.iter().zip(&registrations).enumerate() {
        assert!(decl.starts_with(&format!("const uint16_t PROGMEM _combo_{n}[] = {{")));
        assert!(decl.ends_with(", COMBO_END};"));
        assert!(reg.starts_with(&format!("COMBO(_combo_{n}, ")));
    }
}

#[test]
fn tree_round_trips_through_display() {
    let tree = parse_source(&canonical_keymap()).unwrap();
    assert_eq!(parse_source(&tree.to_string()).unwrap(), tree);
    assert!(matches!(tree, Node::Call { ref callee, ref args } if callee == "keymaps" && args.len() == 3));
}
