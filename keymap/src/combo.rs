//! Derives two-key combos from a parsed keymap.
//!
//! The keymap is expected to be a single call whose arguments are the layers,
//! each layer being a `LAYOUT*(...)` call with one argument per matrix
//! position. For every ordered pair `(i, j)` of home-row positions, the key
//! at `i` on the base layer is treated as a layer toggle: pressing `i` and `j`
//! together produces whatever sits at `j` on the layer `i` switches to.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::{debug, trace};

use crate::ast::Node;
use crate::error::KeymapResult;
use crate::malformed;

/// Adjustable constants of the extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboConfig {
    /// Matrix positions eligible to take part in combos.
    pub home_row: Vec<usize>,
    /// Callee name of layer-tap entries, e.g. `LT(8, KC_F)`.
    pub toggle_marker: String,
    /// Subtracted from a toggle's first argument to get the layer index.
    pub layer_offset: i64,
    /// Key code meaning "fall through"; combos producing it are dropped.
    pub transparent: String,
    /// Prefix every layer's callee must start with.
    pub layout_prefix: String,
    /// Prefix of the generated combo array names.
    pub combo_prefix: String,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            home_row: (15..=18).chain(53..=56).collect(),
            toggle_marker: "LT".to_string(),
            layer_offset: 7,
            transparent: "KC_TRANSPARENT".to_string(),
            layout_prefix: "LAYOUT".to_string(),
            combo_prefix: "_combo_".to_string(),
        }
    }
}

/// Two keys pressed together producing `result`.
///
/// `participants` keeps the order the keys were found in, which is the order
/// they are written out in. Equality ignores that order.
#[derive(Debug, Clone)]
pub struct Combo {
    pub participants: [String; 2],
    pub result: String,
}

impl Combo {
    fn sorted(&self) -> [&str; 2] {
        let [a, b] = &self.participants;
        if a <= b {
            [a.as_str(), b.as_str()]
        } else {
            [b.as_str(), a.as_str()]
        }
    }
}

impl PartialEq for Combo {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted() && self.result == other.result
    }
}

impl Eq for Combo {}

impl Hash for Combo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
        self.result.hash(state);
    }
}

/// The layers of a keymap: the arguments of the root call.
pub fn layers(root: &Node) -> KeymapResult<&[Node]> {
    root.as_call()
        .map(|(_, args)| args)
        .ok_or_else(|| malformed!("expected the keymap to be a call, found {}", root.describe()))
}

/// Per-position entries of a layer.
pub fn layer_keys<'n>(layer: &'n Node, config: &ComboConfig) -> KeymapResult<&'n [Node]> {
    match layer.as_call() {
        Some((callee, args)) if callee.starts_with(&config.layout_prefix) => Ok(args),
        Some((callee, _)) => Err(malformed!(
            "expected a {}* layer, found a call to {callee}",
            config.layout_prefix
        )),
        None => Err(malformed!(
            "expected a {}* layer, found {}",
            config.layout_prefix,
            layer.describe()
        )),
    }
}

/// The key code an entry emits.
///
/// A bare identifier is its own key code. A toggle emits the key code of its
/// second argument; any other call (mod-taps, modifiers) that of its last.
pub fn key_code<'n>(entry: &'n Node, config: &ComboConfig) -> KeymapResult<&'n str> {
    match entry {
        Node::VarRef(name) => Ok(name.as_str()),
        Node::Call { callee, args } if *callee == config.toggle_marker => {
            let tapped = args
                .get(1)
                .ok_or_else(|| malformed!("{callee} needs two arguments, got {}", args.len()))?;
            key_code(tapped, config)
        }
        Node::Call { callee, args } => {
            let last = args
                .last()
                .ok_or_else(|| malformed!("{callee}() has no key code argument"))?;
            key_code(last, config)
        }
        other => Err(malformed!("expected a key entry, found {}", other.describe())),
    }
}

/// The layer a toggle entry switches to, or `None` for any other entry.
pub fn layer_target(entry: &Node, config: &ComboConfig) -> KeymapResult<Option<usize>> {
    let Some((callee, args)) = entry.as_call() else {
        return Ok(None);
    };
    if callee != config.toggle_marker {
        return Ok(None);
    }

    let raw = args
        .first()
        .and_then(Node::as_integer)
        .ok_or_else(|| malformed!("{callee} needs an integer layer as first argument"))?;
    let layer = raw
        .checked_sub(config.layer_offset)
        .ok_or_else(|| malformed!("{callee}({raw}, ..) layer offset overflows"))?;

    // negative layers are an error, not counted from the last layer
    usize::try_from(layer)
        .map(Some)
        .map_err(|_| malformed!("{callee}({raw}, ..) points to negative layer {layer}"))
}

fn entry_at<'n>(keys: &'n [Node], position: usize, layer: usize) -> KeymapResult<&'n Node> {
    keys.get(position).ok_or_else(|| {
        malformed!(
            "layer {layer} has {} keys, no key at position {position}",
            keys.len()
        )
    })
}

/// Computes the deduplicated combos of `root`, in first-seen order.
pub fn extract_combos(root: &Node, config: &ComboConfig) -> KeymapResult<Vec<Combo>> {
    let layers = layers(root)?;
    let base_layer = layers
        .first()
        .ok_or_else(|| malformed!("keymap has no layers"))?;
    let base = layer_keys(base_layer, config)?;
    debug!("keymap has {} layers, {} keys on the base layer", layers.len(), base.len());

    let mut seen = HashSet::new();
    let mut combos = Vec::new();

    for &i in &config.home_row {
        for &j in &config.home_row {
            let left_entry = entry_at(base, i, 0)?;
            let left = key_code(left_entry, config)?;
            let right = key_code(entry_at(base, j, 0)?, config)?;

            // entries that do not toggle stay on the base layer
            let layer = layer_target(left_entry, config)?.unwrap_or(0);
            let target = layers.get(layer).ok_or_else(|| {
                malformed!("position {i} switches to layer {layer}, but there are {} layers", layers.len())
            })?;
            let becomes = key_code(entry_at(layer_keys(target, config)?, j, layer)?, config)?;

            if becomes == config.transparent || left == right {
                trace!("({i}, {j}) {left}+{right} -> {becomes}: dropped");
                continue;
            }

            let combo = Combo {
                participants: [left.to_string(), right.to_string()],
                result: becomes.to_string(),
            };
            if seen.insert(combo.clone()) {
                trace!("({i}, {j}) {left}+{right} -> {becomes}");
                combos.push(combo);
            }
        }
    }

    debug!("extracted {} combos", combos.len());
    Ok(combos)
}

/// Generated source for a list of combos: declarations and registrations,
/// line `n` of one referring to line `n` of the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub declarations: String,
    pub registrations: String,
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.declarations)?;
        writeln!(f, "{}", self.registrations)
    }
}

pub fn render(combos: &[Combo], config: &ComboConfig) -> Rendered {
    let (declarations, registrations): (Vec<_>, Vec<_>) = combos
        .iter()
        .enumerate()
        .map(|(n, combo)| {
            let name = format!("{}{n}", config.combo_prefix);
            let [a, b] = &combo.participants;
            (
                format!("const uint16_t PROGMEM {name}[] = {{{a}, {b}, COMBO_END}};"),
                format!("COMBO({name}, {}),", combo.result),
            )
        })
        .unzip();

    Rendered {
        declarations: declarations.join("\n"),
        registrations: registrations.join("\n"),
    }
}
