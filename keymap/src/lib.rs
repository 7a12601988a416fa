pub mod ast;
pub mod combo;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::Node;
pub use combo::{Combo, ComboConfig, Rendered, extract_combos, render};
pub use error::{KeymapError, KeymapResult};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{Parser, parse, parse_definition, parse_source};

use std::path::Path;

use log::info;

/// Reads a keymap source file.
pub fn read_keymap(path: impl AsRef<Path>) -> KeymapResult<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| KeymapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the whole pipeline on `source`: tokenize, parse, extract, render.
pub fn generate(source: &str, config: &ComboConfig) -> KeymapResult<Rendered> {
    let tree = parse_source(source)?;
    let combos = extract_combos(&tree, config)?;
    info!("generated {} combos", combos.len());
    Ok(render(&combos, config))
}
