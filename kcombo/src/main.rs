use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use keymap::{ComboConfig, parse_source, read_keymap, tokenize};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kcombo", version, about = "keymap combo generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print combo declarations followed by combo registrations
    Generate {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        combo: ComboArgs,
    },
    /// Print the tokens of the keymap, one per line
    Tokens {
        #[command(flatten)]
        input: Input,
    },
    /// Print the parsed keymap expression
    Tree {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// the keymap source file
    #[arg(short, long, default_value = "keymap.c")]
    input: PathBuf,
}

#[derive(Args)]
struct ComboArgs {
    /// home-row matrix positions, e.g. `15-18,53-56`
    #[arg(long, value_parser = parse_home_row, default_value = "15-18,53-56")]
    home_row: HomeRow,

    /// callee name of layer-tap keys
    #[arg(long, default_value = "LT")]
    toggle: String,

    /// subtracted from a layer-tap's first argument to get the layer index
    #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
    layer_offset: i64,

    /// key code whose combos are dropped
    #[arg(long, default_value = "KC_TRANSPARENT")]
    transparent: String,

    /// prefix of the layer macro names
    #[arg(long, default_value = "LAYOUT")]
    layout_prefix: String,

    /// prefix of the generated combo array names
    #[arg(long, default_value = "_combo_")]
    combo_prefix: String,
}

#[derive(Clone, Debug)]
struct HomeRow(Vec<usize>);

impl From<ComboArgs> for ComboConfig {
    fn from(args: ComboArgs) -> Self {
        ComboConfig {
            home_row: args.home_row.0,
            toggle_marker: args.toggle,
            layer_offset: args.layer_offset,
            transparent: args.transparent,
            layout_prefix: args.layout_prefix,
            combo_prefix: args.combo_prefix,
        }
    }
}

/// Accepts comma separated positions or inclusive `a-b` ranges.
fn parse_home_row(value: &str) -> Result<HomeRow> {
    let mut positions = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().with_context(|| format!("bad range start in `{part}`"))?;
                let end: usize = end.trim().parse().with_context(|| format!("bad range end in `{part}`"))?;
                if start > end {
                    bail!("empty range `{part}`");
                }
                positions.extend(start..=end);
            }
            None => positions.push(part.parse().with_context(|| format!("bad position `{part}`"))?),
        }
    }
    if positions.is_empty() {
        bail!("no home-row positions given");
    }
    Ok(HomeRow(positions))
}

fn read(input: &Input) -> Result<String> {
    debug!("reading {}", input.input.display());
    read_keymap(&input.input).context("failed to load keymap")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Commands::Generate { input, combo } => {
            let source = read(&input)?;
            let config = ComboConfig::from(combo);
            debug!("home row: {:?}", config.home_row);
            let rendered = keymap::generate(&source, &config).context("failed to generate combos")?;
            print!("{rendered}");
        }
        Commands::Tokens { input } => {
            let source = read(&input)?;
            for token in tokenize(&source).context("failed to tokenize")? {
                println!("{:?} {}", token.kind, token.text);
            }
        }
        Commands::Tree { input } => {
            let source = read(&input)?;
            let tree = parse_source(&source).context("failed to parse")?;
            println!("{tree}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_ranges() {
        assert_eq!(parse_home_row("15-18,53-56").unwrap().0, vec![15, 16, 17, 18, 53, 54, 55, 56]);
        assert_eq!(parse_home_row("3, 1,7-8").unwrap().0, vec![3, 1, 7, 8]);
        assert!(parse_home_row("4-2").is_err());
        assert!(parse_home_row("x").is_err());
        assert!(parse_home_row("").is_err());
    }
}
