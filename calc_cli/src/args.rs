//! Command-line arguments.

use std::path::PathBuf;

use calc_core::{CalculatorKind, Locale};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Everyday calculators: hCG doubling time, inflation, roofing and tile
#[derive(Parser, Debug)]
#[command(name = "reckon", version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (defaults to ./reckon.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available calculators
    List,

    /// Run a calculator
    Run(RunArgs),

    /// Print a reference table
    Reference {
        #[arg(value_enum)]
        table: ReferenceTable,
    },

    /// List the saved runs in a worksheet
    Worksheet {
        /// Worksheet file (.rkn)
        path: PathBuf,

        /// Recompute each entry with the current settings (not saved)
        #[arg(long)]
        rerun: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Calculator to run (hcg, inflation, roofing, tile)
    pub calculator: CalculatorKind,

    /// JSON input file: a full input record or a bare map of values
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Set an input value
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Tag a field with a unit (ft, in, yd, m, cm, mm)
    #[arg(short, long = "unit", value_name = "FIELD=UNIT", value_parser = parse_key_value)]
    pub unit: Vec<(String, String)>,

    /// Add an hCG blood draw
    #[arg(short, long = "draw", value_name = "DATE=LEVEL", value_parser = parse_key_value)]
    pub draw: Vec<(String, String)>,

    /// Output locale (en, es, pt, fr, de)
    #[arg(short, long)]
    pub locale: Option<Locale>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the run into this worksheet (created if missing)
    #[arg(long, value_name = "WORKSHEET")]
    pub save: Option<PathBuf>,

    /// Label for the saved run
    #[arg(long, requires = "save")]
    pub label: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceTable {
    /// US CPI-U annual averages
    Cpi,
    /// Typical hCG ranges by week
    Hcg,
    /// Roof pitch multipliers
    Pitch,
}

/// Split `KEY=VALUE` at the first `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("pitch=6/12"), Ok(("pitch".to_string(), "6/12".to_string())));
        assert_eq!(
            parse_key_value("2025-02-01T09:30=120"),
            Ok(("2025-02-01T09:30".to_string(), "120".to_string()))
        );
        assert!(parse_key_value("pitch").is_err());
        assert!(parse_key_value("=5").is_err());
    }

    #[test]
    fn test_run_command_parses() {
        let cli = Cli::try_parse_from([
            "reckon", "-vv", "run", "roofing", "--set", "length=40", "-s", "width=25", "--unit", "width=m", "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.calculator, CalculatorKind::Roofing);
                assert_eq!(args.set.len(), 2);
                assert_eq!(args.unit, vec![("width".to_string(), "m".to_string())]);
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_calculator_is_rejected() {
        assert!(Cli::try_parse_from(["reckon", "run", "mortgage"]).is_err());
        assert!(Cli::try_parse_from(["reckon", "run", "tile", "--label", "x"]).is_err());
    }

    #[test]
    fn test_worksheet_rerun_flag() {
        let cli = Cli::try_parse_from(["reckon", "worksheet", "garage.rkn", "--rerun"]).unwrap();
        match cli.command {
            Commands::Worksheet { path, rerun } => {
                assert_eq!(path, PathBuf::from("garage.rkn"));
                assert!(rerun);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
