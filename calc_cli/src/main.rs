//! # Reckon CLI
//!
//! Runs the calculators from the terminal:
//!
//! ```bash
//! reckon run roofing --set length=40 --set width=25 --set overhang=1 --set pitch=6/12
//! reckon run inflation --set amount=100 --set fromYear=1990 --set toYear=2025 --json
//! reckon run hcg --draw 2025-02-01=120 --draw 2025-02-03=260 --save pregnancy.rkn
//! reckon reference pitch
//! ```
//!
//! The exit status is non-zero when the input was not valid for the calculator.

mod args;
mod config;
mod logging;
mod render;
mod run;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use calc_core::file_io::{load_worksheet, load_worksheet_with_lock_check, save_worksheet, FileLock};
use calc_core::{CalcError, CalculationInput, CalculationResult, CalculatorKind, Worksheet, WorksheetEntry};
use clap::Parser;

use crate::args::{Cli, Commands, RunArgs};
use crate::config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let config =
        Config::load(cli.config.as_deref()).map_err(|e| anyhow::anyhow!("loading configuration: {e}"))?;
    logging::init(&config.logging, cli.verbose);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::List => {
            print!("{}", render::calculator_list());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(args) => run_calculator(&args, &config),
        Commands::Reference { table } => {
            print!("{}", render::reference(table, config.output.locale));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Worksheet { path, rerun } => {
            let (mut sheet, holder) = load_worksheet_with_lock_check(&path)?;
            if rerun {
                let flipped = sheet.rerun_all(&config.calculators);
                tracing::info!(path = %path.display(), flipped, "worksheet recomputed");
            }
            print!("{}", render::worksheet(&sheet, holder.as_ref()));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_calculator(args: &RunArgs, config: &Config) -> Result<ExitCode> {
    let input = run::build_input(args, &config.output)?;
    let result = args.calculator.evaluate(&input, &config.calculators);

    if let Some(path) = &args.save {
        let label = args
            .label
            .clone()
            .unwrap_or_else(|| args.calculator.display_name().to_string());
        save_run(path, args.calculator, label, input, result.clone(), config)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_valid {
        print!("{}", render::result(args.calculator, &result));
    } else {
        eprintln!("Enter valid input for the {}. Run with -vv to see what was rejected.", args.calculator.display_name());
    }

    Ok(if result.is_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Append a run to a worksheet under its lock, creating the worksheet if needed.
fn save_run(
    path: &Path,
    calculator: CalculatorKind,
    label: String,
    input: CalculationInput,
    result: CalculationResult,
    config: &Config,
) -> Result<()> {
    let _lock = FileLock::acquire(path, config.lock_user()).map_err(lock_failure)?;

    let mut sheet = if path.exists() {
        load_worksheet(path)?
    } else {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Worksheet".to_string());
        Worksheet::new(title)
    };

    let id = sheet.add_entry(WorksheetEntry::new(calculator, label, input, result));
    save_worksheet(&sheet, path)?;
    tracing::info!(path = %path.display(), %id, "run saved");
    Ok(())
}

/// Add a retry hint when the worksheet is held by another session.
fn lock_failure(err: CalcError) -> anyhow::Error {
    if err.is_recoverable() {
        anyhow::anyhow!("{err}; try again once the other session has closed it")
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_failure_hints_retry_only_when_locked() {
        let locked = lock_failure(CalcError::file_locked("garage.rkn", "sam@workshop", "2026-10-18T09:00:00Z"));
        assert!(locked.to_string().ends_with("try again once the other session has closed it"));

        let io = lock_failure(CalcError::file_error("create lock", "garage.rkn", "denied"));
        assert!(!io.to_string().contains("try again"));
        assert!(io.downcast_ref::<CalcError>().is_some());
    }
}
