//! CLI surface: CSV in → stratified CSV sample out, plus a distribution
//! summary of the selection.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::constants::cli::{
    DEFAULT_ID_COLUMN, DEFAULT_MIN_PER_STRATUM, DEFAULT_SEED, DEFAULT_STRAT_COLUMNS,
};
use crate::metrics::column_breakdown;
use crate::sampler::{SamplePlan, stratified_sample};
use crate::transport::{read_units_csv, write_units_csv};

#[derive(Debug, Parser)]
#[command(
    name = "strata-pick",
    disable_help_subcommand = true,
    about = "Stratified sampler: CSV in, stratified CSV sample out",
    long_about = "Draw a fixed-size stratified random sample from a headered CSV, allocating the budget across strata proportionally to stratum size with a minimum per non-empty stratum."
)]
struct PickCli {
    #[arg(help = "Input CSV file path")]
    input_csv: PathBuf,
    #[arg(help = "Output CSV file path")]
    output_csv: PathBuf,
    #[arg(
        long = "target-n",
        value_parser = parse_positive_usize,
        help = "Total sample size you want (e.g. 160)"
    )]
    target_n: usize,
    #[arg(
        long = "id-col",
        default_value = DEFAULT_ID_COLUMN,
        help = "Unique ID column name"
    )]
    id_col: String,
    #[arg(
        long = "strat-cols",
        num_args = 1..,
        default_values_t = DEFAULT_STRAT_COLUMNS.map(String::from),
        help = "Stratification columns (space-separated)"
    )]
    strat_cols: Vec<String>,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Random seed")]
    seed: u64,
    #[arg(
        long = "min-per-stratum",
        default_value_t = DEFAULT_MIN_PER_STRATUM,
        help = "Minimum units per stratum"
    )]
    min_per_stratum: usize,
}

/// Run the picker over CLI-style arguments (program name excluded).
pub fn run_pick<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<PickCli, _>(std::iter::once("strata-pick".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let table = read_units_csv(&cli.input_csv)?;
    println!("Loaded {} rows from {}", table.len(), cli.input_csv.display());

    let plan = SamplePlan {
        id_column: cli.id_col,
        strat_columns: cli.strat_cols,
        target_n: cli.target_n,
        seed: cli.seed,
        min_per_stratum: cli.min_per_stratum,
    };
    let selection = stratified_sample(&table, &plan)?;

    write_units_csv(&cli.output_csv, &table.columns, &selection)?;
    println!(
        "\nSaved {} rows to {}",
        selection.len(),
        cli.output_csv.display()
    );

    print_selection_summary(&selection, &plan.strat_columns);
    Ok(())
}

fn print_selection_summary(selection: &[crate::data::Unit], strat_columns: &[String]) {
    if selection.is_empty() {
        println!("\nNo rows selected; nothing to summarise.");
        return;
    }
    for column in strat_columns {
        let Some(breakdown) = column_breakdown(selection, column) else {
            continue;
        };
        println!("\nBy {column}:");
        for entry in &breakdown.values {
            println!(
                "  {}: {} ({:.1}%)",
                entry.value,
                entry.count,
                entry.share * 100.0
            );
        }
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --target-n value '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("--target-n must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_usize_rejects_zero_and_junk() {
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("ten").is_err());
        assert_eq!(parse_positive_usize("160"), Ok(160));
    }

    #[test]
    fn cli_defaults_match_plan_defaults() {
        let cli = PickCli::try_parse_from([
            "strata-pick",
            "in.csv",
            "out.csv",
            "--target-n",
            "10",
        ])
        .expect("valid args");
        let plan = SamplePlan::default();
        assert_eq!(cli.id_col, plan.id_column);
        assert_eq!(cli.strat_cols, plan.strat_columns);
        assert_eq!(cli.seed, plan.seed);
        assert_eq!(cli.min_per_stratum, plan.min_per_stratum);
    }

    #[test]
    fn target_n_is_required() {
        let parsed = PickCli::try_parse_from(["strata-pick", "in.csv", "out.csv"]);
        assert!(parsed.is_err());
    }
}
