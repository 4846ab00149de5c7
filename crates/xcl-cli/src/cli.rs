//! CLI argument definitions for xclusion.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "xclusion",
    version,
    about = "Select samples from a metadata table by inclusion/exclusion criteria",
    long_about = "Select samples from a metadata table by inclusion/exclusion criteria.\n\n\
                  Criteria run in three phases (init, add, filter). Writes the included\n\
                  and excluded samples and an interactive HTML visualization."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply criteria to a metadata table and write the selection.
    Run(RunArgs),

    /// Print the inferred dtype of every metadata variable.
    Dtypes(DtypesArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Metadata table (tab, semicolon or comma separated; first column is the sample id).
    #[arg(short = 'm', long = "m-metadata-file", value_name = "PATH")]
    pub metadata_file: PathBuf,

    /// YAML file with `init`, `add`, `filter` and `no_nan` criteria.
    #[arg(short = 'c', long = "i-criteria", value_name = "PATH")]
    pub criteria: Option<PathBuf>,

    /// Filter criterion as VARIABLE MODE VALUES, values separated by "/".
    ///
    /// MODE is 0 (exclude), 1 (include) or 2 (min/max range, e.g. "20/None").
    /// Repeat for several criteria.
    #[arg(
        short = 'p',
        long = "p-criterion",
        num_args = 3,
        value_names = ["VARIABLE", "MODE", "VALUES"],
        action = clap::ArgAction::Append
    )]
    pub criterion: Vec<String>,

    /// YAML file of plot groups (`categories: [...]` limits the bar panel).
    #[arg(short = 'z', long = "i-plot-groups", value_name = "PATH")]
    pub plot_groups: Option<PathBuf>,

    /// Output table of included samples.
    #[arg(short = 'i', long = "o-included", value_name = "PATH")]
    pub included: PathBuf,

    /// Output table of excluded samples.
    #[arg(short = 'e', long = "o-excluded", value_name = "PATH")]
    pub excluded: Option<PathBuf>,

    /// Output visualization (".html" is appended when missing).
    #[arg(short = 'o', long = "o-visualization", value_name = "PATH")]
    pub visualization: PathBuf,

    /// Replace the built-in null vocabulary (one token per line).
    #[arg(long = "nulls-file", value_name = "PATH")]
    pub nulls_file: Option<PathBuf>,

    /// Apply criteria and print the summary without writing outputs.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct DtypesArgs {
    /// Metadata table to inspect.
    #[arg(short = 'm', long = "m-metadata-file", value_name = "PATH")]
    pub metadata_file: PathBuf,

    /// Replace the built-in null vocabulary (one token per line).
    #[arg(long = "nulls-file", value_name = "PATH")]
    pub nulls_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_criteria_are_collected_in_triples() {
        let cli = Cli::try_parse_from([
            "xclusion", "run", "-m", "meta.tsv", "-i", "in.tsv", "-o", "vis",
            "-p", "age", "2", "20/None", "-p", "abx", "0", "Yes",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.criterion, vec!["age", "2", "20/None", "abx", "0", "Yes"]);
        assert!(args.excluded.is_none());
        assert!(!args.dry_run);
    }
}
