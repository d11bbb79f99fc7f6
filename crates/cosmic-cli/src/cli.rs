//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use cosmic_model::FileFormat;

use cosmic_cli::config::{self, OptionOverrides};

#[derive(Parser)]
#[command(
    name = "cosmic",
    version,
    about = "Normalize, standardize and score astronomical data files",
    long_about = "Normalize CSV, FITS and HDF5 files into one record shape.\n\n\
                  Maps column names onto canonical fields, flags outliers and spatial\n\
                  clusters, predicts missing values and scores overall data quality."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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
    /// Run the full pipeline over one file and emit the enriched envelope.
    Analyze(AnalyzeArgs),

    /// Map column names onto canonical fields.
    Standardize(StandardizeArgs),

    /// List canonical fields and their synonyms.
    Dictionary,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Data file (.csv, .fits, .fit, .fts, .h5, .hdf5).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Container format (default: detected from the extension).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// TOML file with pipeline options.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Seed for the isolation forest.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Fraction of records flagged as outliers (0.0 to 0.5).
    #[arg(long = "contamination")]
    pub contamination: Option<f64>,

    /// Write the enriched envelope here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Skip the run summary tables.
    #[arg(long = "no-summary")]
    pub no_summary: bool,
}

#[derive(Args)]
pub struct StandardizeArgs {
    /// Column names to map.
    #[arg(value_name = "COLUMN", required = true)]
    pub columns: Vec<String>,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

/// Standardizer flags shared by `analyze` and `standardize`.
#[derive(Args)]
pub struct MappingArgs {
    /// Force a rename, e.g. `--override MAG_G=brightness` (repeatable).
    #[arg(long = "override", value_name = "ORIGINAL=STANDARD", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Minimum fuzzy similarity (percent) for a match.
    #[arg(long = "threshold", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,
}

fn parse_override(raw: &str) -> Result<(String, String), String> {
    config::parse_override(raw).map_err(|error| error.to_string())
}

impl AnalyzeArgs {
    pub fn option_overrides(&self) -> OptionOverrides {
        OptionOverrides {
            overrides: self.mapping.overrides.clone(),
            threshold: self.mapping.threshold,
            seed: self.seed,
            contamination: self.contamination,
        }
    }
}

impl StandardizeArgs {
    pub fn option_overrides(&self) -> OptionOverrides {
        OptionOverrides {
            overrides: self.mapping.overrides.clone(),
            threshold: self.mapping.threshold,
            ..OptionOverrides::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Fits,
    Hdf5,
}

impl From<FormatArg> for FileFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => FileFormat::Tabular,
            FormatArg::Fits => FileFormat::BinaryTableOrImage,
            FormatArg::Hdf5 => FileFormat::Hierarchical,
        }
    }
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
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags() {
        let cli = Cli::try_parse_from([
            "cosmic",
            "analyze",
            "stars.fits",
            "--override",
            "MAG_G=brightness",
            "--threshold",
            "70",
            "--seed",
            "9",
            "--pretty",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let overrides = args.option_overrides();
        assert_eq!(
            overrides.overrides,
            vec![("MAG_G".to_string(), "brightness".to_string())]
        );
        assert_eq!(overrides.threshold, Some(70));
        assert_eq!(overrides.seed, Some(9));
        assert!(args.pretty);
    }

    #[test]
    fn rejects_bad_override_and_threshold() {
        assert!(Cli::try_parse_from(["cosmic", "standardize", "ra", "--override", "ra"]).is_err());
        assert!(Cli::try_parse_from(["cosmic", "standardize", "ra", "--threshold", "101"]).is_err());
        assert!(Cli::try_parse_from(["cosmic", "standardize"]).is_err());
    }
}
