use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use cosmic_cli::config::{apply_overrides, load_options};
use cosmic_cli::pipeline::{PipelineInput, PipelineRun, run_pipeline};
use cosmic_map::ColumnStandardizer;
use cosmic_model::{AnomalyOutcome, EnrichedEnvelope, PipelineOptions};
use tracing::info;

use crate::cli::{AnalyzeArgs, StandardizeArgs};
use crate::summary::{dictionary_table, mapping_table, render_summary};

pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let options = load_options(args.config.as_deref())?;
    let options = apply_overrides(options, &args.option_overrides());

    let bytes = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map_or_else(|| args.file.to_string_lossy(), |name| name.to_string_lossy());
    let input = PipelineInput {
        filename: &filename,
        bytes: &bytes,
        format: args.format.map(Into::into),
    };
    let run = run_pipeline(&input, &options)?;

    let json = to_json(&run.enriched, args.pretty)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote enriched envelope");
            if !args.no_summary {
                print!("{}", render_summary(&run));
            }
        }
        None => {
            // stdout carries the JSON document, so the summary goes to stderr
            if !args.no_summary {
                eprint!("{}", render_summary(&run));
            }
            write_stdout(&json)?;
        }
    }
    log_outcome(&run);
    Ok(())
}

pub fn run_standardize(args: &StandardizeArgs) -> Result<()> {
    let options = apply_overrides(PipelineOptions::default(), &args.option_overrides());
    let result = ColumnStandardizer::new(&options.standardizer).standardize(&args.columns);
    println!("{}", mapping_table(&result));
    Ok(())
}

pub fn run_dictionary() -> Result<()> {
    println!("{}", dictionary_table());
    Ok(())
}

fn to_json(enriched: &EnrichedEnvelope, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(enriched)
    } else {
        serde_json::to_string(enriched)
    };
    json.context("serialize enriched envelope")
}

fn write_stdout(json: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("write stdout")?;
    stdout.flush().context("flush stdout")
}

fn log_outcome(run: &PipelineRun) {
    let enriched = &run.enriched;
    info!(
        filename = %enriched.envelope.filename,
        score = enriched.quality_report.as_ref().map(|report| report.score),
        outliers = enriched
            .ai_analysis
            .as_ref()
            .map_or(0, AnomalyOutcome::outlier_count),
        elapsed_ms = run.elapsed().as_millis(),
        "analysis complete"
    );
}
