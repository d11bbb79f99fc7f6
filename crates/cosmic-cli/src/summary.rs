use std::fmt::Write as _;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cosmic_cli::pipeline::PipelineRun;
use cosmic_map::SYNONYMS;
use cosmic_model::{
    AnomalyOutcome, CheckStatus, EnrichedEnvelope, GapType, MappingMethod, Stage,
    StandardizationResult,
};

/// Stage table, quality checks and insights for one run.
pub fn render_summary(run: &PipelineRun) -> String {
    let enriched = &run.enriched;
    let envelope = &enriched.envelope;
    let mut out = String::new();
    let _ = writeln!(out, "File: {} ({})", envelope.filename, envelope.format);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Result"),
        header_cell("Time (ms)"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for timing in &run.timings {
        table.add_row(vec![
            Cell::new(timing.stage.as_str()).add_attribute(Attribute::Bold),
            stage_result_cell(timing.stage, enriched),
            dim_cell(timing.elapsed.as_millis()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(run.elapsed().as_millis()).add_attribute(Attribute::Bold),
    ]);
    let _ = writeln!(out, "{table}");

    if let Some(report) = &enriched.quality_report {
        let mut checks = Table::new();
        checks.set_header(vec![header_cell("Quality check"), header_cell("Status")]);
        apply_table_style(&mut checks);
        align_column(&mut checks, 1, CellAlignment::Center);
        for check in &report.checks {
            checks.add_row(vec![Cell::new(&check.label), status_cell(check.status)]);
        }
        let _ = writeln!(out, "Quality score: {}/100", report.score);
        let _ = writeln!(out, "{checks}");
    }

    if let Some(result) = enriched.ai_analysis.as_ref().and_then(AnomalyOutcome::result)
        && !result.insights.is_empty()
    {
        let _ = writeln!(out, "Insights:");
        for insight in &result.insights {
            let _ = writeln!(out, "- {insight}");
        }
    }
    out
}

fn stage_result_cell(stage: Stage, enriched: &EnrichedEnvelope) -> Cell {
    let envelope = &enriched.envelope;
    match stage {
        Stage::Normalization => Cell::new(format!(
            "{} preview rows, {} columns",
            envelope.preview.len(),
            envelope.columns.len()
        )),
        Stage::Standardization => match &enriched.standardization {
            Some(result) => Cell::new(format!(
                "{}/{} columns mapped",
                result.matched_count(),
                result.log.len()
            )),
            None => dim_cell("-"),
        },
        Stage::AnomalyDetection => match enriched.ai_analysis.as_ref() {
            Some(AnomalyOutcome::Analyzed(result)) => {
                let cell = Cell::new(format!(
                    "{} outliers, {} clusters",
                    result.outlier_ids.len(),
                    result.cluster_count()
                ));
                if result.outlier_ids.is_empty() {
                    cell
                } else {
                    cell.fg(Color::Yellow)
                }
            }
            Some(AnomalyOutcome::Insufficient { error }) => dim_cell(error),
            None => dim_cell("-"),
        },
        Stage::Imputation => match &enriched.predictions {
            Some(report) => Cell::new(format!(
                "{} predictions ({})",
                report.predictions.len(),
                gap_label(report.gap_type)
            )),
            None => Cell::new("no gaps").fg(Color::Green),
        },
        Stage::QualityScoring => match &enriched.quality_report {
            Some(report) => Cell::new(format!("score {}/100", report.score))
                .fg(score_color(report.score))
                .add_attribute(Attribute::Bold),
            None => dim_cell("-"),
        },
    }
}

/// Mapping log as a table.
pub fn mapping_table(result: &StandardizationResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Standard"),
        header_cell("Method"),
        header_cell("Confidence"),
        header_cell("Closest key"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in &result.log {
        let method = match entry.method {
            MappingMethod::Override => Cell::new("override").fg(Color::Blue),
            MappingMethod::DictionaryExact => Cell::new("dictionary_exact").fg(Color::Green),
            MappingMethod::FuzzyMatch => Cell::new("fuzzy_match").fg(Color::Yellow),
            MappingMethod::NoMatch => dim_cell("no_match"),
        };
        table.add_row(vec![
            Cell::new(&entry.original),
            Cell::new(&entry.standard).add_attribute(Attribute::Bold),
            method,
            Cell::new(entry.confidence),
            entry
                .matched_key
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table
}

/// Canonical fields with their synonyms.
pub fn dictionary_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Synonyms")]);
    apply_table_style(&mut table);
    for (field, synonyms) in SYNONYMS {
        table.add_row(vec![
            Cell::new(*field)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(synonyms.join(", ")),
        ]);
    }
    table
}

fn gap_label(gap_type: GapType) -> &'static str {
    match gap_type {
        GapType::NoGaps => "none",
        GapType::Sequential => "sequential",
        GapType::Unordered => "unordered",
    }
}

fn score_color(score: u8) -> Color {
    match score {
        80..=100 => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    }
}

fn status_cell(status: CheckStatus) -> Cell {
    match status {
        CheckStatus::Pass => Cell::new("PASS").fg(Color::Green),
        CheckStatus::Warn => Cell::new("WARN").fg(Color::Yellow),
        CheckStatus::Fail => Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use cosmic_cli::pipeline::{PipelineInput, run_pipeline};
    use cosmic_map::ColumnStandardizer;
    use cosmic_model::PipelineOptions;

    use super::*;

    #[test]
    fn summary_lists_every_stage() {
        let csv = "ra,dec,flux\n1,2,3\n4,5,6\n";
        let input = PipelineInput {
            filename: "tiny.csv",
            bytes: csv.as_bytes(),
            format: None,
        };
        let run = run_pipeline(&input, &PipelineOptions::default()).unwrap();
        let text = render_summary(&run);
        for stage in ["normalization", "standardization", "anomaly_detection", "imputation"] {
            assert!(text.contains(stage), "{stage} missing from\n{text}");
        }
        assert!(text.contains("Insufficient data for analysis"));
        assert!(text.contains("Quality score:"));
    }

    #[test]
    fn mapping_table_has_one_row_per_column() {
        let result = ColumnStandardizer::default().standardize(&["RA", "mystery"]);
        assert_eq!(mapping_table(&result).row_iter().count(), 2);
        assert!(dictionary_table().row_iter().count() >= 5);
    }
}
