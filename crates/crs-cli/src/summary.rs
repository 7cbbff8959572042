use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::DataFrame;

use crs_common::any_to_string;
use crs_model::{Decision, FeatureDescription};
use crs_score::{DECISION, PROB_DEFAULT, summary_columns};
use crs_transform::{ImputationStatus, TransformReport};

use crate::commands::{BatchResult, FeaturesResult, PredictResult};

pub fn print_prediction(result: &PredictResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    for (name, value) in result.record.iter() {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("{table}");
    println!(
        "Probability of default: {}",
        percent(result.score.probability)
    );
    println!(
        "Decision: {} (threshold {})",
        decision_label(result.score.decision),
        result.threshold
    );
    println!("Model: sha256 {}", result.model_sha256);
    print_transform_report(&result.score.report);
}

pub fn print_batch(result: &BatchResult) {
    println!("Input: {}", result.input.display());
    println!("Preview ({} rows):", result.preview.height());
    print_frame(&result.preview);

    let frame = &result.scored.frame;
    let columns = summary_columns(frame);
    let mut table = Table::new();
    table.set_header(columns.iter().map(|name| header_cell(name)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for (index, name) in columns.iter().enumerate() {
        if *name == PROB_DEFAULT || *name == DECISION {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    for row in 0..frame.height() {
        let cells = columns
            .iter()
            .map(|name| match *name {
                PROB_DEFAULT => Cell::new(percent(result.scored.probabilities[row])),
                DECISION => decision_cell(result.scored.decisions[row]),
                _ => Cell::new(frame_cell(frame, name, row)),
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    println!("{table}");
    println!(
        "Scored {} applicants: {} approved, {} rejected (threshold {})",
        result.scored.decisions.len(),
        result.scored.approved(),
        result.scored.rejected(),
        result.threshold
    );
    println!("Report: {}", result.report_path.display());
    print_transform_report(&result.scored.report);
}

pub fn print_features(result: &FeaturesResult) {
    match result {
        FeaturesResult::All(entries) => {
            let mut table = Table::new();
            table.set_header(vec![
                header_cell("#"),
                header_cell("Feature"),
                header_cell("Category"),
                header_cell("Description"),
            ]);
            apply_table_style(&mut table);
            align_column(&mut table, 0, CellAlignment::Right);
            for (index, entry) in entries.iter().enumerate() {
                table.add_row(vec![
                    dim_cell(index + 1),
                    Cell::new(&entry.name).add_attribute(Attribute::Bold),
                    Cell::new(entry.category),
                    description_cell(entry),
                ]);
            }
            println!("{table}");
        }
        FeaturesResult::One(entry) => {
            println!("{} ({})", entry.name, entry.category);
            println!("{}", entry.text());
        }
    }
}

fn print_transform_report(report: &TransformReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Affected")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for outcome in &report.steps {
        table.add_row(vec![Cell::new(outcome.step), Cell::new(outcome.affected)]);
    }
    println!("{table}");

    let imputation = Cell::new(&report.imputation);
    let imputation = match report.imputation {
        ImputationStatus::Skipped { .. } => imputation.fg(Color::Yellow),
        ImputationStatus::NotConfigured => imputation.fg(Color::DarkGrey),
        ImputationStatus::Applied { .. } => imputation,
    };
    let mut details = Table::new();
    apply_table_style(&mut details);
    details.add_row(vec![header_cell("Imputation"), imputation]);
    let audit = &report.alignment;
    if !audit.absent.is_empty() {
        details.add_row(vec![
            header_cell("Zero-filled features"),
            Cell::new(audit.absent.join(", ")).fg(Color::Yellow),
        ]);
    }
    if audit.total_zero_filled() > 0 {
        let fills = audit
            .zero_filled
            .iter()
            .map(|fill| format!("{} ({})", fill.column, fill.cells))
            .collect::<Vec<_>>()
            .join(", ");
        details.add_row(vec![header_cell("Zero-filled cells"), Cell::new(fills)]);
    }
    if !audit.dropped.is_empty() {
        details.add_row(vec![
            header_cell("Unused columns"),
            dim_cell(audit.dropped.join(", ")),
        ]);
    }
    println!("{details}");
}

fn print_frame(frame: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..frame.height() {
        let cells = frame
            .get_columns()
            .iter()
            .map(|column| {
                column
                    .get(row)
                    .map(any_to_string)
                    .map_or_else(|_| dim_cell("-"), Cell::new)
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    println!("{table}");
}

fn frame_cell(frame: &DataFrame, name: &str, row: usize) -> String {
    frame
        .column(name)
        .and_then(|column| column.get(row))
        .map(any_to_string)
        .unwrap_or_default()
}

fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

fn decision_label(decision: Decision) -> &'static str {
    match decision {
        Decision::Approved => "APPROVED",
        Decision::Rejected => "REJECTED",
    }
}

fn decision_cell(decision: Decision) -> Cell {
    let color = if decision.is_approved() {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(decision).fg(color).add_attribute(Attribute::Bold)
}

fn description_cell(entry: &FeatureDescription) -> Cell {
    if entry.is_curated() {
        Cell::new(entry.text())
    } else {
        dim_cell(entry.text())
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
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
    use super::*;

    #[test]
    fn probability_is_shown_as_percent() {
        assert_eq!(percent(0.1234), "12.34%");
        assert_eq!(percent(1.0), "100.00%");
    }
}
