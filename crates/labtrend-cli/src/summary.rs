use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use labtrend_cli::{DocumentStatus, DocumentSummary, RunResult};
use labtrend_model::{Diagnostic, Severity};

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.input_dir.display());
    let store_note = if result.dry_run {
        " (dry run, not written)"
    } else if result.store_written {
        ""
    } else {
        " (unchanged)"
    };
    println!("Store: {}{store_note}", result.store_path.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Date"),
        header_cell("Encoding"),
        header_cell("Extracted"),
        header_cell("Inserted"),
        header_cell("Unchanged"),
        header_cell("Superseded"),
        header_cell("Skipped"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..=7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 8, CellAlignment::Center);

    let mut total_extracted = 0usize;
    let mut total_skipped = 0usize;
    for document in &result.documents {
        total_extracted += document.extracted;
        total_skipped += document.skipped;
        table.add_row(document_row(document));
    }
    let totals = result.totals();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_extracted).add_attribute(Attribute::Bold),
        count_cell(totals.inserted, Color::Green).add_attribute(Attribute::Bold),
        Cell::new(totals.unchanged).add_attribute(Attribute::Bold),
        count_cell(totals.superseded, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(total_skipped, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(result.rejected_count(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("Stored observations: {}", result.stored_observations);
    print_diagnostic_table(result);
}

fn document_row(document: &DocumentSummary) -> Vec<Cell> {
    let date = document
        .report_date
        .map_or_else(|| dim_cell("-"), Cell::new);
    let encoding = document.encoding.map_or_else(|| dim_cell("-"), Cell::new);
    vec![
        Cell::new(&document.source)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        date,
        encoding,
        Cell::new(document.extracted),
        count_cell(document.merge.inserted, Color::Green),
        dim_cell(document.merge.unchanged),
        count_cell(document.merge.superseded, Color::Yellow),
        count_cell(document.skipped, Color::Yellow),
        status_cell(&document.status),
    ]
}

fn print_diagnostic_table(result: &RunResult) {
    if result.diagnostics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Document"),
        header_cell("Line"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    apply_diagnostic_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for diagnostic in result.diagnostics.sorted() {
        table.add_row(diagnostic_row(diagnostic));
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

fn diagnostic_row(diagnostic: &Diagnostic) -> Vec<Cell> {
    vec![
        severity_cell(diagnostic.severity()),
        Cell::new(diagnostic.source()),
        diagnostic
            .line()
            .map_or_else(|| dim_cell("-"), Cell::new),
        Cell::new(diagnostic.kind()),
        Cell::new(diagnostic.message()),
    ]
}

pub fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 9 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ]);
    }
}

fn apply_diagnostic_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Fixed(18)),
            ColumnConstraint::UpperBoundary(Width::Percentage(55)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &DocumentStatus) -> Cell {
    match status {
        DocumentStatus::Merged => Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
        DocumentStatus::Unchanged => dim_cell(status.label()),
        DocumentStatus::Rejected { .. } => Cell::new(status.label())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Notice => Cell::new("NOTICE").fg(Color::Cyan),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
