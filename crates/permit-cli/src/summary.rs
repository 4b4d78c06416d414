use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use permit_cli::driver::RunReport;

pub fn print_run_summary(report: &RunReport) {
    let summary = &report.summary;
    println!("Output: {}", report.output_dir.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Series"),
        header_cell("Model"),
        header_cell("Mean"),
        header_cell("Observations"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for record in &summary.adjusted {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.notation).fg(Color::Cyan),
            if record.model.include_mean {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(record.observations),
        ]);
    }
    if !summary.adjusted.is_empty() {
        println!("{table}");
    }

    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Adjusted"),
        header_cell("Skipped"),
        header_cell("Failed"),
    ]);
    apply_table_style(&mut totals);
    totals.add_row(vec![
        count_cell(summary.adjusted.len(), Color::Green),
        count_cell(summary.skipped.len(), Color::Yellow),
        count_cell(summary.failed.len(), Color::Red),
    ]);
    println!("{totals}");

    for path in &report.component_tables {
        println!("Component table: {}", path.display());
    }
    if !summary.failed.is_empty() {
        eprintln!("Failed series:");
        for failure in &summary.failed {
            let first_line = failure.error.lines().next().unwrap_or_default();
            eprintln!("- {}: {first_line}", failure.name);
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: &str) -> Cell {
    Cell::new(value).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).add_attribute(Attribute::Dim)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
