//! Output formatting utilities for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use spacemap_schema::MigrationReport;
use spacemap_store::Space;

pub fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }
    table
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", build_table(headers, rows));
}

/// One `(space, change, detail)` row per schema change, in application order.
pub fn report_rows(report: &MigrationReport) -> Vec<Vec<String>> {
    let spaces = report
        .spaces_created
        .iter()
        .map(|space| vec![space.clone(), "space".to_string(), String::new()]);
    let properties = report.properties_added.iter().map(|p| {
        vec![
            p.space.clone(),
            "property".to_string(),
            format!("{}: {}", p.property, p.storage_type),
        ]
    });
    let indexes = report
        .indexes_created
        .iter()
        .map(|i| vec![i.space.clone(), "index".to_string(), i.index.clone()]);

    spaces.chain(properties).chain(indexes).collect()
}

pub fn print_report(report: &MigrationReport) {
    if report.is_empty() {
        println!("Schema is up to date.");
        return;
    }
    print_table(&["SPACE", "CHANGE", "DETAIL"], report_rows(report));
    if report.rows_seeded > 0 {
        println!("{} bookkeeping rows seeded", report.rows_seeded);
    }
}

pub fn print_space(space: &Space) {
    println!("{} (id {})", space.name(), space.id());

    let properties = space
        .properties()
        .iter()
        .map(|p| vec![p.ordinal.to_string(), p.name.clone(), p.storage_type.to_string()])
        .collect();
    print_table(&["#", "PROPERTY", "TYPE"], properties);

    if space.indexes().is_empty() {
        println!("(no indexes)");
    } else {
        let indexes = space
            .indexes()
            .iter()
            .map(|i| {
                vec![
                    i.name.clone(),
                    i.fields.join(", "),
                    if i.unique { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        print_table(&["INDEX", "FIELDS", "UNIQUE"], indexes);
    }
    println!();
}
