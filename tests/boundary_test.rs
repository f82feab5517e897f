//! Boundary Tests for sheetreport
//!
//! Record counts around the highlight limit, ragged grids and empty tabs.

use chrono::{NaiveDate, NaiveDateTime};
use sheetreport::{
    FieldMapping, Record, RecordTable, ReportRenderer, RowSet, HIGHLIGHT_LIMIT, PLACEHOLDER,
};

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 31)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap()
}

fn indicators(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            [
                ("Indicador", format!("Indicador {}", i)),
                ("Valor", format!("{}", i)),
                ("Fonte", "ANS".to_string()),
                ("Data", "2024-01".to_string()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
        })
        .collect()
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Data rows of the full table (header row excluded)
fn table_rows(html: &str) -> usize {
    html.matches("<tr>").count() - 1
}

fn cards(html: &str) -> usize {
    html.matches("<div class=\"card\">").count()
}

fn render(records: Vec<Record>) -> String {
    ReportRenderer::default().render_records(records, generated_at())
}

#[test]
fn test_zero_records() {
    let html = render(Vec::new());
    assert_eq!(cards(&html), 0);
    assert_eq!(table_rows(&html), 0);
    // Header row is still present
    assert!(html.contains("<th>Indicador</th>"));
}

#[test]
fn test_exactly_highlight_limit() {
    let html = render(indicators(HIGHLIGHT_LIMIT));
    assert_eq!(cards(&html), 6);
    assert_eq!(table_rows(&html), 6);
}

#[test]
fn test_one_over_highlight_limit() {
    let html = render(indicators(7));
    assert_eq!(cards(&html), 6);
    assert_eq!(table_rows(&html), 7);

    // Record 6 only appears in the table
    assert!(!html.contains("<div class=\"card-label\">Indicador 6</div>"));
    assert!(html.contains("<td>Indicador 6</td>"));
}

#[test]
fn test_many_records() {
    let html = render(indicators(1_000));
    assert_eq!(cards(&html), 6);
    assert_eq!(table_rows(&html), 1_000);
}

#[test]
fn test_highlights_are_prefix() {
    let table = RecordTable::build(RowSet::Records(indicators(10)), &FieldMapping::default());
    let highlights = table.highlights(HIGHLIGHT_LIMIT);
    assert_eq!(highlights, &table.records()[..6]);
}

#[test]
fn test_short_grid_row_renders_placeholder() {
    let html = ReportRenderer::default().render_grid(
        strings(&["A", "B", "C"]),
        vec![strings(&["x", "y"])],
        generated_at(),
    );

    assert_eq!(table_rows(&html), 1);
    let row_start = html.find("<td>x</td>").unwrap();
    let row = &html[row_start..];
    let y = row.find("<td>y</td>").unwrap();
    let placeholder = row.find(&format!("<td>{}</td>", PLACEHOLDER)).unwrap();
    assert!(y < placeholder);
}

#[test]
fn test_long_grid_row_ignores_extra_cells() {
    let html = ReportRenderer::default().render_grid(
        strings(&["A", "B"]),
        vec![strings(&["x", "y", "extra"])],
        generated_at(),
    );
    assert!(!html.contains("extra"));
    assert_eq!(html.matches("<td>").count(), 2);
}

#[test]
fn test_record_missing_source_renders_placeholder() {
    let mut record = Record::new();
    record.insert("Indicador".to_string(), "Operadoras".to_string());
    record.insert("Valor".to_string(), "700".to_string());

    let html = render(vec![record]);
    assert!(html.contains("<div class=\"card-source\">📍 N/A</div>"));
    // Fonte and Data cells both fall back
    assert_eq!(html.matches("<td>N/A</td>").count(), 2);
}

#[test]
fn test_empty_grid() {
    let html = ReportRenderer::default().render(RowSet::from_grid(Vec::new()), generated_at());
    assert_eq!(cards(&html), 0);
    assert!(html.contains("<table>"));
}

#[test]
fn test_header_only_tab() {
    let rows = RowSet::records_from_grid(vec![strings(&["Indicador", "Valor"])]);
    assert!(rows.is_empty());

    let html = ReportRenderer::default().render(rows, generated_at());
    assert_eq!(table_rows(&html), 0);
}

#[test]
fn test_records_from_ragged_grid() {
    let rows = RowSet::records_from_grid(vec![
        strings(&["Indicador", "Valor", "Fonte"]),
        strings(&["Operadoras"]),
        strings(&["A", "1", "ANS", "extra"]),
    ]);

    match rows {
        RowSet::Records(records) => {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0]["Valor"], "");
            assert_eq!(records[0]["Fonte"], "");
            assert_eq!(records[1].len(), 3);
        }
        other => panic!("Expected records, got {:?}", other),
    }
}

#[test]
fn test_empty_values_are_not_placeholders() {
    let rows = RowSet::records_from_grid(vec![
        strings(&["Indicador", "Valor", "Fonte", "Data"]),
        strings(&["Operadoras"]),
    ]);
    let html = ReportRenderer::default().render(rows, generated_at());

    // Padded cells are present but empty
    assert!(html.contains("<td></td>"));
    assert!(!html.contains("<td>N/A</td>"));
}
