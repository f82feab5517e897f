//! Property Tests for sheetreport
//!
//! Rendering laws that must hold for any input.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use sheetreport::{Record, ReportRenderer, RowSet, HIGHLIGHT_LIMIT};

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 31)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap()
}

fn to_records(labels: &[String]) -> Vec<Record> {
    labels
        .iter()
        .map(|label| {
            let mut record = Record::new();
            record.insert("Indicador".to_string(), label.clone());
            record.insert("Valor".to_string(), "1".to_string());
            record
        })
        .collect()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

proptest! {
    #[test]
    fn test_table_has_one_row_per_record(labels in prop::collection::vec("[A-Za-z0-9 ]{0,12}", 0..40)) {
        let html = ReportRenderer::default().render_records(to_records(&labels), generated_at());

        prop_assert_eq!(html.matches("<tr>").count() - 1, labels.len());
        prop_assert_eq!(
            html.matches("<div class=\"card\">").count(),
            labels.len().min(HIGHLIGHT_LIMIT)
        );
    }

    #[test]
    fn test_render_is_deterministic(labels in prop::collection::vec(".{0,16}", 0..10)) {
        let renderer = ReportRenderer::default();
        let first = renderer.render_records(to_records(&labels), generated_at());
        let second = renderer.render_records(to_records(&labels), generated_at());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_values_are_always_escaped(value in "[<>&\"a-z /]{1,24}") {
        let html = ReportRenderer::default()
            .render_records(to_records(std::slice::from_ref(&value)), generated_at());

        let expected = format!("<td>{}</td>", escape(&value));
        prop_assert!(html.contains(&expected));
        if value.contains('<') {
            let raw = format!("<td>{}</td>", value);
            prop_assert!(!html.contains(&raw));
        }
    }

    #[test]
    fn test_ragged_grid_renders_full_width(
        width in 1usize..6,
        row_lengths in prop::collection::vec(0usize..10, 0..20)
    ) {
        let header: Vec<String> = (0..width).map(|i| format!("Coluna {}", i)).collect();
        let rows: Vec<Vec<String>> = row_lengths
            .iter()
            .map(|len| (0..*len).map(|i| format!("v{}", i)).collect())
            .collect();

        let html = ReportRenderer::default().render(RowSet::Grid { header, rows }, generated_at());

        prop_assert_eq!(html.matches("<th>").count(), width);
        prop_assert_eq!(html.matches("<td>").count(), width * row_lengths.len());
    }
}
