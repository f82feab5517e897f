//! Output Module
//!
//! 正規化されたレコード表を、スタイルを埋め込んだ単一のHTML文書に変換するモジュール。
//! 文書はハイライトカード（先頭6件）と全件表の2つのセクションで構成されます。

mod html;
mod style;

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::api::{FieldMapping, ReportText, TimestampFormat, HIGHLIGHT_LIMIT};
use crate::grid::{field, RecordTable};
use crate::types::{Record, RowSet};

use html::{render_document, Element};

/// HTMLレポートのレンダラー
///
/// 純粋関数として動作し、同じ入力と同じ生成日時からは常に同じ文字列を返します。
/// 不正なレコードでも失敗せず、欠けているフィールドは`N/A`として出力します。
///
/// # 使用例
///
/// ```rust
/// use chrono::NaiveDate;
/// use sheetreport::{Record, ReportRenderer};
///
/// let mut record = Record::new();
/// record.insert("Indicador".to_string(), "Beneficiários".to_string());
/// record.insert("Valor".to_string(), "50M".to_string());
///
/// let generated_at = NaiveDate::from_ymd_opt(2024, 1, 31)
///     .and_then(|d| d.and_hms_opt(9, 5, 0))
///     .unwrap();
/// let html = ReportRenderer::default().render_records(vec![record], generated_at);
/// assert!(html.contains("Beneficiários"));
/// assert!(html.contains("31/01/2024 às 09:05"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    /// カードと全件表で使用するフィールド名
    fields: FieldMapping,

    /// 見出しなどの固定文言
    text: ReportText,

    /// 生成日時の形式
    timestamp_format: TimestampFormat,
}

impl ReportRenderer {
    /// 新しいレンダラーを生成
    pub fn new(fields: FieldMapping, text: ReportText, timestamp_format: TimestampFormat) -> Self {
        Self {
            fields,
            text,
            timestamp_format,
        }
    }

    /// 行データをHTML文書に変換
    ///
    /// 入力の形（レコード / グリッド）は`RecordTable`で正規化されてから処理されます。
    pub fn render(&self, rows: RowSet, generated_at: NaiveDateTime) -> String {
        let table = RecordTable::build(rows, &self.fields);
        self.render_table(&table, generated_at)
    }

    /// レコード形式の入力をHTML文書に変換
    ///
    /// 全件表はフィールドマッピングの4列で出力されます。
    pub fn render_records(&self, records: Vec<Record>, generated_at: NaiveDateTime) -> String {
        self.render(RowSet::Records(records), generated_at)
    }

    /// グリッド形式の入力をHTML文書に変換
    ///
    /// 全件表はヘッダー行の列名をそのまま使って出力されます。
    pub fn render_grid(
        &self,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        generated_at: NaiveDateTime,
    ) -> String {
        self.render(RowSet::Grid { header, rows }, generated_at)
    }

    /// 正規化済みの表をHTML文書に変換
    ///
    /// # 処理フロー
    ///
    /// 1. 生成日時を1回だけフォーマット
    /// 2. ハイライトカード（先頭から最大6件）を構築
    /// 3. 全件表（全レコード）を構築
    /// 4. 文書ツリーを1回でシリアライズ（ここですべての値をエスケープ）
    pub fn render_table(&self, table: &RecordTable, generated_at: NaiveDateTime) -> String {
        let timestamp = self.format_timestamp(generated_at);

        let highlights = table.highlights(HIGHLIGHT_LIMIT);
        debug!(
            records = table.len(),
            highlights = highlights.len(),
            "rendering report"
        );

        let cards = highlights.iter().map(|record| self.build_card(record));

        let content = Element::new("div")
            .class("content")
            .child(
                Element::new("div")
                    .class("info-timestamp")
                    .text(format!("{} ", self.text.updated_label))
                    .child(Element::new("strong").text(timestamp)),
            )
            .child(Element::new("div").class("grid").children(cards))
            .child(
                Element::new("h2")
                    .class("section-title")
                    .text(self.text.table_heading.as_str()),
            )
            .child(self.build_table(table));

        let body = Element::new("body").child(
            Element::new("div")
                .class("container")
                .child(
                    Element::new("div")
                        .class("header")
                        .child(Element::new("h1").text(self.text.heading.as_str()))
                        .child(Element::new("p").text(self.text.subtitle.as_str())),
                )
                .child(content)
                .child(
                    Element::new("div")
                        .class("footer")
                        .child(Element::new("p").text(self.text.footer.as_str())),
                ),
        );

        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "UTF-8"))
            .child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width, initial-scale=1.0"),
            )
            .child(Element::new("title").text(self.text.title.as_str()))
            .child(Element::new("style").raw(style::STYLESHEET));

        let root = Element::new("html")
            .attr("lang", self.text.lang.as_str())
            .child(head)
            .child(body);

        render_document(&root)
    }

    /// 生成日時をフォーマット（内部ヘルパー）
    ///
    /// フォーマット文字列が不正な場合はデフォルト形式にフォールバックします。
    fn format_timestamp(&self, generated_at: NaiveDateTime) -> String {
        let mut formatted = String::new();
        if write!(formatted, "{}", generated_at.format(self.timestamp_format.pattern())).is_err() {
            warn!(
                pattern = self.timestamp_format.pattern(),
                "invalid timestamp pattern, falling back to default"
            );
            formatted = generated_at
                .format(TimestampFormat::Default.pattern())
                .to_string();
        }
        formatted
    }

    /// ハイライトカードを1枚構築（内部ヘルパー）
    fn build_card(&self, record: &Record) -> Element {
        Element::new("div")
            .class("card")
            .child(
                Element::new("div")
                    .class("card-label")
                    .text(field(record, &self.fields.label)),
            )
            .child(
                Element::new("div")
                    .class("card-value")
                    .text(field(record, &self.fields.value)),
            )
            .child(
                Element::new("div")
                    .class("card-source")
                    .text(format!("{} ", self.text.source_marker))
                    .text(field(record, &self.fields.source)),
            )
    }

    /// 全件表を構築（内部ヘルパー）
    fn build_table(&self, table: &RecordTable) -> Element {
        let header_row = Element::new("tr").children(
            table
                .columns()
                .iter()
                .map(|column| Element::new("th").text(column.name.as_str())),
        );

        let rows = table.records().iter().map(|record| {
            Element::new("tr").children(table.columns().iter().map(|column| {
                let value = field(record, &column.name);
                if column.emphasis {
                    Element::new("td").child(Element::new("strong").text(value))
                } else {
                    Element::new("td").text(value)
                }
            }))
        });

        Element::new("table")
            .child(Element::new("thead").child(header_row))
            .child(Element::new("tbody").children(rows))
    }
}
