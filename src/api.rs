//! Public API Types
//!
//! 公開APIで使用する列挙型と設定値を定義するモジュール。

/// ハイライトカードとして表示するレコードの最大数
pub const HIGHLIGHT_LIMIT: usize = 6;

/// 値が存在しないフィールドの代わりに表示する文字列
pub const PLACEHOLDER: &str = "N/A";

/// データソースから返す行データの形
///
/// リモートのスプレッドシートは常にグリッドを返します。この設定は
/// そのグリッドをレコードに変換してから返すかどうかを指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchShape {
    /// 先頭行をヘッダーとして各行を列名付きレコードに変換（デフォルト）
    ///
    /// 全件表はフィールドマッピングの4列（指標・値・出典・日付）で出力されます。
    Records,

    /// ヘッダー行と生の値リストをそのまま返す
    ///
    /// 全件表はヘッダー行の列名をそのまま使って出力されます。
    Grid,
}

/// 生成日時の出力形式
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimestampFormat {
    /// 日/月/年 時:分（例: `19/10/2026 às 08:30`）
    Default,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetreport::{PipelineBuilder, TimestampFormat};
    ///
    /// # fn main() -> Result<(), sheetreport::ReportError> {
    /// let pipeline = PipelineBuilder::new()
    ///     .with_timestamp_format(TimestampFormat::Custom("%d/%m/%Y %H:%M".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Default
    }
}

impl TimestampFormat {
    /// chrono互換のフォーマット文字列を取得
    pub fn pattern(&self) -> &str {
        match self {
            TimestampFormat::Default => "%d/%m/%Y às %H:%M",
            TimestampFormat::Custom(pattern) => pattern,
        }
    }
}

/// レコードの意味的なフィールド名
///
/// ハイライトカードは`label`・`value`・`source`を、
/// レコード形式の全件表はこれに`date`を加えた4列を使用します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// カードの見出しとなるフィールド
    pub label: String,
    /// カードに大きく表示する値のフィールド
    pub value: String,
    /// 出典のフィールド
    pub source: String,
    /// 日付のフィールド（全件表のみ）
    pub date: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            label: "Indicador".to_string(),
            value: "Valor".to_string(),
            source: "Fonte".to_string(),
            date: "Data".to_string(),
        }
    }
}

impl FieldMapping {
    /// 全件表の列順でフィールド名を返す
    pub fn table_fields(&self) -> [&str; 4] {
        [&self.label, &self.value, &self.source, &self.date]
    }
}

/// レポートに埋め込む固定文言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportText {
    /// `<html lang>`属性
    pub lang: String,
    /// `<title>`
    pub title: String,
    /// ヘッダーの見出し
    pub heading: String,
    /// ヘッダーの副題
    pub subtitle: String,
    /// 生成日時の前に置く文言
    pub updated_label: String,
    /// 出典の前に置く記号
    pub source_marker: String,
    /// 全件表の見出し
    pub table_heading: String,
    /// フッターの文言
    pub footer: String,
}

impl Default for ReportText {
    fn default() -> Self {
        Self {
            lang: "pt-BR".to_string(),
            title: "Indicadores de Saúde Suplementar".to_string(),
            heading: "📊 Indicadores de Saúde Suplementar".to_string(),
            subtitle: "Dados agregados em tempo real".to_string(),
            updated_label: "✓ Última atualização:".to_string(),
            source_marker: "📍".to_string(),
            table_heading: "📋 Dados Completos".to_string(),
            footer: "🔄 Esta página é atualizada automaticamente quando há mudanças na planilha-fonte"
                .to_string(),
        }
    }
}
