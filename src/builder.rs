//! Builder Module
//!
//! Fluent Builder APIを提供し、`Pipeline`インスタンスを段階的に構築する。
//! パイプラインは認証情報の確認、認証、取得、レンダリング、書き出しを順に実行します。

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::api::{FetchShape, FieldMapping, ReportText, TimestampFormat, HIGHLIGHT_LIMIT};
use crate::error::ReportError;
use crate::grid::RecordTable;
use crate::output::ReportRenderer;
use crate::security::validate_tab_name;
use crate::source::{Credentials, DataSource, GoogleSheetsSource, WorkbookSource};
use crate::types::SheetRef;
use crate::writer::write_report;

/// デフォルトのスプレッドシートID
pub const DEFAULT_SPREADSHEET_ID: &str = "15B9A_VCdgrBKJE27AF0oTzG4KCWOBnPfYRRdDHM8_9k";

/// 実行設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// スプレッドシートの識別子
    pub spreadsheet_id: String,

    /// 読み込むタブ名
    pub tab: String,

    /// 認証情報ファイルのパス
    pub credentials_path: PathBuf,

    /// 出力ファイルのパス
    pub output_path: PathBuf,

    /// データソースから返す行データの形
    pub fetch_shape: FetchShape,

    /// カードと全件表で使用するフィールド名
    pub field_mapping: FieldMapping,

    /// 生成日時の形式
    pub timestamp_format: TimestampFormat,

    /// HTTPリクエストのタイムアウト
    pub request_timeout: Duration,

    /// レポートの固定文言
    pub report_text: ReportText,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            tab: "Dados".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            output_path: PathBuf::from("index.html"),
            fetch_shape: FetchShape::Records,
            field_mapping: FieldMapping::default(),
            timestamp_format: TimestampFormat::Default,
            request_timeout: Duration::from_secs(30),
            report_text: ReportText::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Pipeline`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetreport::{FetchShape, PipelineBuilder};
///
/// # fn main() -> Result<(), sheetreport::ReportError> {
/// let pipeline = PipelineBuilder::new()
///     .with_tab("Indicadores")
///     .with_fetch_shape(FetchShape::Grid)
///     .with_output_path("public/index.html")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineBuilder {
    /// 内部設定（構築中）
    config: PipelineConfig,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - スプレッドシート: `DEFAULT_SPREADSHEET_ID`
    /// - タブ: `Dados`
    /// - 認証情報: `credentials.json`
    /// - 出力先: `index.html`
    /// - 行データの形: レコード
    /// - 生成日時: `%d/%m/%Y às %H:%M`
    /// - タイムアウト: 30秒
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// スプレッドシートの識別子を指定する
    pub fn with_spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.config.spreadsheet_id = id.into();
        self
    }

    /// 読み込むタブ名を指定する
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.config.tab = tab.into();
        self
    }

    /// 認証情報ファイルのパスを指定する
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = path.into();
        self
    }

    /// 出力ファイルのパスを指定する
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// データソースから返す行データの形を指定する
    ///
    /// `Pipeline::google_sheets_source()`と`Pipeline::workbook_source()`で
    /// 生成するデータソースに適用されます。独自に生成したデータソースには
    /// 適用されないため、そのデータソースの`with_fetch_shape`を使用してください。
    pub fn with_fetch_shape(mut self, shape: FetchShape) -> Self {
        self.config.fetch_shape = shape;
        self
    }

    /// カードと全件表で使用するフィールド名を指定する
    ///
    /// # 引数
    ///
    /// * `mapping: FieldMapping`: 指標・値・出典・日付のフィールド名
    pub fn with_field_mapping(mut self, mapping: FieldMapping) -> Self {
        self.config.field_mapping = mapping;
        self
    }

    /// 生成日時の形式を指定する
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// HTTPリクエストのタイムアウトを指定する
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// レポートの固定文言を指定する
    pub fn with_report_text(mut self, text: ReportText) -> Self {
        self.config.report_text = text;
        self
    }

    /// 設定を検証し、`Pipeline`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Pipeline)`: 設定が有効な場合、Pipelineインスタンス
    /// * `Err(ReportError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * `ReportError::Config(String)`: 設定の検証に失敗した場合
    ///   * スプレッドシートIDが空
    ///   * タブ名が空、または制御文字を含む
    ///   * 出力先のパスが空
    ///   * タイムアウトが0
    ///   * カスタム日時形式が空、または不正な書式文字列
    ///   * フィールド名が空、または重複している
    pub fn build(self) -> Result<Pipeline, ReportError> {
        let config = &self.config;

        // 1. データソースの指定
        if config.spreadsheet_id.trim().is_empty() {
            return Err(ReportError::Config(
                "Spreadsheet id must not be empty".to_string(),
            ));
        }
        validate_tab_name(&config.tab).map_err(ReportError::Config)?;

        // 2. 出力先とタイムアウト
        if config.output_path.as_os_str().is_empty() {
            return Err(ReportError::Config(
                "Output path must not be empty".to_string(),
            ));
        }
        if config.request_timeout.is_zero() {
            return Err(ReportError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        // 3. カスタム日時形式の検証
        if let TimestampFormat::Custom(ref pattern) = config.timestamp_format {
            validate_timestamp_pattern(pattern)?;
        }

        // 4. フィールドマッピングの検証
        validate_field_mapping(&config.field_mapping)?;

        Ok(Pipeline::new(self.config))
    }
}

/// chrono互換の書式文字列を検証（内部ヘルパー）
fn validate_timestamp_pattern(pattern: &str) -> Result<(), ReportError> {
    if pattern.trim().is_empty() {
        return Err(ReportError::Config(
            "Invalid timestamp format: pattern is empty".to_string(),
        ));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ReportError::Config(format!(
            "Invalid timestamp format: '{}'",
            pattern
        )));
    }
    Ok(())
}

/// フィールド名の検証（内部ヘルパー）
fn validate_field_mapping(mapping: &FieldMapping) -> Result<(), ReportError> {
    let fields = mapping.table_fields();

    if let Some(empty) = fields.iter().position(|name| name.trim().is_empty()) {
        return Err(ReportError::Config(format!(
            "Field mapping entry {} must not be empty",
            empty
        )));
    }

    for (i, name) in fields.iter().enumerate() {
        if fields[..i].contains(name) {
            return Err(ReportError::Config(format!(
                "Duplicate field name in mapping: '{}'",
                name
            )));
        }
    }

    Ok(())
}

/// 1回の実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 取得したレコード数（全件表の行数）
    pub record_count: usize,
    /// ハイライトカードの数
    pub highlight_count: usize,
    /// 書き出したファイルのパス
    pub output_path: PathBuf,
    /// 書き出したバイト数
    pub bytes_written: usize,
}

/// レポート生成パイプラインのファサード
///
/// `PipelineBuilder`を使用して構築された設定に基づいて、データソースから
/// 行データを取得し、HTMLレポートを書き出します。実行は1回完結で、
/// 途中で失敗した場合は出力ファイルに触れずにエラーを返します。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetreport::PipelineBuilder;
///
/// # fn main() -> Result<(), sheetreport::ReportError> {
/// let pipeline = PipelineBuilder::new().build()?;
/// let source = pipeline.google_sheets_source()?;
/// let summary = pipeline.run(&source)?;
/// println!("{} records -> {}", summary.record_count, summary.output_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    /// 実行設定
    config: PipelineConfig,

    /// HTMLレンダラー
    renderer: ReportRenderer,
}

impl Pipeline {
    pub(crate) fn new(config: PipelineConfig) -> Self {
        Self {
            renderer: ReportRenderer::new(
                config.field_mapping.clone(),
                config.report_text.clone(),
                config.timestamp_format.clone(),
            ),
            config,
        }
    }

    /// 読み込み対象のスプレッドシートとタブ
    pub fn sheet(&self) -> SheetRef {
        SheetRef::new(self.config.spreadsheet_id.as_str(), self.config.tab.as_str())
    }

    /// 出力ファイルのパス
    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    /// 認証情報ファイルのパス
    pub fn credentials_path(&self) -> &Path {
        &self.config.credentials_path
    }

    /// 設定に従った`GoogleSheetsSource`を生成
    ///
    /// タイムアウトと行データの形が適用されます。
    pub fn google_sheets_source(&self) -> Result<GoogleSheetsSource, ReportError> {
        Ok(GoogleSheetsSource::new(self.config.request_timeout)?
            .with_fetch_shape(self.config.fetch_shape))
    }

    /// 設定に従った`WorkbookSource`を生成
    ///
    /// 行データの形が適用されます。
    ///
    /// # 引数
    ///
    /// * `path` - ワークブックのパス
    pub fn workbook_source(&self, path: impl Into<PathBuf>) -> WorkbookSource {
        WorkbookSource::new(path).with_fetch_shape(self.config.fetch_shape)
    }

    /// 現在時刻を生成日時としてパイプラインを実行
    ///
    /// # 戻り値
    ///
    /// * `Ok(RunSummary)` - レポートの書き出しに成功した場合
    /// * `Err(ReportError)` - いずれかのステージで失敗した場合
    pub fn run<S: DataSource>(&self, source: &S) -> Result<RunSummary, ReportError> {
        self.run_at(source, Local::now().naive_local())
    }

    /// 指定した生成日時でパイプラインを実行
    ///
    /// # 処理フロー
    ///
    /// 1. 認証情報ファイルの確認（データソースが必要とする場合のみ）
    /// 2. 認証
    /// 3. 行データの取得
    /// 4. 正規化とレンダリング
    /// 5. ファイルへの書き出し
    ///
    /// 認証情報ファイルが存在しない場合、データソースは一切呼び出されません。
    pub fn run_at<S: DataSource>(
        &self,
        source: &S,
        generated_at: NaiveDateTime,
    ) -> Result<RunSummary, ReportError> {
        let sheet = self.sheet();
        info!(spreadsheet = %sheet.spreadsheet_id, tab = %sheet.tab, "starting report update");

        // 1. 認証情報
        let credentials = if source.requires_credentials() {
            Credentials::from_file(&self.config.credentials_path)?
        } else {
            Credentials::Anonymous
        };

        // 2. 認証
        let session = source.authenticate(&credentials)?;
        info!("connected to data source");

        // 3. 取得
        let rows = source.fetch(&session, &sheet)?;
        info!(records = rows.len(), "records loaded");

        // 4. レンダリング
        let table = RecordTable::build(rows, &self.config.field_mapping);
        let html = self.renderer.render_table(&table, generated_at);
        info!(bytes = html.len(), "report rendered");

        // 5. 書き出し
        write_report(&self.config.output_path, &html)?;
        info!(path = %self.config.output_path.display(), "report written");

        Ok(RunSummary {
            record_count: table.len(),
            highlight_count: table.highlights(HIGHLIGHT_LIMIT).len(),
            output_path: self.config.output_path.clone(),
            bytes_written: html.len(),
        })
    }
}
