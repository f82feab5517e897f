//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;

use thiserror::Error;

/// エラーの分類
///
/// 実行を中断させたステージを識別するために使用します。
/// どの分類でもプロセスは非ゼロで終了します（部分成功はありません）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 設定の不備（認証情報ファイルの欠落・読み込み不可を含む）
    Configuration,
    /// 認証情報がプロバイダーに拒否された、または不正な形式
    Authentication,
    /// タブが存在しない、通信失敗、不正なレスポンス
    DataSource,
    /// 出力ファイルの書き込み失敗など
    Io,
}

/// sheetreportクレート全体で使用するエラー型
///
/// データソースへの認証、行の取得、HTMLレポートの書き出しまでの
/// すべてのステージで発生するエラーを統一的に扱います。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetreport::{ErrorKind, PipelineBuilder, GoogleSheetsSource};
///
/// # fn main() -> Result<(), sheetreport::ReportError> {
/// let pipeline = PipelineBuilder::new().build()?;
/// let source = GoogleSheetsSource::new(std::time::Duration::from_secs(30))?;
///
/// if let Err(e) = pipeline.run(&source) {
///     if e.kind() == ErrorKind::Configuration {
///         println!("設定エラー: {}", e);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum ReportError {
    /// 設定の検証に失敗したエラー
    ///
    /// `PipelineBuilder::build()`時の検証失敗や、認証情報ファイルが
    /// 読み込めない場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 認証情報ファイルが存在しない
    ///
    /// ネットワークアクセスの前にチェックされ、データソースは一切呼び出されません。
    #[error("Credentials file not found: {}", .0.display())]
    CredentialsNotFound(PathBuf),

    /// 認証エラー
    ///
    /// サービスアカウントキーが不正な形式、またはトークン交換で拒否された場合。
    #[error("Authentication error: {0}")]
    Auth(String),

    /// 指定されたタブ（またはスプレッドシート）が存在しない
    #[error("Tab '{tab}' not found in spreadsheet '{spreadsheet}'")]
    SheetNotFound {
        /// スプレッドシートの識別子
        spreadsheet: String,
        /// タブ名
        tab: String,
    },

    /// データ取得中のその他のエラー
    ///
    /// 通信失敗、想定外のHTTPステータス、不正なレスポンス、サイズ制限超過など。
    #[error("Data source error: {0}")]
    DataSource(String),

    /// ローカルワークブックの解析エラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// レポートの書き込みに失敗したエラー
    ///
    /// レンダリング済みの内容は失われます。
    #[error("Failed to write report to {}: {source}", path.display())]
    Write {
        /// 出力先パス
        path: PathBuf,
        /// 元のI/Oエラー
        source: std::io::Error,
    },
}

impl ReportError {
    /// エラーの分類を返す
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Config(_) | ReportError::CredentialsNotFound(_) => {
                ErrorKind::Configuration
            }
            ReportError::Auth(_) => ErrorKind::Authentication,
            ReportError::SheetNotFound { .. }
            | ReportError::DataSource(_)
            | ReportError::Workbook(_) => ErrorKind::DataSource,
            ReportError::Io(_) | ReportError::Write { .. } => ErrorKind::Io,
        }
    }
}
