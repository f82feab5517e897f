//! Data Source Module
//!
//! 表形式のデータを取得するデータソースの抽象化と、その実装を提供するモジュール。
//!
//! - `GoogleSheetsSource`: Google Sheets API v4（サービスアカウント認証）
//! - `WorkbookSource`: ローカルのワークブックファイル（認証不要）

mod credentials;
mod sheets;
mod workbook;

pub use credentials::Credentials;
pub use sheets::{GoogleSheetsSource, SheetsSession};
pub use workbook::WorkbookSource;

use crate::error::ReportError;
use crate::types::{RowSet, SheetRef};

/// 表形式データのプロバイダー
///
/// パイプラインは`authenticate`で得たセッションを使って`fetch`を1回だけ呼び出します。
/// テストではネットワークを使わないスタブ実装に差し替えられます。
pub trait DataSource {
    /// 認証済みセッション
    type Session;

    /// 認証情報ファイルが必要かどうか
    ///
    /// `true`の場合、パイプラインはデータソースを呼び出す前に
    /// 認証情報ファイルの存在を確認します。
    fn requires_credentials(&self) -> bool {
        true
    }

    /// 認証を行い、セッションを確立
    ///
    /// # 戻り値
    ///
    /// * `Ok(Session)` - 認証に成功した場合
    /// * `Err(ReportError::Auth)` - 認証情報が不正、または拒否された場合
    fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session, ReportError>;

    /// タブの行データを取得
    ///
    /// # 戻り値
    ///
    /// * `Ok(RowSet)` - 取得に成功した場合
    /// * `Err(ReportError::SheetNotFound)` - タブが存在しない場合
    /// * `Err(ReportError::DataSource)` - その他の取得エラー
    fn fetch(&self, session: &Self::Session, sheet: &SheetRef) -> Result<RowSet, ReportError>;
}
