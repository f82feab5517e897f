//! Google Sheets Source
//!
//! サービスアカウントで認証し、Sheets API v4の`values.get`でタブの値を取得する
//! リモートデータソース。通信はすべてブロッキングで、タイムアウト付きです。

use std::fmt;
use std::io::Read;
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::api::FetchShape;
use crate::error::ReportError;
use crate::security::SourceLimits;
use crate::source::credentials::{Credentials, ServiceAccountKey};
use crate::source::DataSource;
use crate::types::{RowSet, SheetRef};

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// エラーメッセージに含めるレスポンス本文の最大長
const MAX_ERROR_BODY_CHARS: usize = 200;

/// 認証済みセッション
pub struct SheetsSession {
    access_token: String,
}

impl fmt::Debug for SheetsSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsSession")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// `values.get`のレスポンス（値が1つもないタブでは`values`が省略される）
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google スプレッドシートのデータソース
///
/// # 使用例
///
/// ```rust,no_run
/// use std::time::Duration;
/// use sheetreport::{FetchShape, GoogleSheetsSource};
///
/// # fn main() -> Result<(), sheetreport::ReportError> {
/// let source = GoogleSheetsSource::new(Duration::from_secs(30))?
///     .with_fetch_shape(FetchShape::Grid);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    client: Client,
    api_base: Url,
    limits: SourceLimits,
    shape: FetchShape,
}

impl GoogleSheetsSource {
    /// 指定したタイムアウトでデータソースを生成
    pub fn new(request_timeout: Duration) -> Result<Self, ReportError> {
        let limits = SourceLimits::with_timeout(request_timeout);
        let client = Client::builder()
            .timeout(limits.request_timeout)
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = Url::parse(DEFAULT_API_BASE)
            .map_err(|e| ReportError::Config(format!("Invalid API base url: {}", e)))?;

        Ok(Self {
            client,
            api_base,
            limits,
            shape: FetchShape::Records,
        })
    }

    /// 返す行データの形を指定
    pub fn with_fetch_shape(mut self, shape: FetchShape) -> Self {
        self.shape = shape;
        self
    }

    /// APIのベースURLを変更（プロキシやテスト用サーバー向け）
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ReportError> {
        let url = Url::parse(api_base)
            .map_err(|e| ReportError::Config(format!("Invalid API base url '{}': {}", api_base, e)))?;
        if url.cannot_be_a_base() {
            return Err(ReportError::Config(format!(
                "API base url cannot be a base: {}",
                api_base
            )));
        }
        self.api_base = url;
        Ok(self)
    }

    /// `values.get`のURLを構築
    ///
    /// タブ名はシングルクォートで囲んだA1表記（内部の`'`は二重化）とし、
    /// 1つのパスセグメントとしてパーセントエンコードします。
    fn values_url(&self, sheet: &SheetRef) -> Result<Url, ReportError> {
        let range = format!("'{}'", sheet.tab.replace('\'', "''"));

        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ReportError::Config("API base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                sheet.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");

        Ok(url)
    }

    /// JWTアサーションをアクセストークンに交換（内部ヘルパー）
    fn exchange_token(&self, key: &ServiceAccountKey) -> Result<AccessToken, ReportError> {
        let jwt = key.signed_jwt(Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())];

        debug!(token_uri = %key.token_uri, "requesting access token");
        let response = self
            .client
            .post(&key.token_uri)
            .form(&params)
            .send()
            .map_err(|e| transport_error("Token request", &e, &self.limits))?;

        let (status, body) = read_body(response, self.limits.max_response_size)?;
        if !status.is_success() {
            return Err(classify_token_error(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ReportError::DataSource(format!("Malformed token response: {}", e)))
    }
}

impl DataSource for GoogleSheetsSource {
    type Session = SheetsSession;

    fn authenticate(&self, credentials: &Credentials) -> Result<SheetsSession, ReportError> {
        let key_json = match credentials {
            Credentials::ServiceAccountKey(json) => json,
            Credentials::Anonymous => {
                return Err(ReportError::Auth(
                    "A service account key is required for Google Sheets".to_string(),
                ))
            }
        };

        let key = ServiceAccountKey::try_from_str(key_json)?;
        let token = self.exchange_token(&key)?;

        info!(
            client_email = %key.client_email,
            expires_in = ?token.expires_in,
            "authenticated with Google Sheets"
        );

        Ok(SheetsSession {
            access_token: token.access_token,
        })
    }

    fn fetch(&self, session: &SheetsSession, sheet: &SheetRef) -> Result<RowSet, ReportError> {
        let url = self.values_url(sheet)?;
        debug!(%url, "fetching sheet values");

        let response = self
            .client
            .get(url)
            .bearer_auth(&session.access_token)
            .send()
            .map_err(|e| transport_error("Values request", &e, &self.limits))?;

        let (status, body) = read_body(response, self.limits.max_response_size)?;
        if !status.is_success() {
            return Err(classify_api_error(status, &body, sheet));
        }

        let grid = parse_values(&body)?;
        info!(rows = grid.len(), tab = %sheet.tab, "fetched sheet values");

        Ok(match self.shape {
            FetchShape::Records => RowSet::records_from_grid(grid),
            FetchShape::Grid => RowSet::from_grid(grid),
        })
    }
}

/// 通信エラーをデータソースエラーに変換（内部ヘルパー）
fn transport_error(what: &str, error: &reqwest::Error, limits: &SourceLimits) -> ReportError {
    if error.is_timeout() {
        ReportError::DataSource(format!(
            "{} timed out after {:?}",
            what, limits.request_timeout
        ))
    } else {
        ReportError::DataSource(format!("{} failed: {}", what, error))
    }
}

/// レスポンス本文をサイズ制限付きで読み込む（内部ヘルパー）
fn read_body(response: Response, limit: u64) -> Result<(StatusCode, Vec<u8>), ReportError> {
    let status = response.status();

    if let Some(length) = response.content_length() {
        if length > limit {
            return Err(ReportError::DataSource(format!(
                "Response size exceeds maximum: {} bytes (max: {} bytes)",
                length, limit
            )));
        }
    }

    let mut body = Vec::new();
    response
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| ReportError::DataSource(format!("Failed to read response body: {}", e)))?;

    if body.len() as u64 > limit {
        return Err(ReportError::DataSource(format!(
            "Response size exceeds maximum: {} bytes",
            limit
        )));
    }

    Ok((status, body))
}

/// エラーメッセージ用に本文を短縮（内部ヘルパー）
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// トークンエンドポイントのエラーを分類
///
/// トークン交換の失敗はすべて認証エラーとして扱います。
fn classify_token_error(status: StatusCode, body: &[u8]) -> ReportError {
    let detail = match serde_json::from_slice::<TokenErrorBody>(body) {
        Ok(TokenErrorBody {
            error,
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(TokenErrorBody { error, .. }) => error,
        Err(_) => body_excerpt(body),
    };
    ReportError::Auth(format!("Token request rejected ({}): {}", status, detail))
}

/// Sheets APIのエラーを分類
///
/// - 404、または範囲を解析できない400 → タブ（スプレッドシート）が存在しない
/// - 401 / 403 → 認証エラー
/// - それ以外 → データソースエラー
fn classify_api_error(status: StatusCode, body: &[u8], sheet: &SheetRef) -> ReportError {
    let (message, api_status) = match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (body_excerpt(body), None),
    };

    let not_found = || ReportError::SheetNotFound {
        spreadsheet: sheet.spreadsheet_id.clone(),
        tab: sheet.tab.clone(),
    };

    match status {
        StatusCode::NOT_FOUND => not_found(),
        StatusCode::BAD_REQUEST if message.contains("Unable to parse range") => not_found(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ReportError::Auth(format!("Sheets API rejected credentials ({}): {}", status, message))
        }
        _ => ReportError::DataSource(format!(
            "Sheets API returned {}{}: {}",
            status,
            api_status.map(|s| format!(" {}", s)).unwrap_or_default(),
            message
        )),
    }
}

/// `values.get`のレスポンスをグリッドに変換
///
/// 文字列以外のセルは文字列化し、`null`は空文字列にします。
fn parse_values(body: &[u8]) -> Result<Vec<Vec<String>>, ReportError> {
    let range: ValueRange = serde_json::from_slice(body)
        .map_err(|e| ReportError::DataSource(format!("Malformed values response: {}", e)))?;

    Ok(range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
