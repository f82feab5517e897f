//! Security Module
//!
//! データソースとの通信・ファイル読み込みに対する制限値と入力検証を提供するモジュール。
//! ネットワーク呼び出しが無期限に停止しないよう、すべてのリクエストにタイムアウトを設定します。

use std::time::Duration;

/// タブ名の最大長（Google スプレッドシートの制限に合わせる）
const MAX_TAB_NAME_CHARS: usize = 100;

/// データソースの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLimits {
    /// HTTPリクエスト1回あたりのタイムアウト
    /// デフォルト: 30秒
    pub request_timeout: Duration,
    /// HTTPレスポンス本文の最大サイズ（バイト）
    /// デフォルト: 16MB (16_777_216 bytes)
    pub max_response_size: u64,
    /// ローカルワークブックの最大サイズ（バイト）
    /// デフォルト: 256MB (268_435_456 bytes)
    pub max_workbook_size: u64,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_response_size: 16_777_216,  // 16MB
            max_workbook_size: 268_435_456, // 256MB
        }
    }
}

impl SourceLimits {
    /// タイムアウトのみを変更した制限設定を作成
    pub fn with_timeout(request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            ..Self::default()
        }
    }
}

/// タブ名の検証
///
/// # 戻り値
///
/// * `Ok(())` - タブ名が有効な場合
/// * `Err(String)` - 空、長すぎる、または制御文字を含む場合
pub(crate) fn validate_tab_name(tab: &str) -> Result<(), String> {
    if tab.trim().is_empty() {
        return Err("Tab name must not be empty".to_string());
    }

    if tab.chars().count() > MAX_TAB_NAME_CHARS {
        return Err(format!(
            "Tab name exceeds {} characters: {}",
            MAX_TAB_NAME_CHARS, tab
        ));
    }

    if tab.chars().any(char::is_control) {
        return Err(format!("Control character in tab name: {:?}", tab));
    }

    Ok(())
}
