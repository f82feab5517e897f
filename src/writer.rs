//! Report Writer
//!
//! 生成した文書をファイルに書き出すモジュール。

use std::path::Path;

use tracing::debug;

use crate::error::ReportError;

/// レポートをファイルに書き出す
///
/// 既存のファイルは無条件に上書きされます（バックアップや一時ファイル経由の
/// 置き換えは行いません）。
///
/// # 引数
///
/// * `path` - 出力先のパス
/// * `content` - 書き出す文書（UTF-8）
///
/// # 戻り値
///
/// * `Ok(())` - 書き込みに成功した場合
/// * `Err(ReportError::Write)` - 書き込みに失敗した場合
pub fn write_report(path: &Path, content: &str) -> Result<(), ReportError> {
    std::fs::write(path, content.as_bytes()).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = content.len(), "report written");
    Ok(())
}
