//! Grid Module
//!
//! データソースから返された2種類の行データ（レコード列 / ヘッダー付きグリッド）を
//! 列順の確定した正規形`RecordTable`に変換するモジュール。
//! レンダラーはこの正規形だけを扱うため、入力の形を意識しません。

use tracing::debug;

use crate::api::{FieldMapping, PLACEHOLDER};
use crate::types::{Record, RowSet};

/// 全件表の列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// 列名（ヘッダーセルの表示文字列であり、レコードの検索キー）
    pub name: String,

    /// 値を強調表示するかどうか
    pub emphasis: bool,
}

impl Column {
    /// 通常の列を生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emphasis: false,
        }
    }

    /// 強調表示する列を生成
    pub fn emphasized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emphasis: true,
        }
    }
}

/// 正規化されたレコード表
///
/// 列集合は1回の実行で一度だけ決定され、すべてのレコードで共通です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    /// 列定義（表示順）
    columns: Vec<Column>,

    /// レコード（元の順序のまま）
    records: Vec<Record>,
}

impl RecordTable {
    /// 行データから正規化された表を構築
    ///
    /// # 引数
    ///
    /// * `rows` - データソースから返された行データ
    /// * `fields` - レコード形式の場合に全件表の列となるフィールド名
    ///
    /// # 列の決定方法
    ///
    /// - `RowSet::Records`: フィールドマッピングの4列（値の列を強調表示）
    /// - `RowSet::Grid`: ヘッダー行の列名をそのまま使用
    pub fn build(rows: RowSet, fields: &FieldMapping) -> Self {
        let table = match rows {
            RowSet::Records(records) => Self::from_records(records, fields),
            RowSet::Grid { header, rows } => Self::from_grid(header, rows),
        };

        debug!(
            columns = table.columns.len(),
            records = table.records.len(),
            "normalized rows"
        );

        table
    }

    /// レコード形式から構築（内部ヘルパー）
    fn from_records(records: Vec<Record>, fields: &FieldMapping) -> Self {
        let columns = fields
            .table_fields()
            .iter()
            .map(|name| {
                if *name == fields.value {
                    Column::emphasized(*name)
                } else {
                    Column::new(*name)
                }
            })
            .collect();

        Self { columns, records }
    }

    /// グリッド形式から構築（内部ヘルパー）
    ///
    /// 各データ行をヘッダーと位置で対応付けます。
    /// ヘッダーより短い行の不足セルはレコードに含めず（表示時に`N/A`）、
    /// 長い行の余分なセルは無視します。
    /// ヘッダーに同じ列名が複数ある場合は、先に現れたセルの値を使用します。
    fn from_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                let mut record = Record::with_capacity(header.len());
                for (name, value) in header.iter().zip(row) {
                    record.entry(name.clone()).or_insert(value);
                }
                record
            })
            .collect();

        let columns = header.into_iter().map(Column::new).collect();

        Self { columns, records }
    }

    /// 列定義を取得
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// すべてのレコードを取得
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// レコード数を取得
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// レコードが1件もないかどうか
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 先頭から最大`limit`件のレコードを取得
    ///
    /// ハイライトは常に全件の接頭辞であり、内容による並べ替えや絞り込みは行いません。
    pub fn highlights(&self, limit: usize) -> &[Record] {
        &self.records[..self.records.len().min(limit)]
    }
}

/// レコードからフィールド値を取得し、存在しない場合は`N/A`を返す
pub(crate) fn field<'a>(record: &'a Record, name: &str) -> &'a str {
    record.get(name).map(String::as_str).unwrap_or(PLACEHOLDER)
}
