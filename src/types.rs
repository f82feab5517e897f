//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use indexmap::IndexMap;

/// 1行分のデータ（列名 → セル値）
///
/// 列の挿入順はレンダリング順として意味を持つため、`IndexMap`で保持します。
pub type Record = IndexMap<String, String>;

/// データソースから返される生の行データ
///
/// データソースの形に応じて2つの表現があります。どちらも
/// `RecordTable`によって同じ正規形に変換されてからレンダリングされます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSet {
    /// 列名でタグ付けされたレコードの列
    Records(Vec<Record>),

    /// ヘッダー行と位置ベースの値リスト
    Grid {
        /// ヘッダー行（列の順序を決定する）
        header: Vec<String>,
        /// データ行
        rows: Vec<Vec<String>>,
    },
}

impl RowSet {
    /// 生のグリッド（先頭行がヘッダー）から`RowSet::Grid`を生成
    ///
    /// 空のグリッドはヘッダーもデータ行も持たない`Grid`になります。
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return RowSet::Grid {
                header: Vec::new(),
                rows: Vec::new(),
            };
        }
        let header = grid.remove(0);
        RowSet::Grid { header, rows: grid }
    }

    /// 先頭行をヘッダーとして各データ行を列名付きのレコードに変換する
    ///
    /// ヘッダーより短い行は空文字列で埋め、長い行の余分なセルは捨てます。
    /// ヘッダーに同じ列名が複数ある場合は、先に現れたセルの値を使用します。
    pub fn records_from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid.into_iter();
        let header = match rows.next() {
            Some(header) => header,
            None => return RowSet::Records(Vec::new()),
        };

        let records = rows
            .map(|row| {
                let mut cells = row.into_iter();
                let mut record = Record::with_capacity(header.len());
                for name in &header {
                    let value = cells.next().unwrap_or_default();
                    record.entry(name.clone()).or_insert(value);
                }
                record
            })
            .collect();

        RowSet::Records(records)
    }

    /// レコード数（ヘッダー行は含まない）
    pub fn len(&self) -> usize {
        match self {
            RowSet::Records(records) => records.len(),
            RowSet::Grid { rows, .. } => rows.len(),
        }
    }

    /// レコードが1件もないかどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 取得対象のスプレッドシートとタブ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    /// スプレッドシートID（URLに含まれる識別子）
    pub spreadsheet_id: String,

    /// タブ（ワークシート）名
    pub tab: String,
}

impl SheetRef {
    /// 新しい参照を生成
    pub fn new(spreadsheet_id: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            tab: tab.into(),
        }
    }
}
