//! Workbook Source
//!
//! calamineを使用してローカルのワークブック（xlsx / xls / xlsb / ods）から
//! 1つのタブを読み込むデータソース。認証情報は不要です。

use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::api::FetchShape;
use crate::error::ReportError;
use crate::security::SourceLimits;
use crate::source::credentials::Credentials;
use crate::source::DataSource;
use crate::types::{RowSet, SheetRef};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// ローカルワークブックのデータソース
///
/// `SheetRef::spreadsheet_id`は無視され、`tab`のみでシートを選択します。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetreport::{PipelineBuilder, WorkbookSource};
///
/// # fn main() -> Result<(), sheetreport::ReportError> {
/// let pipeline = PipelineBuilder::new().with_tab("Dados").build()?;
/// let summary = pipeline.run(&WorkbookSource::new("indicadores.xlsx"))?;
/// println!("{} records", summary.record_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    limits: SourceLimits,
    shape: FetchShape,
}

impl WorkbookSource {
    /// ワークブックのパスを指定してデータソースを生成
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limits: SourceLimits::default(),
            shape: FetchShape::Records,
        }
    }

    /// 返す行データの形を指定
    pub fn with_fetch_shape(mut self, shape: FetchShape) -> Self {
        self.shape = shape;
        self
    }

    /// 返す行データの形
    pub fn fetch_shape(&self) -> FetchShape {
        self.shape
    }

    /// ワークブックのパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルをサイズ制限付きで読み込む（内部ヘルパー）
    fn read_file(&self) -> Result<Vec<u8>, ReportError> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| {
            ReportError::DataSource(format!(
                "Cannot open workbook {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if metadata.len() > self.limits.max_workbook_size {
            return Err(ReportError::DataSource(format!(
                "Workbook size exceeds maximum: {} bytes (max: {} bytes)",
                metadata.len(),
                self.limits.max_workbook_size
            )));
        }

        Ok(std::fs::read(&self.path)?)
    }
}

impl DataSource for WorkbookSource {
    type Session = ();

    fn requires_credentials(&self) -> bool {
        false
    }

    fn authenticate(&self, _credentials: &Credentials) -> Result<(), ReportError> {
        Ok(())
    }

    fn fetch(&self, _session: &(), sheet: &SheetRef) -> Result<RowSet, ReportError> {
        let buffer = self.read_file()?;
        debug!(path = %self.path.display(), bytes = buffer.len(), "opening workbook");

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        if !workbook.sheet_names().iter().any(|name| name == &sheet.tab) {
            return Err(ReportError::SheetNotFound {
                spreadsheet: self.path.display().to_string(),
                tab: sheet.tab.clone(),
            });
        }

        let range = workbook.worksheet_range(&sheet.tab)?;
        let grid = range_to_grid(&range);
        info!(rows = grid.len(), tab = %sheet.tab, "read workbook tab");

        Ok(match self.shape {
            FetchShape::Records => RowSet::records_from_grid(grid),
            FetchShape::Grid => RowSet::from_grid(grid),
        })
    }
}

/// セル範囲を文字列のグリッドに変換
///
/// calamineの範囲は最初の非空セルから始まるため、先頭の空行・空列を補って
/// シート上の位置（A1起点）を保ちます。各行の末尾の空セルと、末尾の空行は
/// 取り除きます（Sheets APIの`values`と同じ形）。
fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid: Vec<Vec<String>> = (0..start_row).map(|_| Vec::new()).collect();

    for row in range.rows() {
        let mut cells: Vec<String> = std::iter::repeat(String::new())
            .take(start_col as usize)
            .chain(row.iter().map(cell_to_string))
            .collect();

        while cells.last().is_some_and(|cell| cell.is_empty()) {
            cells.pop();
        }
        grid.push(cells);
    }

    while grid.last().is_some_and(|row| row.is_empty()) {
        grid.pop();
    }

    grid
}

/// セル値を表示用の文字列に変換
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.clone(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_string(serial).unwrap_or_else(|| serial.to_string())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

/// シリアル日付値を`YYYY-MM-DD`（時刻部分があれば`YYYY-MM-DD HH:MM`）に変換
///
/// 1900年システム（1899-12-30起算）として扱います。
/// 1900-03-01より前のシリアル値はExcelの表示と1日ずれます。
fn serial_to_string(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.floor();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;

    let datetime = epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_days(days as i64)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)?;

    if datetime.time() == NaiveTime::MIN {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};

    fn write_workbook(build: impl FnOnce(&mut Workbook)) -> tempfile::NamedTempFile {
        let mut workbook = Workbook::new();
        build(&mut workbook);
        let buffer = workbook.save_to_buffer().unwrap();

        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        std::fs::write(file.path(), buffer).unwrap();
        file
    }

    fn indicator_workbook() -> tempfile::NamedTempFile {
        write_workbook(|workbook| {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Dados").unwrap();
            for (col, name) in ["Indicador", "Valor", "Fonte", "Data"].iter().enumerate() {
                sheet.write_string(0, col as u16, *name).unwrap();
            }
            sheet.write_string(1, 0, "Beneficiários").unwrap();
            sheet.write_string(1, 1, "50M").unwrap();
            sheet.write_string(1, 2, "ANS").unwrap();
            sheet.write_string(1, 3, "2024-01").unwrap();
            sheet.write_string(2, 0, "Operadoras").unwrap();
            sheet.write_number(2, 1, 700.0).unwrap();
        })
    }

    #[test]
    fn test_serial_to_string_date() {
        assert_eq!(serial_to_string(45658.0).unwrap(), "2025-01-01");
        assert_eq!(serial_to_string(1.0).unwrap(), "1899-12-31");
    }

    #[test]
    fn test_serial_to_string_with_time() {
        assert_eq!(serial_to_string(45658.5).unwrap(), "2025-01-01 12:00");
        assert_eq!(serial_to_string(45658.75).unwrap(), "2025-01-01 18:00");
    }

    #[test]
    fn test_serial_to_string_non_finite() {
        assert!(serial_to_string(f64::NAN).is_none());
        assert!(serial_to_string(f64::INFINITY).is_none());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::Bool(false)), "FALSE");
        assert_eq!(cell_to_string(&Data::String("ANS".to_string())), "ANS");
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2024-01-31T00:00:00".to_string())),
            "2024-01-31T00:00:00"
        );
        assert_eq!(
            cell_to_string(&Data::Error(calamine::CellErrorType::Div0)),
            "#DIV/0!"
        );
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_fetch_records() {
        let file = indicator_workbook();
        let source = WorkbookSource::new(file.path());

        let rows = source.fetch(&(), &SheetRef::new("", "Dados")).unwrap();
        let records = match rows {
            RowSet::Records(records) => records,
            other => panic!("Expected records, got {:?}", other),
        };

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Indicador"], "Beneficiários");
        assert_eq!(records[0]["Data"], "2024-01");
        assert_eq!(records[1]["Valor"], "700");
        // 短い行は空文字列で埋める
        assert_eq!(records[1]["Fonte"], "");
    }

    #[test]
    fn test_fetch_grid_trims_trailing_cells() {
        let file = indicator_workbook();
        let source = WorkbookSource::new(file.path()).with_fetch_shape(FetchShape::Grid);

        let rows = source.fetch(&(), &SheetRef::new("", "Dados")).unwrap();
        match rows {
            RowSet::Grid { header, rows } => {
                assert_eq!(header, vec!["Indicador", "Valor", "Fonte", "Data"]);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1], vec!["Operadoras", "700"]);
            }
            other => panic!("Expected grid, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_dates() {
        let file = write_workbook(|workbook| {
            let date_format = Format::new().set_num_format("yyyy-mm-dd");
            let sheet = workbook.add_worksheet();
            sheet.set_name("Dados").unwrap();
            sheet.write_string(0, 0, "Data").unwrap();
            sheet
                .write_number_with_format(1, 0, 45658.0, &date_format)
                .unwrap();
        });

        let rows = WorkbookSource::new(file.path())
            .fetch(&(), &SheetRef::new("", "Dados"))
            .unwrap();
        match rows {
            RowSet::Records(records) => assert_eq!(records[0]["Data"], "2025-01-01"),
            other => panic!("Expected records, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_preserves_leading_blank_column() {
        let file = write_workbook(|workbook| {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Dados").unwrap();
            sheet.write_string(0, 1, "Valor").unwrap();
            sheet.write_string(1, 1, "50M").unwrap();
        });

        let rows = WorkbookSource::new(file.path())
            .with_fetch_shape(FetchShape::Grid)
            .fetch(&(), &SheetRef::new("", "Dados"))
            .unwrap();
        match rows {
            RowSet::Grid { header, rows } => {
                assert_eq!(header, vec!["", "Valor"]);
                assert_eq!(rows, vec![vec!["".to_string(), "50M".to_string()]]);
            }
            other => panic!("Expected grid, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_missing_tab() {
        let file = indicator_workbook();
        let result = WorkbookSource::new(file.path()).fetch(&(), &SheetRef::new("", "Outra"));
        match result {
            Err(ReportError::SheetNotFound { tab, .. }) => assert_eq!(tab, "Outra"),
            other => panic!("Expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_missing_file() {
        let result = WorkbookSource::new("does/not/exist.xlsx").fetch(&(), &SheetRef::new("", "Dados"));
        assert!(matches!(result, Err(ReportError::DataSource(_))));
    }

    #[test]
    fn test_fetch_not_a_workbook() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"Indicador,Valor\n").unwrap();

        let result = WorkbookSource::new(file.path()).fetch(&(), &SheetRef::new("", "Dados"));
        assert!(matches!(result, Err(ReportError::Workbook(_))));
    }

    #[test]
    fn test_requires_no_credentials() {
        let source = WorkbookSource::new("unused.xlsx");
        assert!(!source.requires_credentials());
        assert!(source.authenticate(&Credentials::Anonymous).is_ok());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_serial_date_monotonicity(
                serial1 in 61.0f64..60000.0,
                serial2 in 61.0f64..60000.0
            ) {
                let date1 = serial_to_string(serial1.floor()).unwrap();
                let date2 = serial_to_string(serial2.floor()).unwrap();

                // YYYY-MM-DD は辞書順と日付順が一致する
                if serial1.floor() < serial2.floor() {
                    prop_assert!(date1 < date2);
                } else if serial1.floor() > serial2.floor() {
                    prop_assert!(date1 > date2);
                } else {
                    prop_assert_eq!(date1, date2);
                }
            }
        }
    }
}
