//! sheetreport - Spreadsheet-to-HTML report generator
//!
//! This crate reads a tab of tabular indicator data (a Google spreadsheet via
//! the Sheets API, or a local workbook) and renders it into a single,
//! self-contained HTML page: a grid of highlight cards for the first records
//! followed by a complete table of every record.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sheetreport::PipelineBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Defaults: tab "Dados", credentials.json, index.html
//!     let pipeline = PipelineBuilder::new().build()?;
//!
//!     // Google Sheets source with the pipeline's timeout and fetch shape
//!     let source = pipeline.google_sheets_source()?;
//!
//!     let summary = pipeline.run(&source)?;
//!     println!("{} records written to {}", summary.record_count, summary.output_path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Local Workbook
//!
//! ```rust,no_run
//! use sheetreport::{PipelineBuilder, WorkbookSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PipelineBuilder::new()
//!     .with_output_path("report.html")
//!     .build()?;
//! pipeline.run(&WorkbookSource::new("indicadores.xlsx"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Rendering Only
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sheetreport::ReportRenderer;
//!
//! let header = vec!["Indicador".to_string(), "Valor".to_string()];
//! let rows = vec![vec!["Operadoras".to_string(), "700".to_string()]];
//! let generated_at = NaiveDate::from_ymd_opt(2024, 1, 31)
//!     .and_then(|d| d.and_hms_opt(8, 30, 0))
//!     .unwrap();
//!
//! let html = ReportRenderer::default().render_grid(header, rows, generated_at);
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! ```

mod api;
mod builder;
mod error;
mod grid;
mod output;
mod security;
mod source;
mod types;
mod writer;

// 公開API
pub use api::{FetchShape, FieldMapping, ReportText, TimestampFormat, HIGHLIGHT_LIMIT, PLACEHOLDER};
pub use builder::{Pipeline, PipelineBuilder, RunSummary, DEFAULT_SPREADSHEET_ID};
pub use error::{ErrorKind, ReportError};
pub use grid::{Column, RecordTable};
pub use output::ReportRenderer;
pub use source::{Credentials, DataSource, GoogleSheetsSource, SheetsSession, WorkbookSource};
pub use types::{Record, RowSet, SheetRef};
pub use writer::write_report;
