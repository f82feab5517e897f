use std::process;

use sheetreport::{PipelineBuilder, ReportError, RunSummary};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run() -> Result<RunSummary, ReportError> {
    let pipeline = PipelineBuilder::new().build()?;
    let source = pipeline.google_sheets_source()?;
    pipeline.run(&source)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    match run() {
        Ok(summary) => info!(
            records = summary.record_count,
            highlights = summary.highlight_count,
            path = %summary.output_path.display(),
            "update finished"
        ),
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            process::exit(1);
        }
    }
}
