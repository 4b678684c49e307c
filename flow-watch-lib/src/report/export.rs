use super::TaskReport;
use crate::Result;
use camino::Utf8Path;
use chrono::NaiveDate;
use ohno::{IntoAppError, bail};
use std::fs;

/// File name used when the caller asks for an export without naming a file.
#[must_use]
pub fn default_file_name(date: NaiveDate) -> String {
    format!("flow_watch_data_{}.json", date.format("%Y-%m-%d"))
}

/// Write `report` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the report holds no data or the file cannot be written.
pub fn write_json(report: &TaskReport, path: &Utf8Path) -> Result<()> {
    if report.is_empty() {
        bail!("no data to export");
    }

    let json = serde_json::to_string_pretty(report).into_app_err("serializing task report")?;
    fs::write(path, json).into_app_err_with(|| format!("writing task report to '{path}'"))?;

    log::info!("exported task report to '{path}'");
    Ok(())
}
