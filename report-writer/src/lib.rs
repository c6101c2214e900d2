pub mod html;
pub mod tabular;

use researcher_core::{ErrorExt, PostRecord, ReportError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// Nothing to write; no file was created.
    Skipped,
}

/// Result of running every writer once. A failed writer does not prevent the
/// others from running.
#[derive(Debug)]
pub struct ReportSummary {
    pub csv: Result<WriteOutcome, ReportError>,
    pub spreadsheet: Result<WriteOutcome, ReportError>,
    pub html: Result<WriteOutcome, ReportError>,
}

impl ReportSummary {
    fn results(&self) -> [&Result<WriteOutcome, ReportError>; 3] {
        [&self.csv, &self.spreadsheet, &self.html]
    }

    pub fn written(&self) -> Vec<&Path> {
        self.results()
            .into_iter()
            .filter_map(|result| match result {
                Ok(WriteOutcome::Written(path)) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&ReportError> {
        self.results()
            .into_iter()
            .filter_map(|result| result.as_ref().err())
            .collect()
    }

    pub fn all_skipped(&self) -> bool {
        self.results()
            .into_iter()
            .all(|result| matches!(result, Ok(WriteOutcome::Skipped)))
    }
}

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn write_csv(
        &self,
        records: &[PostRecord],
        name: &str,
    ) -> Result<WriteOutcome, ReportError> {
        let Some(path) = self.prepare(records, &format!("{}_posts.csv", name))? else {
            return Ok(WriteOutcome::Skipped);
        };
        tabular::write_csv(records, &path)?;
        info!("Data successfully saved to {}", path.display());
        Ok(WriteOutcome::Written(path))
    }

    pub fn write_spreadsheet(
        &self,
        records: &[PostRecord],
        name: &str,
    ) -> Result<WriteOutcome, ReportError> {
        let Some(path) = self.prepare(records, &format!("{}_posts.xlsx", name))? else {
            return Ok(WriteOutcome::Skipped);
        };
        tabular::write_spreadsheet(records, &path)?;
        info!("Data successfully saved to {}", path.display());
        Ok(WriteOutcome::Written(path))
    }

    pub fn write_html_report(
        &self,
        records: &[PostRecord],
        name: &str,
    ) -> Result<WriteOutcome, ReportError> {
        let Some(path) = self.prepare(records, &format!("{}_report.html", name))? else {
            return Ok(WriteOutcome::Skipped);
        };
        let page = html::render_report(records, name);
        fs::write(&path, page.into_string())?;
        info!("HTML report saved to {}", path.display());
        Ok(WriteOutcome::Written(path))
    }

    pub fn write_all(&self, records: &[PostRecord], name: &str) -> ReportSummary {
        let summary = ReportSummary {
            csv: self.write_csv(records, name),
            spreadsheet: self.write_spreadsheet(records, name),
            html: self.write_html_report(records, name),
        };
        for error in summary.failures() {
            error.log_error();
        }
        summary
    }

    /// `None` when there is nothing to write.
    fn prepare(
        &self,
        records: &[PostRecord],
        file_name: &str,
    ) -> Result<Option<PathBuf>, ReportError> {
        if records.is_empty() {
            info!("No data to save.");
            return Ok(None);
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(Some(self.output_dir.join(file_name)))
    }
}
