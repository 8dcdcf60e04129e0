//! Export functionality for vetting reports.
//!
//! Writes plain-text path lists that downstream tools (move scripts,
//! playlist builders) can consume line by line.

use super::report::VettingReport;
use crate::error::ReportError;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the new-file paths to a text artifact, one per line
pub fn export_new_songs(report: &VettingReport, output: &Path) -> Result<(), ReportError> {
    let paths: Vec<&Path> = report.new_files.iter().map(|p| p.as_path()).collect();
    write_path_list(&paths, output)
}

/// Write the confirmed-duplicate paths to a text artifact, one per line
pub fn export_duplicates(report: &VettingReport, output: &Path) -> Result<(), ReportError> {
    let paths: Vec<&Path> = report.duplicates.iter().map(|e| e.path.as_path()).collect();
    write_path_list(&paths, output)
}

/// Write the uncertain paths to a text artifact, one per line
pub fn export_uncertain(report: &VettingReport, output: &Path) -> Result<(), ReportError> {
    let paths: Vec<&Path> = report.uncertain.iter().map(|e| e.path.as_path()).collect();
    write_path_list(&paths, output)
}

fn write_path_list(paths: &[&Path], output: &Path) -> Result<(), ReportError> {
    if output.as_os_str().is_empty() {
        return Err(ReportError::EmptyOutputPath);
    }

    let file = std::fs::File::create(output).map_err(|e| ReportError::WriteFailed {
        path: output.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    for path in paths {
        writeln!(writer, "{}", path.display()).map_err(|e| ReportError::WriteFailed {
            path: output.to_path_buf(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| ReportError::WriteFailed {
        path: output.to_path_buf(),
        source: e,
    })
}
