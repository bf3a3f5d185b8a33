//! Hands the rendered report to the user as a named file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::error::DownloadError;
use crate::model::ReportSelection;

/// Writes report bytes into an output directory.
///
/// Bytes go to a temporary file in the same directory first and are moved
/// into place only once fully written, so a failed run never leaves a
/// truncated report behind.
#[derive(Clone, Debug)]
pub struct ReportDownloader {
    output_dir: PathBuf,
}

impl ReportDownloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination used for `selection`.
    pub fn target_path(&self, selection: ReportSelection) -> PathBuf {
        self.output_dir.join(selection.file_name())
    }

    /// Stores `bytes` as `library-report-<Month>-<Year>.pdf`, replacing any
    /// earlier report for the same month.
    pub fn save(&self, selection: ReportSelection, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| DownloadError::OutputDirectory {
            path: self.output_dir.clone(),
            source,
        })?;

        let target = self.target_path(selection);
        let write_error = |source: std::io::Error| DownloadError::Write {
            path: target.clone(),
            source,
        };

        let mut staging = NamedTempFile::new_in(&self.output_dir).map_err(write_error)?;
        staging.write_all(bytes).map_err(write_error)?;
        staging.flush().map_err(write_error)?;
        staging
            .persist(&target)
            .map_err(|err| write_error(err.error))?;

        info!("Saved report to {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> ReportSelection {
        ReportSelection::new(2, 2024).expect("valid selection")
    }

    #[test]
    fn saves_under_report_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let downloader = ReportDownloader::new(dir.path());

        let path = downloader.save(march(), b"%PDF-1.3").expect("save succeeds");

        assert_eq!(path, dir.path().join("library-report-March-2024.pdf"));
        assert_eq!(fs::read(&path).expect("file readable"), b"%PDF-1.3");
    }

    #[test]
    fn replaces_existing_report_without_leftovers() {
        let dir = tempfile::tempdir().expect("temp dir");
        let downloader = ReportDownloader::new(dir.path());

        downloader.save(march(), b"old").expect("first save");
        let path = downloader.save(march(), b"new").expect("second save");

        assert_eq!(fs::read(&path).expect("file readable"), b"new");
        let entries = fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("reports/2024");
        let downloader = ReportDownloader::new(&nested);

        let path = downloader.save(march(), b"%PDF").expect("save succeeds");
        assert!(path.starts_with(&nested));
    }
}
