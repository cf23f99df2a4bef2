//! Writing the markdown report to disk and reading saved JSON reports back

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::{Report, render_markdown};
use crate::error::Result;

/// Write the markdown rendering to `path`.
///
/// A failed write never propagates: it is logged, appended to `error_log`
/// (best effort) and reported as `None`.
pub fn save_report(report: &Report, path: &Path, error_log: &Path) -> Option<PathBuf> {
    let markdown = render_markdown(report);
    match write_report(path, &markdown) {
        Ok(()) => {
            info!("Report successfully saved to: {}", path.display());
            Some(path.to_path_buf())
        }
        Err(e) => {
            error!("Error saving report to {}: {}", path.display(), e);
            if let Err(log_err) = append_error_log(error_log, path, &e) {
                error!(
                    "Could not append to error log {}: {}",
                    error_log.display(),
                    log_err
                );
            }
            None
        }
    }
}

/// Read a report previously saved as JSON (`analyze --format json`)
pub fn load_report(path: &Path) -> Result<Report> {
    let raw = std::fs::read_to_string(path)?;
    let report = serde_json::from_str(&raw)?;
    Ok(report)
}

fn write_report(path: &Path, markdown: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, markdown)
}

fn append_error_log(log: &Path, target: &Path, err: &std::io::Error) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)?;
    writeln!(
        file,
        "{} - Error saving {}:\n{}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        target.display(),
        err
    )
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::sample_report;
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("newsprobe-persist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_writes_markdown() {
        let dir = temp_dir();
        let path = dir.join("nested").join("report.md");
        let saved = save_report(&sample_report(), &path, &dir.join("errors.log"));
        assert_eq!(saved.as_deref(), Some(path.as_path()));
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("# News Analysis Report: Election fraud claims"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_report_round_trip_and_errors() {
        use crate::error::NewsProbeError;

        let dir = temp_dir();
        let path = dir.join("report.json");
        std::fs::write(&path, serde_json::to_string(&sample_report()).unwrap()).unwrap();
        assert_eq!(load_report(&path).unwrap(), sample_report());

        let missing = load_report(&dir.join("absent.json")).unwrap_err();
        assert!(matches!(missing, NewsProbeError::Persistence { .. }));

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "# not json").unwrap();
        let err = load_report(&bad).unwrap_err();
        assert!(matches!(err, NewsProbeError::Serialization { .. }));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_failed_save_logs_and_returns_none() {
        let dir = temp_dir();
        // A directory cannot be overwritten as a file
        let saved = save_report(&sample_report(), &dir, &dir.join("errors.log"));
        assert!(saved.is_none());
        let log = std::fs::read_to_string(dir.join("errors.log")).unwrap();
        assert!(log.contains("Error saving"));
        std::fs::remove_dir_all(dir).ok();
    }
}
