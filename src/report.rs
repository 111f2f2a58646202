//! Input Provider: the medical report a pipeline run analyzes.
//!
//! The report is loaded once, before the run, and handed to the
//! orchestrator as an owned snapshot. Nothing mutates it afterwards; a new
//! file selection produces a new `MedicalReport` for the next run.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No medical report available at {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One immutable snapshot of the report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalReport {
    text: String,
}

impl MedicalReport {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load the report from a plain-text file.
    ///
    /// A missing or unreadable file is the "none selected" signal from the
    /// input boundary; the caller decides whether to surface it or fall
    /// back to the empty-report advisory.
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReportError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "medical report loaded");
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace-only reports count as empty for the pipeline precondition.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_keeps_content() {
        let report = MedicalReport::from_text("Patient reports chest tightness.");
        assert_eq!(report.text(), "Patient reports chest tightness.");
        assert!(!report.is_empty());
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(MedicalReport::from_text("").is_empty());
        assert!(MedicalReport::from_text("  \n\t ").is_empty());
    }

    #[test]
    fn from_file_reads_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "ECG normal. Holter pending.").unwrap();

        let report = MedicalReport::from_file(&path).unwrap();
        assert_eq!(report.text(), "ECG normal. Holter pending.");
    }

    #[test]
    fn missing_file_signals_none_selected() {
        let dir = tempfile::tempdir().unwrap();
        let err = MedicalReport::from_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }
}
