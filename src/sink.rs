//! Result Sink: consumers of finished role outputs.
//!
//! The pipeline hands each role output over as soon as it is computed, so
//! a consumer can show partial progress. Implementations must tolerate the
//! three independent roles arriving in any order; Aggregation always
//! arrives last. A pipeline re-run simply overwrites prior outputs for the
//! same roles.

use std::io;
use std::path::Path;

use crate::pipeline::types::{Role, RoleOutput};

/// Consumer of finished role outputs, fed incrementally by the pipeline.
pub trait ReportSink {
    fn accept(&mut self, role: Role, output: &RoleOutput);
}

/// Header line introducing a role's section in persisted output.
pub fn section_header(role: Role) -> String {
    format!("--- {role} Report ---")
}

/// Interactive display variant: prints each labeled section as it arrives.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn accept(&mut self, role: Role, output: &RoleOutput) {
        println!("{}\n{}\n", section_header(role), output.as_text());
    }
}

/// File-writer variant: buffers outputs by role, then persists labeled
/// sections in canonical order (Cardiology, Psychology, Pulmonology,
/// Aggregation).
#[derive(Debug, Default)]
pub struct FileSink {
    cardiology: Option<RoleOutput>,
    psychology: Option<RoleOutput>,
    pulmonology: Option<RoleOutput>,
    aggregation: Option<RoleOutput>,
}

impl ReportSink for FileSink {
    fn accept(&mut self, role: Role, output: &RoleOutput) {
        let slot = match role {
            Role::Cardiology => &mut self.cardiology,
            Role::Psychology => &mut self.psychology,
            Role::Pulmonology => &mut self.pulmonology,
            Role::Aggregation => &mut self.aggregation,
        };
        *slot = Some(output.clone());
    }
}

impl FileSink {
    /// Write the collected sections to `path`. Roles not delivered yet are
    /// skipped; delivered roles always have text, even on failure.
    pub fn persist(&self, path: &Path) -> io::Result<()> {
        let mut contents = String::new();
        for output in [
            &self.cardiology,
            &self.psychology,
            &self.pulmonology,
            &self.aggregation,
        ]
        .into_iter()
        .flatten()
        {
            contents.push_str(&section_header(output.role));
            contents.push('\n');
            contents.push_str(output.as_text());
            contents.push_str("\n\n");
        }
        std::fs::write(path, contents)?;
        tracing::info!(path = %path.display(), "opinion sections persisted");
        Ok(())
    }
}

/// Test-capture variant: records deliveries in arrival order.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub received: Vec<RoleOutput>,
}

impl ReportSink for CaptureSink {
    fn accept(&mut self, _role: Role, output: &RoleOutput) {
        self.received.push(output.clone());
    }
}

impl CaptureSink {
    /// Roles in the order they arrived.
    pub fn roles(&self) -> Vec<Role> {
        self.received.iter().map(|o| o.role).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(role: Role, text: &str) -> RoleOutput {
        use crate::pipeline::types::Outcome;
        RoleOutput {
            role,
            outcome: Outcome::Generated(text.to_string()),
        }
    }

    #[test]
    fn section_header_format() {
        assert_eq!(section_header(Role::Cardiology), "--- Cardiology Report ---");
        assert_eq!(
            section_header(Role::Aggregation),
            "--- Aggregation Report ---"
        );
    }

    #[test]
    fn file_sink_persists_in_canonical_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_diagnosis.txt");

        let mut sink = FileSink::default();
        // Deliberately out of order; the file layout must not depend on
        // arrival order.
        sink.accept(Role::Pulmonology, &generated(Role::Pulmonology, "lungs clear"));
        sink.accept(Role::Cardiology, &generated(Role::Cardiology, "sinus rhythm"));
        sink.accept(Role::Aggregation, &generated(Role::Aggregation, "summary"));
        sink.accept(Role::Psychology, &generated(Role::Psychology, "mild anxiety"));
        sink.persist(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let cardio = contents.find("--- Cardiology Report ---").unwrap();
        let psych = contents.find("--- Psychology Report ---").unwrap();
        let pulmo = contents.find("--- Pulmonology Report ---").unwrap();
        let agg = contents.find("--- Aggregation Report ---").unwrap();
        assert!(cardio < psych && psych < pulmo && pulmo < agg);
        assert!(contents.contains("sinus rhythm"));
        assert!(contents.contains("summary"));
    }

    #[test]
    fn file_sink_rerun_overwrites_prior_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = FileSink::default();
        sink.accept(Role::Cardiology, &generated(Role::Cardiology, "first run"));
        sink.accept(Role::Cardiology, &generated(Role::Cardiology, "second run"));
        sink.persist(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("second run"));
        assert!(!contents.contains("first run"));
    }

    #[test]
    fn file_sink_skips_undelivered_roles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.txt");

        let mut sink = FileSink::default();
        sink.accept(Role::Psychology, &generated(Role::Psychology, "calm"));
        sink.persist(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("--- Psychology Report ---"));
        assert!(!contents.contains("--- Cardiology Report ---"));
    }

    #[test]
    fn capture_sink_records_arrival_order() {
        let mut sink = CaptureSink::default();
        sink.accept(Role::Psychology, &generated(Role::Psychology, "a"));
        sink.accept(Role::Cardiology, &generated(Role::Cardiology, "b"));
        assert_eq!(sink.roles(), vec![Role::Psychology, Role::Cardiology]);
    }
}
