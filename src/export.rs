//! Document export: renders a finished opinion set as a paginated PDF.
//!
//! The byte layout is whatever `printpdf` produces; callers only rely on
//! getting one titled section per role, in canonical order, under a header
//! carrying the display name and generation timestamp.

use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use printpdf::*;
use thiserror::Error;

use crate::pipeline::types::OpinionSet;
use crate::sink::section_header;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished analysis prepared for export: the four role outputs plus a
/// display name and timestamp.
pub struct OpinionDocument<'a> {
    pub patient_label: String,
    pub generated_at: DateTime<Utc>,
    pub opinions: &'a OpinionSet,
}

impl OpinionDocument<'_> {
    /// Render the opinions as an A4 PDF. Returns the PDF bytes.
    pub fn render_pdf(&self) -> Result<Vec<u8>, ExportError> {
        let title = format!("Medical Opinions: {}", self.patient_label);
        let (doc, page1, layer1) = PdfDocument::new(&title, Mm(210.0), Mm(297.0), "Layer 1");
        let mut layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?;

        let mut y = Mm(280.0);

        layer.use_text(&title, 14.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        layer.use_text(
            format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC")),
            9.0,
            Mm(20.0),
            y,
            &font,
        );
        y -= Mm(10.0);

        for output in self.opinions.iter() {
            if y < Mm(40.0) {
                let (page, new_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
                layer = doc.get_page(page).get_layer(new_layer);
                y = Mm(280.0);
            }

            layer.use_text(section_header(output.role), 11.0, Mm(20.0), y, &bold);
            y -= Mm(6.0);

            for source_line in output.as_text().lines() {
                for line in wrap_text(source_line, 95) {
                    if y < Mm(20.0) {
                        let (page, new_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
                        layer = doc.get_page(page).get_layer(new_layer);
                        y = Mm(280.0);
                    }
                    layer.use_text(&line, 9.0, Mm(25.0), y, &font);
                    y -= Mm(4.5);
                }
            }
            y -= Mm(8.0);
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ExportError::Render(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ExportError::Render(format!("PDF buffer error: {e}")))
    }

    /// Render and write the PDF to `path`.
    pub fn export_pdf_to_file(&self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.render_pdf()?;
        std::fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), "opinion PDF exported");
        Ok(())
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Outcome, Role, RoleOutput};

    fn sample_set(body: &str) -> OpinionSet {
        let output = |role| RoleOutput {
            role,
            outcome: Outcome::Generated(body.to_string()),
        };
        OpinionSet {
            cardiology: output(Role::Cardiology),
            psychology: output(Role::Psychology),
            pulmonology: output(Role::Pulmonology),
            aggregation: output(Role::Aggregation),
        }
    }

    fn document(set: &OpinionSet) -> OpinionDocument<'_> {
        OpinionDocument {
            patient_label: "billu".to_string(),
            generated_at: chrono::DateTime::parse_from_rfc3339("2026-08-06T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            opinions: set,
        }
    }

    #[test]
    fn renders_pdf_bytes() {
        let set = sample_set("Possible arrhythmia. Recommend Holter monitoring.");
        let bytes = document(&set).render_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_outputs_paginate_without_error() {
        let body = "Finding and recommendation. ".repeat(400);
        let set = sample_set(&body);
        let bytes = document(&set).render_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opinions.pdf");
        let set = sample_set("stable");
        document(&set).export_pdf_to_file(&path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn wrap_text_respects_max_width() {
        let lines = wrap_text("one two three four five six seven eight nine ten", 15);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 15));
    }

    #[test]
    fn wrap_text_keeps_empty_line() {
        assert_eq!(wrap_text("", 80), vec![String::new()]);
    }

    #[test]
    fn wrap_text_long_word_on_own_line() {
        let lines = wrap_text("short pneumonoultramicroscopicsilicovolcanoconiosis end", 10);
        assert!(lines.contains(&"pneumonoultramicroscopicsilicovolcanoconiosis".to_string()));
    }
}
