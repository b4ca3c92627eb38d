//! Report rows and the export formats built from them.

pub mod csv;
pub mod pdf;

use serde::Serialize;
use thiserror::Error;

use crate::scoring::{round_score, MaturityLevel, Scores};

pub use self::csv::render_csv;
pub use self::pdf::render_pdf;

pub const REPORT_TITLE: &str = "AI Readiness Assessment Report";
pub const OVERALL_ROW: &str = "Overall";

pub const CSV_FILE_NAME: &str = "ai_readiness_report.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const PDF_FILE_NAME: &str = "ai_readiness_report.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("character {ch:?} cannot be encoded in the PDF font (in {text:?})")]
    UnsupportedCharacter { ch: char, text: String },

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub pillar: String,
    pub score: f64,
    pub level: MaturityLevel,
}

/// Classified results, one row per pillar in catalog order and a final
/// overall row. Scores are rounded to the precision they are classified at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn from_scores(scores: &Scores) -> Self {
        let mut rows: Vec<ReportRow> = scores
            .pillars
            .iter()
            .map(|p| ReportRow {
                pillar: p.pillar.clone(),
                score: round_score(p.score),
                level: p.level,
            })
            .collect();
        rows.push(ReportRow {
            pillar: OVERALL_ROW.to_string(),
            score: round_score(scores.overall),
            level: scores.overall_level,
        });
        Self { rows }
    }

    pub fn pillar_rows(&self) -> &[ReportRow] {
        self.rows.split_last().map(|(_, rest)| rest).unwrap_or(&[])
    }

    pub fn overall(&self) -> Option<&ReportRow> {
        self.rows.last()
    }
}

/// A rendered export, ready to be written or served.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn csv_artifact(report: &Report) -> Artifact {
    Artifact {
        file_name: CSV_FILE_NAME,
        content_type: CSV_CONTENT_TYPE,
        bytes: render_csv(report).into_bytes(),
    }
}

pub fn pdf_artifact(report: &Report) -> Result<Artifact, ExportError> {
    Ok(Artifact {
        file_name: PDF_FILE_NAME,
        content_type: PDF_CONTENT_TYPE,
        bytes: render_pdf(report)?,
    })
}

/// Terminal rendering of the results.
pub fn render_dashboard(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("Maturity Dashboard\n\n");
    for row in report.pillar_rows() {
        out.push_str(&format!("{}: {:.2} → {}\n", row.pillar, row.score, row.level));
    }
    if let Some(overall) = report.overall() {
        out.push_str("\n---\n");
        out.push_str(&format!("Overall Maturity Score: {:.2}\n", overall.score));
        out.push_str(&format!("Overall Maturity Level: {}\n", overall.level));
    }
    out
}
