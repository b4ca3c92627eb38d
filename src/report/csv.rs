//! Delimited-text export.

use super::Report;

const HEADER: [&str; 3] = ["Pillar", "Average Score", "Maturity Level"];

/// Render the report as CSV: a header line then one line per row, scores
/// with two decimals.
pub fn render_csv(report: &Report) -> String {
    let mut out = String::new();
    push_record(&mut out, &HEADER);
    for row in &report.rows {
        let score = format!("{:.2}", row.score);
        push_record(&mut out, &[&row.pillar, &score, row.level.as_str()]);
    }
    out
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
