//! Paginated document export.
//!
//! Pages are A4 with the standard Courier font. A fixed-width font keeps the
//! centering and wrapping arithmetic exact without font metrics. Text is
//! encoded as WinAnsi; anything outside printable Latin-1 fails the export.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::{ExportError, Report, REPORT_TITLE};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
/// 10 mm, matching the left/right/top page margins.
const MARGIN: f32 = 28.35;
/// Content stops 20 mm above the bottom edge.
const BOTTOM_MARGIN: f32 = 56.7;
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 28.35;
/// Courier advance width is 600/1000 em.
const CHAR_WIDTH: f32 = FONT_SIZE * 0.6;
/// The title cell is 200 mm wide.
const TITLE_CELL_WIDTH: f32 = 566.93;
const FONT_KEY: &str = "F1";

/// Render the report as a PDF document.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, ExportError> {
    let mut body = Vec::with_capacity(report.rows.len());
    for row in report.pillar_rows() {
        body.push(format!(
            "{}: Score = {:.2}, Level = {}",
            row.pillar, row.score, row.level
        ));
    }
    if let Some(overall) = report.overall() {
        body.push(format!(
            "Overall Score: {:.2}, Level: {}",
            overall.score, overall.level
        ));
    }

    // Encode everything up front so a bad character never yields a partial file.
    let title = encode(REPORT_TITLE)?;
    let body = body
        .iter()
        .map(|line| encode(line))
        .collect::<Result<Vec<_>, _>>()?;

    let mut layout = Layout::new();
    let title_width = title.len() as f32 * CHAR_WIDTH;
    layout.line(MARGIN + ((TITLE_CELL_WIDTH - title_width) / 2.0).max(0.0), title);
    layout.skip(LINE_HEIGHT);
    for text in body {
        for line in wrap(&text, max_chars_per_line()) {
            layout.line(MARGIN, line);
        }
    }

    write_document(layout.finish())
}

fn max_chars_per_line() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / CHAR_WIDTH).floor() as usize
}

fn encode(text: &str) -> Result<Vec<u8>, ExportError> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            c @ (0x20..=0x7E | 0xA0..=0xFF) => Ok(c as u8),
            _ => Err(ExportError::UnsupportedCharacter {
                ch,
                text: text.to_string(),
            }),
        })
        .collect()
}

/// Greedy word wrap over encoded bytes; words longer than a line are split.
fn wrap(text: &[u8], width: usize) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in text.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
        let mut word = word;
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        while word.len() > width {
            let (head, tail) = word.split_at(width);
            lines.push(head.to_vec());
            word = tail;
        }
        if !current.is_empty() {
            current.push(b' ');
        }
        current.extend_from_slice(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Layout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Top of the next line, in PDF user space (origin bottom-left).
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn skip(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn line(&mut self, x: f32, text: Vec<u8>) {
        if self.cursor - LINE_HEIGHT < BOTTOM_MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor = PAGE_HEIGHT - MARGIN;
        }
        let baseline = self.cursor - LINE_HEIGHT / 2.0 - 0.3 * FONT_SIZE;
        self.current.push(Operation::new("BT", vec![]));
        self.current
            .push(Operation::new("Tf", vec![FONT_KEY.into(), FONT_SIZE.into()]));
        self.current
            .push(Operation::new("Td", vec![x.into(), baseline.into()]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::String(text, StringFormat::Literal)],
        ));
        self.current.push(Operation::new("ET", vec![]));
        self.cursor -= LINE_HEIGHT;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.current);
        self.pages
    }
}

fn write_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_KEY => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0.0f32.into(),
        0.0f32.into(),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_scores;
    use crate::report::ReportRow;
    use crate::scoring::MaturityLevel;

    fn text_operands(pdf: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let raw = doc.get_page_content(*page_id).unwrap();
                Content::decode(&raw)
                    .unwrap()
                    .operations
                    .into_iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => {
                            Some(bytes.iter().map(|b| *b as char).collect())
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn renders_title_rows_and_overall_line() {
        let report = Report::from_scores(&sample_scores());
        let pdf = render_pdf(&report).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let pages = text_operands(&pdf);
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0],
            vec![
                "AI Readiness Assessment Report".to_string(),
                "Infrastructure: Score = 0.80, Level = Pilot".to_string(),
                "Orchestration: Score = 4.00, Level = Optimized".to_string(),
                "Overall Score: 2.40, Level: Operational".to_string(),
            ]
        );
    }

    #[test]
    fn many_rows_break_onto_new_pages() {
        let mut rows: Vec<ReportRow> = (0..40)
            .map(|i| ReportRow {
                pillar: format!("Pillar {i}"),
                score: 1.0,
                level: MaturityLevel::Pilot,
            })
            .collect();
        rows.push(ReportRow {
            pillar: "Overall".into(),
            score: 1.0,
            level: MaturityLevel::Pilot,
        });
        let pdf = render_pdf(&Report { rows }).unwrap();
        let pages = text_operands(&pdf);
        assert!(pages.len() > 1);
        let total: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(total, 42);
        assert_eq!(
            pages.last().unwrap().last().unwrap(),
            "Overall Score: 1.00, Level: Pilot"
        );
    }

    #[test]
    fn unsupported_character_fails_whole_export() {
        let mut report = Report::from_scores(&sample_scores());
        report.rows[0].pillar = "Infrastructure 🚀".into();
        let err = render_pdf(&report).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedCharacter { ch: '🚀', .. }));
    }

    #[test]
    fn latin1_text_is_accepted() {
        assert_eq!(encode("Données").unwrap(), b"Donn\xe9es".to_vec());
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap(b"aaa bbb ccc", 7);
        assert_eq!(lines, vec![b"aaa bbb".to_vec(), b"ccc".to_vec()]);
        let long = wrap(b"abcdefghij", 4);
        assert_eq!(long, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]);
    }
}
