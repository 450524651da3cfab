//! Minimal PDF emitter for the report card: A4 pages, Helvetica text placed
//! at millimetre offsets, no compression. Kept deliberately small; this is
//! not a general PDF library.

use anyhow::Context;
use std::path::Path;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MM_TO_PT: f64 = 72.0 / 25.4;

// Rough Helvetica advance per glyph as a fraction of the font size. Only
// used to centre the title line, so the approximation is acceptable.
const AVG_GLYPH_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone)]
pub struct TextSpan {
    pub x_mm: f64,
    pub y_mm: f64,
    pub size: f64,
    pub bold: bool,
    pub align: Align,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    spans: Vec<TextSpan>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, x_mm: f64, y_mm: f64, size: f64, bold: bool, text: impl Into<String>) {
        self.spans.push(TextSpan {
            x_mm,
            y_mm,
            size,
            bold,
            align: Align::Left,
            text: text.into(),
        });
    }

    pub fn text_centered(&mut self, y_mm: f64, size: f64, bold: bool, text: impl Into<String>) {
        self.spans.push(TextSpan {
            x_mm: PAGE_WIDTH_MM / 2.0,
            y_mm,
            size,
            bold,
            align: Align::Center,
            text: text.into(),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Page>,
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_ascii() && !c.is_control() => out.push(c),
            // Non-WinAnsi text would need a proper encoder; substitute.
            _ => out.push('?'),
        }
    }
    out
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_content(page: &Page) -> String {
        let mut content = String::new();
        for span in &page.spans {
            let font = if span.bold { "F2" } else { "F1" };
            let mut x_pt = span.x_mm * MM_TO_PT;
            if span.align == Align::Center {
                let width_pt = span.text.chars().count() as f64 * span.size * AVG_GLYPH_WIDTH;
                x_pt -= width_pt / 2.0;
            }
            // PDF user space has its origin at the bottom-left corner.
            let y_pt = (PAGE_HEIGHT_MM - span.y_mm) * MM_TO_PT;
            content.push_str(&format!(
                "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET\n",
                font,
                span.size,
                x_pt,
                y_pt,
                escape_text(&span.text)
            ));
        }
        content
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let start_obj = |out: &mut Vec<u8>, offsets: &mut Vec<usize>| {
            offsets.push(out.len());
            format!("{} 0 obj\n", offsets.len())
        };

        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 5 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");

        let header = start_obj(&mut out, &mut offsets);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(b"<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        let header = start_obj(&mut out, &mut offsets);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
                kids,
                self.pages.len()
            )
            .as_bytes(),
        );

        let header = start_obj(&mut out, &mut offsets);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n",
        );

        let header = start_obj(&mut out, &mut offsets);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>\nendobj\n",
        );

        for page in &self.pages {
            let content_id = offsets.len() + 2;
            let header = start_obj(&mut out, &mut offsets);
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>\nendobj\n",
                    PAGE_WIDTH_MM * MM_TO_PT,
                    PAGE_HEIGHT_MM * MM_TO_PT,
                    content_id
                )
                .as_bytes(),
            );

            let content = Self::page_content(page);
            let header = start_obj(&mut out, &mut offsets);
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(
                format!("<< /Length {} >>\nstream\n{}endstream\nendobj\n", content.len(), content)
                    .as_bytes(),
            );
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        out
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
        std::fs::write(path, self.to_bytes())
            .with_context(|| format!("failed to write document {}", path.to_string_lossy()))
    }
}
