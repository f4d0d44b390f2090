//! Minimal single-page PDF writer for booking confirmations. Text only, base-14
//! Helvetica, so no font embedding is needed.

use std::fmt::Write as _;

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 72;
const TITLE_SIZE: u32 = 18;
const BODY_SIZE: u32 = 12;
const LINE_HEIGHT: u32 = 18;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationDocument {
    pub title: String,
    pub lines: Vec<String>,
}

/// Escape a string for a PDF literal. Characters outside printable ASCII are
/// replaced since Helvetica's standard encoding can't show them.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(document: &ConfirmationDocument) -> String {
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    let _ = writeln!(
        stream,
        "BT /F1 {} Tf {} {} Td ({}) Tj ET",
        TITLE_SIZE,
        MARGIN,
        y,
        escape_text(&document.title)
    );
    y -= LINE_HEIGHT * 2;

    for line in &document.lines {
        let _ = writeln!(
            stream,
            "BT /F1 {} Tf {} {} Td ({}) Tj ET",
            BODY_SIZE,
            MARGIN,
            y,
            escape_text(line)
        );
        y = y.saturating_sub(LINE_HEIGHT);
    }

    stream
}

pub fn render_confirmation(document: &ConfirmationDocument) -> Vec<u8> {
    let stream = content_stream(document);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{}\nendobj\n", index + 1, body);
    }

    let xref_offset = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );

    pdf.into_bytes()
}
