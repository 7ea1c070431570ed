// PDF export of an interaction log
//
// Minimal PDF 1.4 writer: US Letter pages, the standard Helvetica font and
// one text line per query and per response. Helvetica only covers Latin-1
// here, so any other character is written as '?'.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::session::InteractionLog;

/// Suggested download name
pub const PDF_FILE_NAME: &str = "Chat_History.pdf";

pub const PDF_TITLE: &str = "Legal Laws Assistant - Chat History";

const PAGE_WIDTH: i32 = 612;
const PAGE_HEIGHT: i32 = 792;
const FONT_SIZE: i32 = 12;

const TITLE_X: i32 = 100;
const TITLE_Y: i32 = 750;
const FIRST_ROW_Y: i32 = 720;
const USER_X: i32 = 80;
const ASSISTANT_X: i32 = 100;
const LINE_GAP: i32 = 20;
const ROW_GAP: i32 = 30;
const BOTTOM_MARGIN: i32 = 50;
const CONTINUED_PAGE_Y: i32 = 750;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

impl TextLine {
    fn new(x: i32, y: i32, text: String) -> Self {
        Self { x, y, text }
    }
}

/// Place every line of the export, grouped by page
pub(crate) fn layout(log: &InteractionLog) -> Vec<Vec<TextLine>> {
    let mut pages = Vec::new();
    let mut page = vec![TextLine::new(TITLE_X, TITLE_Y, PDF_TITLE.to_string())];
    let mut y = FIRST_ROW_Y;

    for turn in log.turns() {
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut page));
            y = CONTINUED_PAGE_Y;
        }

        page.push(TextLine::new(USER_X, y, format!("User: {}", turn.query())));
        y -= LINE_GAP;
        page.push(TextLine::new(
            ASSISTANT_X,
            y,
            format!("Assistant: {}", turn.response()),
        ));
        y -= ROW_GAP;
    }

    pages.push(page);
    pages
}

/// Encode text as the body of a PDF literal string (Latin-1, escaped)
fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push(' '),
            c if c.is_ascii() => out.push(c),
            c if (0xA0..=0xFF).contains(&(c as u32)) => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[TextLine]) -> String {
    let mut stream = String::new();
    for line in lines {
        stream.push_str(&format!(
            "BT\n/F1 {} Tf\n{} {} Td\n({}) Tj\nET\n",
            FONT_SIZE,
            line.x,
            line.y,
            encode_text(&line.text)
        ));
    }
    stream
}

/// Render the whole document
pub fn render_pdf(log: &InteractionLog) -> Vec<u8> {
    let pages = layout(log);

    // 1: catalog, 2: page tree, 3: font, then a (page, contents) pair per page
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (lines, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_id + 1
        ));
        let stream = content_stream(lines);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

/// Write the PDF to `path`, or to a fresh file in the temp directory.
///
/// Returns the path written.
pub fn export_pdf(log: &InteractionLog, path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::temp_dir().join(format!("chat_history_{}.pdf", Uuid::new_v4())),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, render_pdf(log))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), turns = log.len(), "history exported as PDF");
    Ok(path)
}
