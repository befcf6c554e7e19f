//! Document ingestion — raw text out of uploaded PDF and DOCX bytes.
//!
//! DOCX is read straight from `word/document.xml`: paragraphs and table rows
//! become newlines, cells and tabs become tabs, every other tag is dropped.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::text::patterns::exact;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type for '{0}' (expected .pdf or .docx)")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from '{0}'")]
    Empty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// Extracts raw text, dispatching on the file extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let kind = DocumentKind::from_file_name(file_name)
        .ok_or_else(|| IngestError::UnsupportedFormat(file_name.to_string()))?;

    let text = match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))?
        }
        DocumentKind::Docx => docx_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(IngestError::Empty(file_name.to_string()));
    }
    Ok(text)
}

fn docx_text(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| IngestError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| IngestError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Docx(e.to_string()))?;
    Ok(docx_xml_to_text(&xml))
}

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| exact(r"</w:p>|</w:tr>|<w:br\s*/>|<w:cr\s*/>"));
static TABS: LazyLock<Regex> = LazyLock::new(|| exact(r"</w:tc>|<w:tab\s*/>"));
static TAGS: LazyLock<Regex> = LazyLock::new(|| exact(r"<[^>]+>"));

/// Plain text of a WordprocessingML body.
pub fn docx_xml_to_text(xml: &str) -> String {
    let s = LINE_BREAKS.replace_all(xml, "\n");
    let s = TABS.replace_all(&s, "\t");
    let s = TAGS.replace_all(&s, "");
    decode_entities(&s)
}

static NUMERIC_REF: LazyLock<Regex> = LazyLock::new(|| exact(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));"));

/// `&#8226;` / `&#x2022;` to their characters; invalid code points are dropped.
fn decode_numeric_refs(s: &str) -> String {
    NUMERIC_REF
        .replace_all(s, |c: &regex::Captures| {
            let code = match (c.get(1), c.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                (None, None) => None,
            };
            code.and_then(char::from_u32).map(String::from).unwrap_or_default()
        })
        .into_owned()
}

fn decode_entities(s: &str) -> String {
    decode_numeric_refs(s)
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
