//! Best-effort Title/Author extraction from the PDF Info dictionary.
//!
//! Metadata only influences naming, so every load or parse failure
//! degrades to empty metadata and the caller falls back to the
//! folder-name rule.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl PdfMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none()
    }
}

pub fn read_pdf_metadata(path: &Path) -> PdfMetadata {
    match try_read(path) {
        Ok(meta) => meta,
        Err(err) => {
            debug!("no usable PDF metadata in {}: {}", path.display(), err);
            PdfMetadata::default()
        }
    }
}

fn try_read(path: &Path) -> Result<PdfMetadata, lopdf::Error> {
    let doc = Document::load(path)?;
    let info = match doc.trailer.get(b"Info") {
        Ok(object) => resolve_dict(&doc, object)?,
        Err(_) => return Ok(PdfMetadata::default()),
    };
    Ok(PdfMetadata {
        title: info_string(&doc, info, b"Title"),
        author: info_string(&doc, info, b"Author"),
    })
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Dictionary, lopdf::Error> {
    match object {
        Object::Reference(id) => doc.get_object(*id)?.as_dict(),
        other => other.as_dict(),
    }
}

fn info_string(doc: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let object = info.get(key).ok()?;
    let object = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let Object::String(bytes, _) = object else {
        return None;
    };
    let text = decode_pdf_text(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// PDF text strings are UTF-16BE when they carry a BOM, otherwise close
/// enough to Latin-1 for Title/Author purposes.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
