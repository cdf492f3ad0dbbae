//! RTF → HTML conversion used to synthesise `text/html` from rich text.
//!
//! Supports the subset clipboard producers actually emit: font and color
//! tables, character formatting, paragraph alignment, code-page and
//! `\uN` text, and `HYPERLINK` fields. Pictures, tables, and other
//! destinations are dropped.

mod charset;
mod html;
mod lexer;
mod reader;

use tracing::trace;

use crate::error::ConvertError;
use crate::negotiator::MarkupConverter;

/// Convert an RTF document to a standalone HTML5 document.
pub fn rtf_to_html(rtf: &[u8]) -> Result<String, ConvertError> {
    let doc = reader::read(rtf)?;
    trace!(
        paragraphs = doc.paragraphs.len(),
        fonts = doc.fonts.len(),
        colors = doc.colors.len(),
        "parsed rich text"
    );
    Ok(html::write(&doc))
}

/// [`MarkupConverter`] wrapper around [`rtf_to_html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RtfToHtml;

impl RtfToHtml {
    pub fn new() -> Self {
        Self
    }

    pub fn convert(&self, rtf: &[u8]) -> Result<String, ConvertError> {
        rtf_to_html(rtf)
    }
}

impl MarkupConverter for RtfToHtml {
    fn to_markup(&self, source: &[u8]) -> Result<String, ConvertError> {
        self.convert(source)
    }
}
