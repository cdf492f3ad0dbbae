//! MIME ↔ native format negotiation.
//!
//! The negotiator maps each recognised MIME key to one native format and
//! holds an ordered fallback chain for keys whose content can be
//! synthesised from another format (rich text → HTML). It keeps no state
//! between calls: every resolution is a function of the key and the
//! clipboard contents at that moment.

use std::sync::Arc;

use rich_clipboard_types::{Mime, NativeFormatId};
use tracing::{debug, trace, warn};

use crate::capability::ClipboardCapability;
use crate::error::ConvertError;
use crate::formats::NativeFormats;
use crate::rtf::RtfToHtml;

/// Converts a native rich-text payload into HTML markup.
pub trait MarkupConverter: Send + Sync {
    fn to_markup(&self, source: &[u8]) -> Result<String, ConvertError>;
}

impl<F> MarkupConverter for F
where
    F: Fn(&[u8]) -> Result<String, ConvertError> + Send + Sync,
{
    fn to_markup(&self, source: &[u8]) -> Result<String, ConvertError> {
        self(source)
    }
}

/// Synthesis rule: `target` may be derived from `source` via `converter`.
#[derive(Clone)]
pub struct Fallback {
    pub target: Mime,
    pub source: NativeFormatId,
    pub converter: Arc<dyn MarkupConverter>,
}

impl std::fmt::Debug for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fallback")
            .field("target", &self.target)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Resolves MIME keys against a clipboard capability.
#[derive(Debug, Clone)]
pub struct FormatNegotiator {
    formats: NativeFormats,
    fallbacks: Vec<Fallback>,
}

impl FormatNegotiator {
    /// Negotiator for the given format table, with the built-in
    /// rich text → HTML fallback.
    #[must_use]
    pub fn new(formats: NativeFormats) -> Self {
        let source = formats.rich_text.clone();
        Self::without_fallbacks(formats).with_fallback(Mime::TextHtml, source, RtfToHtml::new())
    }

    /// Negotiator that only ever reads formats directly.
    #[must_use]
    pub fn without_fallbacks(formats: NativeFormats) -> Self {
        Self {
            formats,
            fallbacks: Vec::new(),
        }
    }

    /// Append a synthesis rule. Rules for the same key are tried in the
    /// order they were added.
    #[must_use]
    pub fn with_fallback(
        mut self,
        target: Mime,
        source: impl Into<NativeFormatId>,
        converter: impl MarkupConverter + 'static,
    ) -> Self {
        self.fallbacks.push(Fallback {
            target,
            source: source.into(),
            converter: Arc::new(converter),
        });
        self
    }

    /// Native format a MIME key is written to. Writes never fall back.
    #[must_use]
    pub fn map_for_write(&self, mime: Mime) -> &NativeFormatId {
        match mime {
            Mime::TextPlain => &self.formats.plain_text,
            Mime::TextHtml => &self.formats.markup,
        }
    }

    /// Content for `mime`, or `None` when it is neither present nor
    /// derivable.
    ///
    /// Capability failures, undecodable text and converter failures all
    /// come back as `None`; the distinction only reaches the logs.
    pub fn resolve_for_read<C>(&self, mime: Mime, capability: &C) -> Option<String>
    where
        C: ClipboardCapability + ?Sized,
    {
        let direct = self.map_for_write(mime);
        if let Some(bytes) = read(capability, direct) {
            match String::from_utf8(bytes) {
                Ok(text) => return Some(text),
                Err(e) => warn!(%mime, format = %direct, error = %e, "native text is not UTF-8"),
            }
        }

        for fallback in self.fallbacks.iter().filter(|f| f.target == mime) {
            let Some(source) = read(capability, &fallback.source) else {
                continue;
            };
            match fallback.converter.to_markup(&source) {
                Ok(markup) => {
                    debug!(%mime, source = %fallback.source, "synthesised from fallback format");
                    return Some(markup);
                }
                Err(e) => {
                    debug!(%mime, source = %fallback.source, error = %e, "fallback conversion failed");
                }
            }
        }

        None
    }
}

fn read<C>(capability: &C, id: &NativeFormatId) -> Option<Vec<u8>>
where
    C: ClipboardCapability + ?Sized,
{
    match capability.read_format(id) {
        Ok(Some(bytes)) => Some(bytes),
        Ok(None) => {
            trace!(format = %id, "format not present");
            None
        }
        Err(e) => {
            warn!(format = %id, error = %e, "clipboard read failed, treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryClipboard;

    const RTF: &[u8] = br"{\rtf1\ansi{\fonttbl\f0\fnil Helvetica;}\f0 hello there}";

    fn formats() -> NativeFormats {
        NativeFormats::new("plain", "html", "rtf")
    }

    #[test]
    fn plain_text_is_read_directly() {
        let clipboard = MemoryClipboard::new();
        clipboard.handle().put("plain", "hello");
        let negotiator = FormatNegotiator::new(formats());
        assert_eq!(
            negotiator.resolve_for_read(Mime::TextPlain, &clipboard).as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn markup_beats_rich_text() {
        let clipboard = MemoryClipboard::new();
        let handle = clipboard.handle();
        handle.put("rtf", RTF);
        handle.put("html", "<h1>direct</h1>");
        let negotiator = FormatNegotiator::new(formats());
        assert_eq!(
            negotiator.resolve_for_read(Mime::TextHtml, &clipboard).as_deref(),
            Some("<h1>direct</h1>")
        );
    }

    #[test]
    fn rich_text_is_converted_when_markup_missing() {
        let clipboard = MemoryClipboard::new();
        clipboard.handle().put("rtf", RTF);
        let negotiator = FormatNegotiator::new(formats());
        let html = negotiator.resolve_for_read(Mime::TextHtml, &clipboard).unwrap();
        assert!(html.contains("hello there"));
    }

    #[test]
    fn failed_conversion_is_absence() {
        let clipboard = MemoryClipboard::new();
        clipboard.handle().put("rtf", "not rich text at all");
        let negotiator = FormatNegotiator::new(formats());
        assert_eq!(negotiator.resolve_for_read(Mime::TextHtml, &clipboard), None);
    }

    #[test]
    fn plain_text_has_no_fallback() {
        let clipboard = MemoryClipboard::new();
        clipboard.handle().put("rtf", RTF);
        let negotiator = FormatNegotiator::new(formats());
        assert_eq!(negotiator.resolve_for_read(Mime::TextPlain, &clipboard), None);
    }

    #[test]
    fn read_errors_are_absence() {
        let clipboard = MemoryClipboard::new();
        let handle = clipboard.handle();
        handle.put("html", "<p>x</p>");
        handle.fail_reads_of("html");
        let negotiator = FormatNegotiator::without_fallbacks(formats());
        assert_eq!(negotiator.resolve_for_read(Mime::TextHtml, &clipboard), None);
    }

    #[test]
    fn invalid_utf8_markup_falls_through_to_rich_text() {
        let clipboard = MemoryClipboard::new();
        let handle = clipboard.handle();
        handle.put("html", vec![0xff, 0xfe, 0x00]);
        handle.put("rtf", RTF);
        let negotiator = FormatNegotiator::new(formats());
        let html = negotiator.resolve_for_read(Mime::TextHtml, &clipboard).unwrap();
        assert!(html.contains("hello there"));
    }

    #[test]
    fn custom_converters_run_in_order() {
        let clipboard = MemoryClipboard::new();
        let handle = clipboard.handle();
        handle.put("a", "first");
        handle.put("b", "second");
        let negotiator = FormatNegotiator::without_fallbacks(formats())
            .with_fallback(
                Mime::TextHtml,
                "a",
                |_: &[u8]| -> Result<String, ConvertError> { Err(ConvertError::UnexpectedEnd) },
            )
            .with_fallback(
                Mime::TextHtml,
                "b",
                |src: &[u8]| -> Result<String, ConvertError> {
                    Ok(format!("<p>{}</p>", String::from_utf8_lossy(src)))
                },
            );
        assert_eq!(
            negotiator.resolve_for_read(Mime::TextHtml, &clipboard).as_deref(),
            Some("<p>second</p>")
        );
    }

    #[test]
    fn write_mapping_is_static() {
        let negotiator = FormatNegotiator::new(formats());
        assert_eq!(negotiator.map_for_write(Mime::TextPlain), "plain");
        assert_eq!(negotiator.map_for_write(Mime::TextHtml), "html");
    }
}
