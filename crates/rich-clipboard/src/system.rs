//! OS clipboard capability backed by `clipboard-rs`.

use std::sync::{Arc, Mutex, MutexGuard};

use clipboard_rs::{Clipboard, ClipboardContent, ClipboardContext, ContentFormat};
use rich_clipboard_types::NativeFormatId;
use tracing::{debug, trace};

use crate::capability::ClipboardCapability;
use crate::error::ClipboardError;
use crate::formats::NativeFormats;

type BackendResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn map_backend_err<T>(result: BackendResult<T>) -> Result<T, ClipboardError> {
    result.map_err(|e| ClipboardError::Platform(e.to_string()))
}

/// Formats with typed accessors in the backend.
#[derive(Debug, Clone, Copy)]
enum Typed {
    Text,
    Html,
    Rtf,
}

impl Typed {
    fn content_format(self) -> ContentFormat {
        match self {
            Self::Text => ContentFormat::Text,
            Self::Html => ContentFormat::Html,
            Self::Rtf => ContentFormat::Rtf,
        }
    }
}

struct Inner {
    ctx: ClipboardContext,
    /// Formats written since the last clear. `clipboard-rs` replaces the
    /// whole register on every set, so each write commits all of them.
    staged: Vec<(NativeFormatId, Vec<u8>)>,
}

/// The real system clipboard.
///
/// The three formats in `formats` go through the backend's typed text,
/// HTML, and RTF accessors; every other identifier is read and written as
/// a raw buffer.
#[derive(Clone)]
pub struct SystemClipboard {
    inner: Arc<Mutex<Inner>>,
    formats: NativeFormats,
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

impl SystemClipboard {
    pub fn new(formats: NativeFormats) -> Result<Self, ClipboardError> {
        let ctx =
            ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        debug!(plain = %formats.plain_text, "opened system clipboard");
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                ctx,
                staged: Vec::new(),
            })),
            formats,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn typed(&self, id: &NativeFormatId) -> Option<Typed> {
        if *id == self.formats.plain_text {
            Some(Typed::Text)
        } else if *id == self.formats.markup {
            Some(Typed::Html)
        } else if *id == self.formats.rich_text {
            Some(Typed::Rtf)
        } else {
            None
        }
    }

    fn to_content(
        &self,
        id: &NativeFormatId,
        bytes: &[u8],
    ) -> Result<ClipboardContent, ClipboardError> {
        let Some(typed) = self.typed(id) else {
            return Ok(ClipboardContent::Other(id.to_string(), bytes.to_vec()));
        };
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| ClipboardError::InvalidText(id.to_string()))?;
        Ok(match typed {
            Typed::Text => ClipboardContent::Text(text),
            Typed::Html => ClipboardContent::Html(text),
            Typed::Rtf => ClipboardContent::Rtf(text),
        })
    }
}

impl ClipboardCapability for SystemClipboard {
    fn read_format(&self, id: &NativeFormatId) -> Result<Option<Vec<u8>>, ClipboardError> {
        let inner = self.lock();
        let ctx = &inner.ctx;
        let Some(typed) = self.typed(id) else {
            let present = map_backend_err(ctx.available_formats())?;
            if !present.iter().any(|f| f == id.as_str()) {
                return Ok(None);
            }
            return map_backend_err(ctx.get_buffer(id.as_str())).map(Some);
        };
        if !ctx.has(typed.content_format()) {
            return Ok(None);
        }
        let text = match typed {
            Typed::Text => ctx.get_text(),
            Typed::Html => ctx.get_html(),
            Typed::Rtf => ctx.get_rich_text(),
        };
        map_backend_err(text).map(|t| Some(t.into_bytes()))
    }

    fn write_format(&self, id: &NativeFormatId, bytes: &[u8]) -> Result<(), ClipboardError> {
        // Reject undecodable text before it reaches the staged set.
        self.to_content(id, bytes)?;
        let mut inner = self.lock();
        if let Some((_, existing)) = inner.staged.iter_mut().find(|(f, _)| f == id) {
            *existing = bytes.to_vec();
        } else {
            inner.staged.push((id.clone(), bytes.to_vec()));
        }
        let contents = inner
            .staged
            .iter()
            .map(|(f, b)| self.to_content(f, b))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(formats = contents.len(), "committing clipboard contents");
        map_backend_err(inner.ctx.set(contents))
    }

    fn clear_all(&self) -> Result<(), ClipboardError> {
        let mut inner = self.lock();
        inner.staged.clear();
        map_backend_err(inner.ctx.clear())
    }

    fn list_formats(&self) -> Result<Vec<NativeFormatId>, ClipboardError> {
        let inner = self.lock();
        let formats = map_backend_err(inner.ctx.available_formats())?;
        Ok(formats.into_iter().map(NativeFormatId::from).collect())
    }

    fn item_count(&self) -> Result<usize, ClipboardError> {
        // The backend exposes a single item; report 1 when anything is present.
        Ok(usize::from(!self.list_formats()?.is_empty()))
    }
}
