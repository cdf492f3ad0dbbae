//! Rich clipboard access keyed by MIME type.
//!
//! [`ClipboardService`] exposes the four channel operations over a
//! [`ClipboardCapability`], the thin per-platform adapter that reads and
//! writes raw bytes under native format identifiers. The
//! [`FormatNegotiator`] in between maps `text/plain` and `text/html` to
//! native formats and synthesises HTML from rich text when no markup is
//! present.

pub mod capability;
pub mod error;
pub mod formats;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod negotiator;
pub mod rtf;
pub mod service;
#[cfg(feature = "system")]
pub mod system;

pub use capability::ClipboardCapability;
pub use error::{ClipboardError, ConvertError};
pub use formats::{NativeFormats, Platform};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MemoryClipboard, MemoryClipboardHandle};
pub use negotiator::{Fallback, FormatNegotiator, MarkupConverter};
pub use rtf::{rtf_to_html, RtfToHtml};
pub use service::{ClipboardService, WriteOutcome};
#[cfg(feature = "system")]
pub use system::SystemClipboard;
