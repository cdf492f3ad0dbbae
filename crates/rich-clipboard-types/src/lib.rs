//! Shared types for rich-clipboard.
//!
//! This crate contains the types shared across the rich-clipboard
//! workspace: MIME keys, clipboard snapshots, native format identifiers,
//! and the method-call messages exchanged at the dispatch boundary.

pub mod clipboard;
pub mod format;
pub mod message;
pub mod mime;

pub use clipboard::ClipboardSnapshot;
pub use format::NativeFormatId;
pub use message::{Method, MethodCall, MethodResponse, Value, CHANNEL_NAME, METHOD_PREFIX};
pub use mime::{Mime, TEXT_HTML, TEXT_PLAIN};
