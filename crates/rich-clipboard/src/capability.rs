//! The platform clipboard contract.

use std::sync::Arc;

use rich_clipboard_types::NativeFormatId;

use crate::error::ClipboardError;

/// Raw access to one platform clipboard register.
///
/// Implementations adapt a single OS clipboard API and contain no
/// negotiation logic: they read and write bytes under native format
/// identifiers and report what is present. Methods take `&self`; adapters
/// guard non-thread-safe platform handles internally.
pub trait ClipboardCapability: Send + Sync {
    /// Read one native format. `Ok(None)` when the format is not present.
    fn read_format(&self, id: &NativeFormatId) -> Result<Option<Vec<u8>>, ClipboardError>;

    /// Add or replace one native format.
    fn write_format(&self, id: &NativeFormatId, bytes: &[u8]) -> Result<(), ClipboardError>;

    /// Remove every native format from the register.
    fn clear_all(&self) -> Result<(), ClipboardError>;

    /// Native formats currently present, in the order the platform reports them.
    fn list_formats(&self) -> Result<Vec<NativeFormatId>, ClipboardError>;

    /// Number of items on the clipboard; 0 when empty.
    fn item_count(&self) -> Result<usize, ClipboardError>;
}

impl<C: ClipboardCapability + ?Sized> ClipboardCapability for Arc<C> {
    fn read_format(&self, id: &NativeFormatId) -> Result<Option<Vec<u8>>, ClipboardError> {
        (**self).read_format(id)
    }

    fn write_format(&self, id: &NativeFormatId, bytes: &[u8]) -> Result<(), ClipboardError> {
        (**self).write_format(id, bytes)
    }

    fn clear_all(&self) -> Result<(), ClipboardError> {
        (**self).clear_all()
    }

    fn list_formats(&self) -> Result<Vec<NativeFormatId>, ClipboardError> {
        (**self).list_formats()
    }

    fn item_count(&self) -> Result<usize, ClipboardError> {
        (**self).item_count()
    }
}

impl<C: ClipboardCapability + ?Sized> ClipboardCapability for Box<C> {
    fn read_format(&self, id: &NativeFormatId) -> Result<Option<Vec<u8>>, ClipboardError> {
        (**self).read_format(id)
    }

    fn write_format(&self, id: &NativeFormatId, bytes: &[u8]) -> Result<(), ClipboardError> {
        (**self).write_format(id, bytes)
    }

    fn clear_all(&self) -> Result<(), ClipboardError> {
        (**self).clear_all()
    }

    fn list_formats(&self) -> Result<Vec<NativeFormatId>, ClipboardError> {
        (**self).list_formats()
    }

    fn item_count(&self) -> Result<usize, ClipboardError> {
        (**self).item_count()
    }
}
