//! In-memory clipboard capability for testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use rich_clipboard_types::NativeFormatId;

use crate::capability::ClipboardCapability;
use crate::error::ClipboardError;

/// Shared state behind `MemoryClipboard` and its handles.
#[derive(Debug, Default)]
struct MemoryState {
    /// Register contents in insertion order.
    entries: Vec<(NativeFormatId, Vec<u8>)>,
    item_count: Option<usize>,
    clears: usize,
    failing_reads: HashSet<NativeFormatId>,
    failing_writes: HashSet<NativeFormatId>,
    failing_listing: bool,
}

/// A clipboard register held in memory.
///
/// Formats are reported in the order they were first written. The item
/// count is 1 whenever any format is present unless overridden through the
/// handle.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clonable handle for seeding and observing the register from
    /// tests.
    pub fn handle(&self) -> MemoryClipboardHandle {
        MemoryClipboardHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    // A panicking test must not wedge the other handles.
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Clonable seeding/observer handle for `MemoryClipboard`.
#[derive(Debug, Clone)]
pub struct MemoryClipboardHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClipboardHandle {
    /// Put a format on the register as another application would.
    pub fn put(&self, id: impl Into<NativeFormatId>, bytes: impl AsRef<[u8]>) {
        upsert(&mut lock(&self.state).entries, id.into(), bytes.as_ref());
    }

    /// Formats currently present, in order.
    pub fn formats(&self) -> Vec<NativeFormatId> {
        lock(&self.state)
            .entries
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Full register contents, in order.
    pub fn contents(&self) -> Vec<(NativeFormatId, Vec<u8>)> {
        lock(&self.state).entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        lock(&self.state)
            .entries
            .iter()
            .find(|(f, _)| f == id)
            .map(|(_, bytes)| bytes.clone())
    }

    /// How many times `clear_all` has been called.
    pub fn clear_count(&self) -> usize {
        lock(&self.state).clears
    }

    /// Override the reported item count; `None` restores the default.
    pub fn set_item_count(&self, count: Option<usize>) {
        lock(&self.state).item_count = count;
    }

    /// Make every read of `id` fail.
    pub fn fail_reads_of(&self, id: impl Into<NativeFormatId>) {
        lock(&self.state).failing_reads.insert(id.into());
    }

    /// Make every write of `id` fail.
    pub fn fail_writes_of(&self, id: impl Into<NativeFormatId>) {
        lock(&self.state).failing_writes.insert(id.into());
    }

    /// Make format listing and item counting fail.
    pub fn fail_listing(&self, fail: bool) {
        lock(&self.state).failing_listing = fail;
    }
}

fn upsert(entries: &mut Vec<(NativeFormatId, Vec<u8>)>, id: NativeFormatId, bytes: &[u8]) {
    if let Some((_, existing)) = entries.iter_mut().find(|(f, _)| *f == id) {
        *existing = bytes.to_vec();
    } else {
        entries.push((id, bytes.to_vec()));
    }
}

impl ClipboardCapability for MemoryClipboard {
    fn read_format(&self, id: &NativeFormatId) -> Result<Option<Vec<u8>>, ClipboardError> {
        let state = self.state();
        if state.failing_reads.contains(id) {
            return Err(ClipboardError::Platform(format!("injected read failure: {id}")));
        }
        Ok(state
            .entries
            .iter()
            .find(|(f, _)| f == id)
            .map(|(_, bytes)| bytes.clone()))
    }

    fn write_format(&self, id: &NativeFormatId, bytes: &[u8]) -> Result<(), ClipboardError> {
        let mut state = self.state();
        if state.failing_writes.contains(id) {
            return Err(ClipboardError::Platform(format!("injected write failure: {id}")));
        }
        upsert(&mut state.entries, id.clone(), bytes);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), ClipboardError> {
        let mut state = self.state();
        state.entries.clear();
        state.clears += 1;
        Ok(())
    }

    fn list_formats(&self) -> Result<Vec<NativeFormatId>, ClipboardError> {
        let state = self.state();
        if state.failing_listing {
            return Err(ClipboardError::Platform("injected listing failure".to_string()));
        }
        Ok(state.entries.iter().map(|(id, _)| id.clone()).collect())
    }

    fn item_count(&self) -> Result<usize, ClipboardError> {
        let state = self.state();
        if state.failing_listing {
            return Err(ClipboardError::Platform("injected listing failure".to_string()));
        }
        Ok(state
            .item_count
            .unwrap_or(usize::from(!state.entries.is_empty())))
    }
}
