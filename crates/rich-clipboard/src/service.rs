//! The MIME-keyed clipboard operations.

use rich_clipboard_types::{ClipboardSnapshot, Mime};
use tracing::{debug, info, warn};

use crate::capability::ClipboardCapability;
use crate::formats::NativeFormats;
use crate::negotiator::FormatNegotiator;

/// What a [`ClipboardService::set_data`] call did to the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No `text/plain` in the snapshot; the register was left untouched.
    Skipped,
    /// The register was replaced with the plain text, plus markup when
    /// `html` is true.
    Written { html: bool },
    /// The plain-text write failed; the register may have been cleared.
    Failed,
}

/// `getData` / `setData` / `getAvailableTypes` / `getItemCount` over one
/// injected clipboard capability.
///
/// None of the operations fail: absent content is a missing key, and
/// platform errors are logged and treated as absence.
pub struct ClipboardService<C> {
    capability: C,
    negotiator: FormatNegotiator,
}

impl<C: ClipboardCapability> ClipboardService<C> {
    pub fn new(capability: C, negotiator: FormatNegotiator) -> Self {
        Self {
            capability,
            negotiator,
        }
    }

    /// Service using the default negotiator for `formats`.
    pub fn with_formats(capability: C, formats: NativeFormats) -> Self {
        Self::new(capability, FormatNegotiator::new(formats))
    }

    /// Snapshot of every recognised MIME key whose content is present or
    /// can be synthesised. Never mutates the register.
    pub fn get_data(&self) -> ClipboardSnapshot {
        let mut snapshot = ClipboardSnapshot::new();
        for mime in Mime::ALL {
            if let Some(content) = self.negotiator.resolve_for_read(mime, &self.capability) {
                snapshot.insert(mime, content);
            }
        }
        debug!(keys = snapshot.len(), "read clipboard snapshot");
        snapshot
    }

    /// Replace the clipboard with `snapshot`.
    ///
    /// Requires `text/plain`; without it the call does nothing. Otherwise
    /// the register is cleared, the plain text written, then `text/html`
    /// if present. A failed markup write is logged and absorbed.
    pub fn set_data(&self, snapshot: &ClipboardSnapshot) -> WriteOutcome {
        let Some(text) = snapshot.plain_text() else {
            debug!("setData without text/plain, leaving clipboard untouched");
            return WriteOutcome::Skipped;
        };

        if let Err(e) = self.capability.clear_all() {
            warn!(error = %e, "failed to clear clipboard before write");
        }

        let plain = self.negotiator.map_for_write(Mime::TextPlain);
        if let Err(e) = self.capability.write_format(plain, text.as_bytes()) {
            warn!(format = %plain, error = %e, "failed to write plain text");
            return WriteOutcome::Failed;
        }

        let html = match snapshot.html() {
            Some(markup) => {
                let id = self.negotiator.map_for_write(Mime::TextHtml);
                match self.capability.write_format(id, markup.as_bytes()) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(format = %id, error = %e, "failed to write markup");
                        false
                    }
                }
            }
            None => false,
        };

        info!(bytes = text.len(), html, "clipboard replaced");
        WriteOutcome::Written { html }
    }

    /// Native format identifiers on the clipboard, untranslated and in
    /// platform order.
    pub fn get_available_types(&self) -> Vec<String> {
        match self.capability.list_formats() {
            Ok(formats) => formats
                .into_iter()
                .map(rich_clipboard_types::NativeFormatId::into_string)
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to list clipboard formats");
                Vec::new()
            }
        }
    }

    pub fn get_item_count(&self) -> usize {
        self.capability.item_count().unwrap_or_else(|e| {
            warn!(error = %e, "failed to count clipboard items");
            0
        })
    }
}
