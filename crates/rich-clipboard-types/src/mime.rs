//! MIME keys recognised by the snapshot model.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// A content kind in the snapshot model, independent of any platform's
/// native format identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum Mime {
    /// `text/plain`
    TextPlain,
    /// `text/html`
    TextHtml,
}

impl Mime {
    /// Every recognised MIME key, in the order reads resolve them.
    pub const ALL: [Mime; 2] = [Mime::TextPlain, Mime::TextHtml];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextPlain => TEXT_PLAIN,
            Self::TextHtml => TEXT_HTML,
        }
    }

    /// Look up a MIME key. Unrecognised keys yield `None`.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            TEXT_PLAIN => Some(Self::TextPlain),
            TEXT_HTML => Some(Self::TextHtml),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
