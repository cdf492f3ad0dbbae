//! Native clipboard format identifiers.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An opaque, platform-specific name for a clipboard representation
/// (`public.html`, `UTF8_STRING`, `CF_UNICODETEXT`, ...).
///
/// Only the platform adapter knows what an identifier means; everything
/// above it compares them for equality and passes them through.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
#[serde(transparent)]
pub struct NativeFormatId(String);

impl NativeFormatId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for NativeFormatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NativeFormatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for NativeFormatId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NativeFormatId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for NativeFormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
