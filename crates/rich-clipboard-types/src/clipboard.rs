//! Clipboard snapshot types.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::mime::Mime;

/// A MIME-keyed view of clipboard content.
///
/// A key is either present with a value or absent; there is no "present
/// but null" state. Built per call and never persisted. Iteration is in
/// key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(transparent)]
pub struct ClipboardSnapshot {
    entries: BTreeMap<String, String>,
}

impl ClipboardSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot holding only plain text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with(Mime::TextPlain, text)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, mime: Mime, content: impl Into<String>) -> Self {
        self.insert(mime, content);
        self
    }

    /// Insert content for a recognised MIME key, replacing any previous value.
    pub fn insert(&mut self, mime: Mime, content: impl Into<String>) {
        self.entries.insert(mime.as_str().to_string(), content.into());
    }

    /// Insert content under an arbitrary key.
    ///
    /// Unrecognised keys are carried but ignored when the snapshot is
    /// written to a clipboard.
    pub fn insert_raw(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(key.into(), content.into());
    }

    #[must_use]
    pub fn get(&self, mime: Mime) -> Option<&str> {
        self.entries.get(mime.as_str()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, mime: Mime) -> bool {
        self.entries.contains_key(mime.as_str())
    }

    #[must_use]
    pub fn plain_text(&self) -> Option<&str> {
        self.get(Mime::TextPlain)
    }

    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.get(Mime::TextHtml)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a snapshot from a map whose values may be null, dropping the
    /// null entries.
    #[must_use]
    pub fn from_nullable(map: BTreeMap<String, Option<String>>) -> Self {
        Self {
            entries: map
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
        }
    }

    /// Render with an explicit null marker for every recognised key that is
    /// absent.
    #[must_use]
    pub fn to_nullable(&self) -> BTreeMap<String, Option<String>> {
        let mut map: BTreeMap<String, Option<String>> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();
        for mime in Mime::ALL {
            map.entry(mime.as_str().to_string()).or_insert(None);
        }
        map
    }
}

impl From<BTreeMap<String, String>> for ClipboardSnapshot {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl From<ClipboardSnapshot> for BTreeMap<String, String> {
    fn from(snapshot: ClipboardSnapshot) -> Self {
        snapshot.entries
    }
}

impl FromIterator<(Mime, String)> for ClipboardSnapshot {
    fn from_iter<T: IntoIterator<Item = (Mime, String)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (mime, content) in iter {
            snapshot.insert(mime, content);
        }
        snapshot
    }
}

impl IntoIterator for ClipboardSnapshot {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_are_not_stored() {
        let snapshot = ClipboardSnapshot::text("hello");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.plain_text(), Some("hello"));
        assert_eq!(snapshot.html(), None);
        assert!(!snapshot.contains(Mime::TextHtml));
    }

    #[test]
    fn nullable_map_drops_nulls() {
        let mut map = BTreeMap::new();
        map.insert("text/plain".to_string(), Some("a".to_string()));
        map.insert("text/html".to_string(), None);
        let snapshot = ClipboardSnapshot::from_nullable(map);
        assert_eq!(snapshot, ClipboardSnapshot::text("a"));
    }

    #[test]
    fn to_nullable_marks_missing_recognised_keys() {
        let mut snapshot = ClipboardSnapshot::text("a");
        snapshot.insert_raw("application/x-custom", "z");
        let map = snapshot.to_nullable();
        assert_eq!(map.len(), 3);
        assert_eq!(map["text/plain"].as_deref(), Some("a"));
        assert_eq!(map["text/html"], None);
        assert_eq!(map["application/x-custom"].as_deref(), Some("z"));
    }

    #[test]
    fn iteration_is_key_ordered() {
        let snapshot: ClipboardSnapshot = [
            (Mime::TextPlain, "p".to_string()),
            (Mime::TextHtml, "<p>p</p>".to_string()),
        ]
        .into_iter()
        .collect();
        let keys: Vec<&str> = snapshot.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["text/html", "text/plain"]);
    }

    #[test]
    fn serializes_as_plain_json_object() {
        let snapshot = ClipboardSnapshot::text("hi").with(Mime::TextHtml, "<b>hi</b>");
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"text/html":"<b>hi</b>","text/plain":"hi"}"#);
    }

    #[test]
    fn snapshot_bincode_roundtrip() {
        let snapshot = ClipboardSnapshot::text("hello clipboard");
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&snapshot, config).unwrap();
        let (decoded, _): (ClipboardSnapshot, _) =
            bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(snapshot, decoded);
    }
}
