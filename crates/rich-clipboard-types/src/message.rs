//! Method-call messages for the named-operation boundary.
//!
//! A caller sends a [`MethodCall`] naming one operation; the dispatcher
//! answers with a [`MethodResponse`]. Payloads are a small dynamic
//! [`Value`] tree so the same shapes travel over bincode frames and render
//! naturally as JSON.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardSnapshot;

/// Channel the operations are published under.
pub const CHANNEL_NAME: &str = "com.bringingfire.rich_clipboard";

/// Prefix some callers put in front of method names
/// (`RichClipboard.getData`).
pub const METHOD_PREFIX: &str = "RichClipboard.";

/// The operations the clipboard channel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum Method {
    GetData,
    SetData,
    GetAvailableTypes,
    GetItemCount,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::GetData,
        Method::SetData,
        Method::GetAvailableTypes,
        Method::GetItemCount,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetData => "getData",
            Self::SetData => "setData",
            Self::GetAvailableTypes => "getAvailableTypes",
            Self::GetItemCount => "getItemCount",
        }
    }

    /// Resolve a method name, with or without [`METHOD_PREFIX`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let bare = name.strip_prefix(METHOD_PREFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|m| m.name() == bare)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Dynamic argument/result value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interpret a map of nullable strings as a snapshot.
    ///
    /// Null entries are dropped. Returns `None` when the value is not a map
    /// or any entry is neither a string nor null.
    #[must_use]
    pub fn to_snapshot(&self) -> Option<ClipboardSnapshot> {
        let map = self.as_map()?;
        let mut nullable = BTreeMap::new();
        for (key, value) in map {
            let entry = match value {
                Self::Null => None,
                Self::String(s) => Some(s.clone()),
                _ => return None,
            };
            nullable.insert(key.clone(), entry);
        }
        Some(ClipboardSnapshot::from_nullable(nullable))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Self::String).collect())
    }
}

impl From<ClipboardSnapshot> for Value {
    fn from(snapshot: ClipboardSnapshot) -> Self {
        Self::Map(
            snapshot
                .into_iter()
                .map(|(k, v)| (k, Self::String(v)))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Option<String>>> for Value {
    fn from(map: BTreeMap<String, Option<String>>) -> Self {
        Self::Map(
            map.into_iter()
                .map(|(k, v)| (k, v.map_or(Self::Null, Self::String)))
                .collect(),
        )
    }
}

/// A request to run one named operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: impl Into<Value>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// `setData` call carrying the given snapshot.
    #[must_use]
    pub fn set_data(snapshot: ClipboardSnapshot) -> Self {
        Self::new(Method::SetData.name()).with_arguments(snapshot)
    }
}

impl From<Method> for MethodCall {
    fn from(method: Method) -> Self {
        Self::new(method.name())
    }
}

/// The answer to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum MethodResponse {
    /// The operation ran; `Null` when it has nothing to return.
    Success(Value),
    /// The operation failed outside the clipboard core.
    Error { code: String, message: String },
    /// No operation by that name.
    NotImplemented,
}

impl MethodResponse {
    #[must_use]
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}
