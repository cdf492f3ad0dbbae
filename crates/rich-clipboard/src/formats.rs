//! Per-platform native format identifiers.

use std::str::FromStr;

use rich_clipboard_types::NativeFormatId;
use serde::{Deserialize, Serialize};

/// Host platforms with a known native format table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Macos,
    Ios,
    Linux,
    Windows,
    Android,
}

impl Platform {
    /// The platform this binary was compiled for. Unknown targets use the
    /// Linux table, whose identifiers are MIME strings.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Linux
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Ios => "ios",
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "macos" => Ok(Self::Macos),
            "ios" => Ok(Self::Ios),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            "android" => Ok(Self::Android),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// The three native formats the negotiator works with on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFormats {
    /// Plain string format.
    pub plain_text: NativeFormatId,
    /// HTML markup fragment format.
    pub markup: NativeFormatId,
    /// Rich-text (RTF) container format.
    pub rich_text: NativeFormatId,
}

impl NativeFormats {
    #[must_use]
    pub fn new(
        plain_text: impl Into<NativeFormatId>,
        markup: impl Into<NativeFormatId>,
        rich_text: impl Into<NativeFormatId>,
    ) -> Self {
        Self {
            plain_text: plain_text.into(),
            markup: markup.into(),
            rich_text: rich_text.into(),
        }
    }

    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Macos => Self::new("public.utf8-plain-text", "public.html", "public.rtf"),
            Platform::Ios => Self::new("public.text", "public.html", "public.rtf"),
            Platform::Linux => Self::new("UTF8_STRING", "text/html", "text/rtf"),
            Platform::Windows => Self::new("CF_UNICODETEXT", "HTML Format", "Rich Text Format"),
            Platform::Android => Self::new("text/plain", "text/html", "text/rtf"),
        }
    }

    #[must_use]
    pub fn current() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl Default for NativeFormats {
    fn default() -> Self {
        Self::current()
    }
}
