//! Clipboard subsystem errors.

use thiserror::Error;

/// Failure reported by a clipboard capability.
///
/// The snapshot service never passes these to its callers; a failed read
/// is treated the same as an absent format.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard backend error: {0}")]
    Platform(String),

    #[error("format {0} is not valid UTF-8 text")]
    InvalidText(String),

    /// The platform clipboard could not be opened, e.g. no display server.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure converting rich text into markup.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input does not start with an RTF header")]
    MissingHeader,

    #[error("unbalanced groups")]
    UnbalancedGroups,

    #[error("group nesting deeper than {0}")]
    NestingTooDeep(usize),

    #[error("malformed control sequence at byte {0}")]
    MalformedControl(usize),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
