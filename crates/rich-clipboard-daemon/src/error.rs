//! Daemon errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("protocol error: {0}")]
    Protocol(#[from] rich_clipboard_protocol::ProtocolError),

    #[error("clipboard error: {0}")]
    Clipboard(#[from] rich_clipboard::ClipboardError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rich_clipboard::ClipboardError;

    #[test]
    fn unavailable_clipboard_keeps_its_reason() {
        let err: DaemonError = ClipboardError::Unavailable("no display".into()).into();
        assert!(matches!(
            err,
            DaemonError::Clipboard(ClipboardError::Unavailable(_))
        ));
        assert_eq!(
            err.to_string(),
            "clipboard error: clipboard unavailable: no display"
        );
    }
}
