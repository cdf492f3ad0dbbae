//! Clipboard channel daemon for rich-clipboard.
//!
//! Loads TOML configuration, assembles the clipboard service and
//! dispatcher, and serves framed method calls on a loopback TCP socket.

pub mod config;
pub mod daemon;
pub mod error;
mod session;
pub mod setup;

pub use config::Config;
pub use daemon::{Daemon, DaemonEvent, DaemonStatus};
pub use error::DaemonError;
