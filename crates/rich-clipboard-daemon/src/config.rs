//! Daemon configuration loaded from TOML.

use std::net::{IpAddr, SocketAddr};

use rich_clipboard::{NativeFormats, Platform};
use rich_clipboard_protocol::DispatchOptions;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

impl Config {
    /// Address the daemon listens on and the CLI connects to.
    pub fn socket_addr(&self) -> Result<SocketAddr, DaemonError> {
        let bind = &self.daemon.bind;
        let ip: IpAddr = bind
            .parse()
            .map_err(|e| DaemonError::Config(format!("invalid bind address {bind:?}: {e}")))?;
        Ok(SocketAddr::new(ip, self.daemon.port))
    }

    /// Native format table: the configured preset, or the build target's.
    pub fn native_formats(&self) -> NativeFormats {
        self.clipboard
            .platform
            .map_or_else(NativeFormats::current, NativeFormats::for_platform)
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            explicit_nulls: self.dispatch.explicit_nulls,
        }
    }
}

/// Daemon network and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

/// Method dispatch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Report absent `getData` keys as explicit nulls.
    #[serde(default)]
    pub explicit_nulls: bool,
}

/// Clipboard subsystem settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Native format preset to use instead of the build target's.
    #[serde(default)]
    pub platform: Option<Platform>,
}

fn default_port() -> u16 {
    24850
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
