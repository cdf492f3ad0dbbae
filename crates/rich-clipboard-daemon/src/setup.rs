//! Config loading and service assembly.

use std::path::PathBuf;

#[cfg(feature = "system")]
use rich_clipboard::SystemClipboard;
use rich_clipboard::{ClipboardCapability, ClipboardService};
use rich_clipboard_protocol::Dispatcher;
use tracing::info;

use crate::config::Config;
use crate::error::DaemonError;

/// Load configuration from the given path, or the default location.
pub fn load_config(path: Option<&str>) -> Result<Config, DaemonError> {
    let config_path = match path {
        Some(p) => PathBuf::from(p),
        None => default_config_path(),
    };

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| DaemonError::Config(format!("failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DaemonError::Config(format!("failed to parse config: {e}")))?;
        info!(path = %config_path.display(), "loaded config");
        Ok(config)
    } else {
        info!("no config file found, using defaults");
        Ok(Config::default())
    }
}

/// Wire a capability into a dispatcher according to `config`.
pub fn build_dispatcher<C: ClipboardCapability>(config: &Config, capability: C) -> Dispatcher<C> {
    let formats = config.native_formats();
    info!(
        plain = %formats.plain_text,
        markup = %formats.markup,
        rich = %formats.rich_text,
        "native format table"
    );
    let service = ClipboardService::with_formats(capability, formats);
    Dispatcher::with_options(service, config.dispatch_options())
}

/// Open the OS clipboard with the configured format table.
#[cfg(feature = "system")]
pub fn system_clipboard(config: &Config) -> Result<SystemClipboard, DaemonError> {
    let clipboard = SystemClipboard::new(config.native_formats())?;
    Ok(clipboard)
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("rich-clipboard")
}

/// Get the default config file path.
fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_config_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[daemon]\nport = 31000\n\n[dispatch]\nexplicit_nulls = true").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.daemon.port, 31000);
        assert!(config.dispatch.explicit_nulls);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.daemon.port, 24850);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[daemon\nport = ").unwrap();
        assert!(matches!(
            load_config(file.path().to_str()),
            Err(DaemonError::Config(_))
        ));
    }

    #[test]
    fn config_dir_is_namespaced() {
        assert!(config_dir().ends_with("rich-clipboard"));
    }
}
