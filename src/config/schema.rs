use std::fmt;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/avrctl/config.toml` or `~/.config/avrctl/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `AVRCTL__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bus: BusSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Which message bus to connect to.
    pub kind: BusKind,
    /// Well-known name of the service owning the players.
    pub service: String,
    /// Interface a managed object must implement to be treated as a player.
    pub interface: String,
    /// Object path the `GetManagedObjects` call is issued against.
    pub root_path: String,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            kind: BusKind::System,
            service: "org.bluez".to_string(),
            interface: "org.bluez.MediaPlayer1".to_string(),
            root_path: "/".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::System => f.write_str("system"),
            BusKind::Session => f.write_str("session"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `avrctl=debug,zbus=warn`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "avrctl=info,zbus=warn".to_string(),
        }
    }
}
