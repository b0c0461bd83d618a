use std::{env, path::PathBuf};

use super::schema::{BusSettings, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then layers environment
/// variables (prefix `AVRCTL__`) on top, falling back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("AVRCTL")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        self.bus.validate()
    }
}

impl BusSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !is_dotted_name(&self.service) {
            return Err(format!("bus.service {:?} is not a dotted bus name", self.service));
        }
        if !is_dotted_name(&self.interface) {
            return Err(format!(
                "bus.interface {:?} is not a dotted interface name",
                self.interface
            ));
        }
        if !self.root_path.starts_with('/') {
            return Err(format!("bus.root_path {:?} must start with '/'", self.root_path));
        }
        Ok(())
    }
}

fn is_dotted_name(name: &str) -> bool {
    let mut parts = name.split('.');
    let first_ok = parts.next().is_some_and(|p| !p.is_empty());
    let mut rest = parts.peekable();
    first_ok && rest.peek().is_some() && rest.all(|p| !p.is_empty())
}

/// Resolve the config path from `AVRCTL_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("AVRCTL_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/avrctl/config.toml`
/// or `~/.config/avrctl/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("avrctl").join("config.toml"))
}
