//! Wiring for the `avrctl` binary: settings, logging, connection and the
//! selected command.

use std::fmt::Display;

use crate::cli::Cli;
use crate::config::Settings;
use crate::registry::Registry;

mod commands;
mod logging;

pub use commands::{execute, render_status, select};

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = usable_settings(Settings::load());
    logging::init_logging(&settings.logging, cli.verbose);

    let registry = Registry::connect(&settings.bus)?;
    let result = execute(&registry, &cli.command, cli.player.as_deref());
    registry.close();

    result
}

/// The loaded settings if they load and validate, otherwise the defaults.
/// Logging is not up yet, so the reason goes to stderr.
fn usable_settings<E: Display>(loaded: Result<Settings, E>) -> Settings {
    let checked = loaded
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    checked.unwrap_or_else(|reason| {
        eprintln!("avrctl: {reason}; using defaults");
        Settings::default()
    })
}
