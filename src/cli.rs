//! Command-line surface of the `avrctl` binary.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "avrctl", version, about = "Control Bluetooth media players over D-Bus")]
pub struct Cli {
    /// Log at debug level regardless of the configured filter.
    #[arg(short, long)]
    pub verbose: bool,

    /// Player to act on: a substring of its object path or display name.
    /// Defaults to the first player found.
    #[arg(short, long, global = true)]
    pub player: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List discovered players.
    List,
    /// Print every property of a player.
    Status,
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    FastForward,
    Rewind,
    /// Release a key previously held with `hold`.
    Release,
    /// Press and release an AVRCP key code (decimal or 0x-prefixed hex).
    Press {
        #[arg(value_parser = parse_key_code)]
        code: u8,
    },
    /// Press and hold an AVRCP key code (decimal or 0x-prefixed hex).
    Hold {
        #[arg(value_parser = parse_key_code)]
        code: u8,
    },
    /// Switch the player's equalizer.
    Equalizer { value: Switch },
    /// Print property changes until Enter is pressed.
    Monitor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn as_str(self) -> &'static str {
        match self {
            Switch::On => "on",
            Switch::Off => "off",
        }
    }
}

pub fn parse_key_code(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid key code {s:?}: {e}"))
}
