//! Client-side proxies for media players exposed over a message bus.
//!
//! [`Registry`] discovers every object implementing the player interface
//! (BlueZ `org.bluez.MediaPlayer1` by default) and hands out one
//! [`MediaPlayer`] per match. Each player offers typed property getters,
//! control commands, and a single change subscription.

pub mod bus;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod player;
pub mod registry;
pub mod runtime;

pub use bus::{Bus, ZbusBus};
pub use codec::PropertyValue;
pub use error::{Error, Result};
pub use player::{MediaPlayer, Track};
pub use registry::{Discovery, Registry, Target};
