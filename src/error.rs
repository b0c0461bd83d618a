//! Error taxonomy for the player proxy layer.
//!
//! Property reads never produce these; they collapse failures to `None`.
//! Control and write operations surface [`Error::Dispatch`], discovery surfaces
//! [`Error::Discovery`], and per-player binding failures are handled by the
//! registry itself.

use thiserror::Error;

use crate::bus::TransportError;
use crate::config::BusKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to the {bus} bus: {source}")]
    Connect {
        bus: BusKind,
        #[source]
        source: TransportError,
    },

    #[error("failed to enumerate managed objects: {0}")]
    Discovery(#[source] TransportError),

    #[error("failed to bind {interface} at {path}: {source}")]
    Binding {
        path: String,
        interface: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to dispatch {member} to {path}: {source}")]
    Dispatch {
        member: &'static str,
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("no media player matches {0:?}")]
    NoPlayer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
