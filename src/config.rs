//! Configuration loader and schema types.
//!
//! Settings pick the bus, the service and interface that identify media
//! players, and the log filter.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
