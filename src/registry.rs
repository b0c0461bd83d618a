//! Discovery of media players on the bus.
//!
//! The registry owns the bus connection. Each call to [`Registry::discover`]
//! enumerates the managed-object graph once and yields a [`Discovery`] that
//! binds a [`MediaPlayer`] for every object implementing the target interface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::bus::{Bus, ZbusBus};
use crate::config::BusSettings;
use crate::error::{Error, Result};
use crate::player::MediaPlayer;

/// Where players live: the interface they implement and the object path the
/// enumeration starts from.
#[derive(Debug, Clone)]
pub struct Target {
    pub interface: String,
    pub root_path: String,
}

impl From<&BusSettings> for Target {
    fn from(settings: &BusSettings) -> Self {
        Self {
            interface: settings.interface.clone(),
            root_path: settings.root_path.clone(),
        }
    }
}

pub struct Registry<B: Bus> {
    bus: Arc<B>,
    target: Target,
    closed: AtomicBool,
}

impl Registry<ZbusBus> {
    /// Connect to the configured bus.
    pub fn connect(settings: &BusSettings) -> Result<Self> {
        let bus = ZbusBus::connect(settings.kind, &settings.service).map_err(|source| {
            Error::Connect {
                bus: settings.kind,
                source,
            }
        })?;
        Ok(Self::new(bus, Target::from(settings)))
    }
}

impl<B: Bus> Registry<B> {
    pub fn new(bus: B, target: Target) -> Self {
        Self {
            bus: Arc::new(bus),
            target,
            closed: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Enumerate the bus once and keep the objects implementing the target
    /// interface. Players are bound lazily while the result is iterated.
    pub fn discover(&self) -> Result<Discovery<B>> {
        let objects = self
            .bus
            .managed_objects(&self.target.root_path)
            .map_err(Error::Discovery)?;
        let total = objects.len();

        let paths: Vec<String> = objects
            .into_iter()
            .filter(|o| o.implements(&self.target.interface))
            .map(|o| o.path)
            .collect();
        info!(
            interface = %self.target.interface,
            total,
            matched = paths.len(),
            "discovered media players"
        );

        Ok(Discovery {
            bus: self.bus.clone(),
            interface: self.target.interface.clone(),
            paths,
        })
    }

    /// Close the underlying connection. Later calls do nothing.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("closing registry");
        self.bus.close();
    }
}

impl<B: Bus> Drop for Registry<B> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Result of one enumeration.
///
/// Iterating binds a fresh player per matching path; paths that fail to bind
/// are logged and skipped. [`Discovery::iter`] may be called any number of
/// times.
pub struct Discovery<B: Bus> {
    bus: Arc<B>,
    interface: String,
    paths: Vec<String>,
}

impl<B: Bus> Discovery<B> {
    /// Paths of matching objects, in enumeration order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = MediaPlayer<B>> + '_ {
        self.paths
            .iter()
            .filter_map(|path| bind_or_skip(&self.bus, path, &self.interface))
    }
}

impl<B: Bus> IntoIterator for Discovery<B> {
    type Item = MediaPlayer<B>;
    type IntoIter = Box<dyn Iterator<Item = MediaPlayer<B>>>;

    fn into_iter(self) -> Self::IntoIter {
        let Discovery {
            bus,
            interface,
            paths,
        } = self;
        Box::new(
            paths
                .into_iter()
                .filter_map(move |path| bind_or_skip(&bus, &path, &interface)),
        )
    }
}

fn bind_or_skip<B: Bus>(bus: &Arc<B>, path: &str, interface: &str) -> Option<MediaPlayer<B>> {
    match MediaPlayer::bind(bus.clone(), path, interface) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!(path, error = %e, "skipping media player");
            None
        }
    }
}
