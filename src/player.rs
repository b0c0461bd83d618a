//! Typed proxy for one remote media player.
//!
//! A [`MediaPlayer`] is bound to a single object path. Control methods wait for
//! the bus to acknowledge the call and only report transport failures; property
//! getters fetch the current value on every call and return `None` for
//! anything that cannot be read.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};
use zvariant::{OwnedValue, Value};

use crate::bus::{
    Args, Bus, MethodCall, PROPERTIES_INTERFACE, Reply, Signal, SignalKind, SubscriptionId,
};
use crate::codec::{self, PropertyValue};
use crate::error::{Error, Result};

pub mod names;
mod track;

use names::{Method, Property};
pub use track::{Track, format_elapsed};

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

pub struct MediaPlayer<B: Bus> {
    bus: Arc<B>,
    path: String,
    interface: String,
    controls: B::Handle,
    properties: B::Handle,
    subscription: Option<SubscriptionId>,
    tag: u64,
}

impl<B: Bus> MediaPlayer<B> {
    /// Bind to the player at `path`, resolving the controls and properties
    /// handles up front.
    pub fn bind(bus: Arc<B>, path: &str, interface: &str) -> Result<Self> {
        let resolve = |iface: &str| {
            bus.resolve(iface, path).map_err(|source| Error::Binding {
                path: path.to_string(),
                interface: iface.to_string(),
                source,
            })
        };
        let controls = resolve(interface)?;
        let properties = resolve(PROPERTIES_INTERFACE)?;

        Ok(Self {
            bus,
            path: path.to_string(),
            interface: interface.to_string(),
            controls,
            properties,
            subscription: None,
            tag: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    // Controls

    pub fn play(&self) -> Result<()> {
        self.invoke(Method::Play, Args::None)
    }

    pub fn pause(&self) -> Result<()> {
        self.invoke(Method::Pause, Args::None)
    }

    pub fn stop(&self) -> Result<()> {
        self.invoke(Method::Stop, Args::None)
    }

    pub fn next(&self) -> Result<()> {
        self.invoke(Method::Next, Args::None)
    }

    pub fn previous(&self) -> Result<()> {
        self.invoke(Method::Previous, Args::None)
    }

    pub fn fast_forward(&self) -> Result<()> {
        self.invoke(Method::FastForward, Args::None)
    }

    pub fn rewind(&self) -> Result<()> {
        self.invoke(Method::Rewind, Args::None)
    }

    /// Press and release the AVRCP key `code`.
    pub fn press(&self, code: u8) -> Result<()> {
        self.invoke(Method::Press, Args::Byte(code))
    }

    /// Press and hold the AVRCP key `code` until [`release`](Self::release).
    pub fn hold(&self, code: u8) -> Result<()> {
        self.invoke(Method::Hold, Args::Byte(code))
    }

    pub fn release(&self) -> Result<()> {
        self.invoke(Method::Release, Args::None)
    }

    // Properties

    pub fn is_browsable(&self) -> Option<bool> {
        self.read(Property::Browsable, codec::decode_bool)
    }

    /// Object path of the device the player belongs to.
    pub fn device(&self) -> Option<String> {
        self.read(Property::Device, codec::decode_path)
    }

    pub fn equalizer(&self) -> Option<String> {
        self.read(Property::Equalizer, codec::decode_string)
    }

    pub fn name(&self) -> Option<String> {
        self.read(Property::Name, codec::decode_string)
    }

    pub fn playlist(&self) -> Option<String> {
        self.read(Property::Playlist, codec::decode_path)
    }

    /// Playback position in milliseconds.
    pub fn position(&self) -> Option<u32> {
        self.read(Property::Position, codec::decode_unsigned)
    }

    pub fn repeat(&self) -> Option<String> {
        self.read(Property::Repeat, codec::decode_string)
    }

    pub fn scan(&self) -> Option<String> {
        self.read(Property::Scan, codec::decode_string)
    }

    pub fn is_searchable(&self) -> Option<bool> {
        self.read(Property::Searchable, codec::decode_bool)
    }

    pub fn shuffle(&self) -> Option<String> {
        self.read(Property::Shuffle, codec::decode_string)
    }

    pub fn status(&self) -> Option<String> {
        self.read(Property::Status, codec::decode_string)
    }

    pub fn subtype(&self) -> Option<String> {
        self.read(Property::Subtype, codec::decode_string)
    }

    pub fn track(&self) -> Option<Track> {
        self.read(Property::Track, codec::decode_track)
    }

    pub fn player_type(&self) -> Option<String> {
        self.read(Property::Type, codec::decode_string)
    }

    pub fn set_equalizer(&self, value: &str) -> Result<()> {
        let call = MethodCall::set(
            &self.interface,
            Property::Equalizer.as_str(),
            Value::from(value),
        );
        self.dispatch(&self.properties, call)
    }

    /// Device path when readable, otherwise a fallback label unique to this
    /// instance.
    pub fn display_name(&self) -> String {
        self.device()
            .unwrap_or_else(|| format!("MediaPlayer@{:x}", self.tag))
    }

    // Subscriptions

    /// Route property changes of this player to `handler`, one call per
    /// changed property in delivery order.
    ///
    /// Any previous subscription is removed before the new one is added, so at
    /// most one handler is ever registered. `handler` may be called from the
    /// transport's dispatch thread.
    pub fn subscribe<F>(&mut self, handler: F) -> Result<()>
    where
        F: Fn(&str, PropertyValue) + Send + Sync + 'static,
    {
        self.unsubscribe()?;

        let interface = self.interface.clone();
        let path = self.path.clone();
        let callback = Arc::new(move |signal: &Signal| {
            if signal.interface != interface {
                return;
            }
            for (name, raw) in &signal.changed {
                match decode_changed(name, raw) {
                    Some(value) => handler(name, value),
                    None => debug!(%path, property = %name, "skipping undecodable change"),
                }
            }
        });

        let kind = SignalKind::PropertiesChanged;
        let id = self
            .bus
            .add_signal_handler(kind, &self.properties, callback)
            .map_err(|source| self.dispatch_error(kind.member(), source))?;
        self.subscription = Some(id);
        info!(path = %self.path, "subscribed to property changes");
        Ok(())
    }

    /// Remove the active subscription. Does nothing when there is none.
    ///
    /// If the transport refuses the removal the subscription is kept and the
    /// error is returned.
    pub fn unsubscribe(&mut self) -> Result<()> {
        let Some(id) = self.subscription else {
            return Ok(());
        };
        let kind = SignalKind::PropertiesChanged;
        self.bus
            .remove_signal_handler(kind, &self.properties, id)
            .map_err(|source| self.dispatch_error(kind.member(), source))?;
        self.subscription = None;
        debug!(path = %self.path, "unsubscribed from property changes");
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    fn invoke(&self, method: Method, args: Args<'_>) -> Result<()> {
        self.dispatch(&self.controls, MethodCall::new(method.as_str(), args))
    }

    fn dispatch(&self, handle: &B::Handle, call: MethodCall<'_>) -> Result<()> {
        let member = call.member;
        match self.bus.call(handle, call) {
            Ok(Reply::Return(_)) => {
                debug!(path = %self.path, member, "call acknowledged");
                Ok(())
            }
            Ok(Reply::Error { name, message }) => {
                warn!(path = %self.path, member, error = %name, "remote rejected call: {message}");
                Ok(())
            }
            Err(source) => Err(self.dispatch_error(member, source)),
        }
    }

    fn dispatch_error(&self, member: &'static str, source: crate::bus::TransportError) -> Error {
        Error::Dispatch {
            member,
            path: self.path.clone(),
            source,
        }
    }

    fn fetch(&self, property: Property) -> Option<OwnedValue> {
        let call = MethodCall::get(&self.interface, property.as_str());
        match self.bus.call(&self.properties, call) {
            Ok(Reply::Return(Some(value))) => Some(value),
            Ok(Reply::Return(None)) => {
                warn!(path = %self.path, property = property.as_str(), "empty property reply");
                None
            }
            Ok(Reply::Error { name, message }) => {
                debug!(path = %self.path, property = property.as_str(), error = %name, "property unavailable: {message}");
                None
            }
            Err(e) => {
                warn!(path = %self.path, property = property.as_str(), error = %e, "failed to read property");
                None
            }
        }
    }

    fn read<T>(&self, property: Property, decode: fn(&Value<'_>) -> Option<T>) -> Option<T> {
        let raw = self.fetch(property)?;
        let value = decode(&raw);
        if value.is_none() {
            warn!(path = %self.path, property = property.as_str(), "unexpected property shape");
        }
        value
    }
}

fn decode_changed(name: &str, raw: &OwnedValue) -> Option<PropertyValue> {
    codec::decode_change(Property::from_name(name)?, raw)
}

impl<B: Bus> fmt::Display for MediaPlayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl<B: Bus> fmt::Debug for MediaPlayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPlayer")
            .field("path", &self.path)
            .field("interface", &self.interface)
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl<B: Bus> Drop for MediaPlayer<B> {
    fn drop(&mut self) {
        if let Err(e) = self.unsubscribe() {
            warn!(path = %self.path, error = %e, "failed to release subscription");
        }
    }
}
