//! Message-bus capability consumed by the player proxies.
//!
//! [`Bus`] is the minimal surface the rest of the crate needs from a bus
//! connection: resolve an object handle, call a method on it, enumerate the
//! managed-object graph, and attach or detach signal callbacks. [`ZbusBus`] is
//! the production implementation on top of `zbus`.
//!
//! Every method is blocking from the caller's point of view. Implementations
//! backed by an async transport suspend the calling thread until the reply
//! future resolves; no timeout is applied here.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use zvariant::{OwnedValue, Value};

mod connection;
#[cfg(test)]
pub(crate) mod mock;

pub use connection::{ZbusBus, ZbusHandle};

/// Standard D-Bus properties interface.
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Property name to value, as carried in a managed-object entry.
pub type PropertyBag = HashMap<String, OwnedValue>;

/// Callback invoked for every signal delivered to a subscription. May run on
/// the transport's dispatch thread.
pub type SignalCallback = Arc<dyn Fn(&Signal) + Send + Sync>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Zbus(#[from] zbus::Error),

    #[error(transparent)]
    Fdo(#[from] zbus::fdo::Error),

    #[error(transparent)]
    Variant(#[from] zvariant::Error),

    #[error("bus connection is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// One entry of the managed-object graph.
#[derive(Debug)]
pub struct ManagedObject {
    pub path: String,
    pub interfaces: HashMap<String, PropertyBag>,
}

impl ManagedObject {
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.contains_key(interface)
    }
}

/// Arguments of a method call, limited to the shapes the player proxy sends.
#[derive(Debug)]
pub enum Args<'a> {
    None,
    /// A single `y` argument (AVRCP key code).
    Byte(u8),
    /// `(ss)`: interface and property name, as taken by `Properties.Get`.
    Property { interface: &'a str, name: &'static str },
    /// `(ssv)`: interface, property name and new value, as taken by `Properties.Set`.
    Assign {
        interface: &'a str,
        name: &'static str,
        value: Value<'a>,
    },
}

#[derive(Debug)]
pub struct MethodCall<'a> {
    pub member: &'static str,
    pub args: Args<'a>,
}

impl<'a> MethodCall<'a> {
    pub fn new(member: &'static str, args: Args<'a>) -> Self {
        Self { member, args }
    }

    /// `Properties.Get(interface, name)`.
    pub fn get(interface: &'a str, name: &'static str) -> Self {
        Self::new("Get", Args::Property { interface, name })
    }

    /// `Properties.Set(interface, name, value)`.
    pub fn set(interface: &'a str, name: &'static str, value: Value<'a>) -> Self {
        Self::new(
            "Set",
            Args::Assign {
                interface,
                name,
                value,
            },
        )
    }
}

/// Outcome of a dispatched call. Transport failures are reported separately
/// as `Err(TransportError)`; this only distinguishes a normal return from an
/// error reply sent by the remote side.
#[derive(Debug)]
pub enum Reply {
    Return(Option<OwnedValue>),
    Error { name: String, message: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SignalKind {
    PropertiesChanged,
}

impl SignalKind {
    pub fn member(self) -> &'static str {
        match self {
            SignalKind::PropertiesChanged => "PropertiesChanged",
        }
    }
}

/// A decoded `PropertiesChanged` notification.
#[derive(Debug)]
pub struct Signal {
    pub interface: String,
    /// Changed properties in the order the transport delivered them.
    pub changed: Vec<(String, OwnedValue)>,
    pub invalidated: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait Bus: Send + Sync + 'static {
    /// Resolved (interface, path) pair calls are issued against.
    type Handle: Send + Sync + 'static;

    fn resolve(&self, interface: &str, path: &str) -> Result<Self::Handle, TransportError>;

    fn call(&self, handle: &Self::Handle, call: MethodCall<'_>) -> Result<Reply, TransportError>;

    /// `ObjectManager.GetManagedObjects` against `root`, in a stable order.
    fn managed_objects(&self, root: &str) -> Result<Vec<ManagedObject>, TransportError>;

    fn add_signal_handler(
        &self,
        kind: SignalKind,
        handle: &Self::Handle,
        callback: SignalCallback,
    ) -> Result<SubscriptionId, TransportError>;

    /// Stop future delivery for `id`. Does not wait for a callback that is
    /// already running.
    fn remove_signal_handler(
        &self,
        kind: SignalKind,
        handle: &Self::Handle,
        id: SubscriptionId,
    ) -> Result<(), TransportError>;

    fn close(&self);
}
