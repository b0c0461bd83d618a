use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;

use async_io::block_on;
use futures_util::StreamExt;
use futures_util::future::{AbortHandle, Abortable};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zbus::fdo::ObjectManagerProxy;
use zbus::{Connection, Message, Proxy};
use zvariant::{OwnedValue, Signature, Type};

use super::{
    Args, Bus, ManagedObject, MethodCall, Reply, Signal, SignalCallback, SignalKind,
    SubscriptionId, TransportError,
};
use crate::config::BusKind;

/// A proxy for one (service, path, interface) triple.
pub struct ZbusHandle {
    proxy: Proxy<'static>,
}

/// [`Bus`] backed by an async `zbus` connection.
///
/// Calls are driven with `async_io::block_on`, so each one parks the calling
/// thread until zbus resolves the reply. Signal subscriptions get their own
/// dispatch thread that pumps the signal stream until the subscription is
/// removed or the connection is closed.
pub struct ZbusBus {
    connection: Connection,
    service: String,
    streams: Mutex<HashMap<SubscriptionId, AbortHandle>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl ZbusBus {
    pub fn connect(kind: BusKind, service: &str) -> Result<Self, TransportError> {
        let connection = block_on(async {
            match kind {
                BusKind::System => Connection::system().await,
                BusKind::Session => Connection::session().await,
            }
        })?;
        info!(bus = %kind, service, "connected to message bus");

        Ok(Self {
            connection,
            service: service.to_string(),
            streams: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }

    fn streams(&self) -> MutexGuard<'_, HashMap<SubscriptionId, AbortHandle>> {
        self.streams.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Bus for ZbusBus {
    type Handle = ZbusHandle;

    fn resolve(&self, interface: &str, path: &str) -> Result<ZbusHandle, TransportError> {
        self.ensure_open()?;
        let proxy = block_on(Proxy::new(
            &self.connection,
            self.service.clone(),
            path.to_string(),
            interface.to_string(),
        ))?;
        Ok(ZbusHandle { proxy })
    }

    fn call(&self, handle: &ZbusHandle, call: MethodCall<'_>) -> Result<Reply, TransportError> {
        self.ensure_open()?;
        let proxy = &handle.proxy;
        let member = call.member;

        let result = block_on(async {
            match &call.args {
                Args::None => proxy.call_method(member, &()).await,
                Args::Byte(code) => proxy.call_method(member, &(*code,)).await,
                Args::Property { interface, name } => {
                    proxy.call_method(member, &(*interface, *name)).await
                }
                Args::Assign {
                    interface,
                    name,
                    value,
                } => proxy.call_method(member, &(*interface, *name, value)).await,
            }
        });

        reply_from(result, matches!(call.args, Args::Property { .. }))
    }

    fn managed_objects(&self, root: &str) -> Result<Vec<ManagedObject>, TransportError> {
        self.ensure_open()?;
        let objects = block_on(async {
            let proxy = ObjectManagerProxy::builder(&self.connection)
                .destination(self.service.as_str())?
                .path(root)?
                .build()
                .await?;
            let objects = proxy.get_managed_objects().await?;
            Ok::<_, TransportError>(objects)
        })?;

        let mut entries: Vec<ManagedObject> = objects
            .into_iter()
            .map(|(path, interfaces)| ManagedObject {
                path: path.to_string(),
                interfaces: interfaces
                    .into_iter()
                    .map(|(name, props)| (name.to_string(), props))
                    .collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root, count = entries.len(), "enumerated managed objects");
        Ok(entries)
    }

    fn add_signal_handler(
        &self,
        kind: SignalKind,
        handle: &ZbusHandle,
        callback: SignalCallback,
    ) -> Result<SubscriptionId, TransportError> {
        self.ensure_open()?;
        let stream = block_on(handle.proxy.receive_signal(kind.member()))?;
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let path = handle.proxy.path().to_string();

        let (abort, registration) = AbortHandle::new_pair();
        let pump = async move {
            let mut stream = std::pin::pin!(stream);
            while let Some(message) = stream.next().await {
                match decode_properties_changed(&message) {
                    Ok(signal) => callback(&signal),
                    Err(e) => debug!(%path, error = %e, "ignoring malformed signal"),
                }
            }
        };

        thread::Builder::new()
            .name(format!("avrctl-signal-{}", id.0))
            .spawn(move || {
                let _ = block_on(Abortable::new(pump, registration));
            })
            .map_err(|e| TransportError::Other(format!("failed to spawn signal thread: {e}")))?;

        self.streams().insert(id, abort);
        debug!(signal = kind.member(), path = %handle.proxy.path(), id = id.0, "signal handler added");
        Ok(id)
    }

    /// Stops future delivery for `id`. A callback already running on the
    /// dispatch thread is not waited for and may still complete afterwards.
    fn remove_signal_handler(
        &self,
        kind: SignalKind,
        handle: &ZbusHandle,
        id: SubscriptionId,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            // close() already aborted every stream.
            return Ok(());
        }
        match self.streams().remove(&id) {
            Some(abort) => {
                abort.abort();
                debug!(signal = kind.member(), path = %handle.proxy.path(), id = id.0, "signal handler removed");
                Ok(())
            }
            None => Err(TransportError::Other(format!(
                "no signal handler registered with id {}",
                id.0
            ))),
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for (_, abort) in self.streams().drain() {
            abort.abort();
        }
        match block_on(self.connection.clone().close()) {
            Ok(()) => info!("message bus connection closed"),
            Err(e) => warn!(error = %e, "failed to close message bus connection"),
        }
    }
}

/// Map a zbus call result onto [`Reply`]. An error reply from the remote side
/// is a `Reply::Error`; every other failure is a transport error. The body is
/// only read when `wants_value` is set.
fn reply_from(
    result: zbus::Result<Message>,
    wants_value: bool,
) -> Result<Reply, TransportError> {
    match result {
        Ok(message) => {
            if !wants_value {
                return Ok(Reply::Return(None));
            }
            let body = message.body();
            let value: OwnedValue = body.deserialize()?;
            Ok(Reply::Return(Some(value)))
        }
        Err(zbus::Error::MethodError(name, message, _)) => Ok(Reply::Error {
            name: name.to_string(),
            message: message.unwrap_or_default(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// An `a{sv}` dictionary kept in wire order.
#[derive(Debug, Default)]
struct OrderedChanges(Vec<(String, OwnedValue)>);

impl Type for OrderedChanges {
    const SIGNATURE: &'static Signature = <HashMap<String, OwnedValue> as Type>::SIGNATURE;
}

impl<'de> Deserialize<'de> for OrderedChanges {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedChanges;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an a{sv} dictionary")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, OwnedValue>()? {
                    entries.push(entry);
                }
                Ok(OrderedChanges(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl Serialize for OrderedChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn decode_properties_changed(message: &Message) -> Result<Signal, TransportError> {
    let body = message.body();
    let (interface, changed, invalidated): (String, OrderedChanges, Vec<String>) =
        body.deserialize()?;

    Ok(Signal {
        interface,
        changed: changed.0,
        invalidated,
    })
}

#[cfg(test)]
mod tests;
