//! Recording in-memory [`Bus`] used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use zvariant::{OwnedValue, Value};

use super::{
    Args, Bus, ManagedObject, MethodCall, PROPERTIES_INTERFACE, PropertyBag, Reply, Signal,
    SignalCallback, SignalKind, SubscriptionId, TransportError,
};

pub fn owned<'a>(value: impl Into<Value<'a>>) -> OwnedValue {
    OwnedValue::try_from(value.into()).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Resolve { interface: String, path: String },
    Call { path: String, member: String, args: String },
    Enumerate { root: String },
    AddHandler { path: String, id: u64 },
    RemoveHandler { path: String, id: u64 },
    Close,
}

/// How a property read is answered.
pub enum Answer {
    Value(OwnedValue),
    RemoteError(&'static str),
    TransportFault,
}

#[derive(Debug, Clone)]
pub struct MockHandle {
    pub interface: String,
    pub path: String,
}

#[derive(Default)]
pub struct MockBus {
    objects: Mutex<Vec<(String, Vec<String>)>>,
    unresolvable: Mutex<HashSet<String>>,
    properties: Mutex<HashMap<(String, String), Answer>>,
    failing_members: Mutex<HashSet<String>>,
    remote_errors: Mutex<HashSet<String>>,
    enumerate_fails: Mutex<bool>,
    remove_fails: Mutex<bool>,
    handlers: Mutex<HashMap<u64, (String, SignalCallback)>>,
    events: Mutex<Vec<Event>>,
    next_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, path: &str, interfaces: &[&str]) -> Self {
        lock(&self.objects).push((
            path.to_string(),
            interfaces.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Make `resolve` fail for any interface at `path`.
    pub fn unresolvable(self, path: &str) -> Self {
        lock(&self.unresolvable).insert(path.to_string());
        self
    }

    pub fn failing_enumeration(self) -> Self {
        *lock(&self.enumerate_fails) = true;
        self
    }

    pub fn failing_removal(&self) {
        *lock(&self.remove_fails) = true;
    }

    pub fn set_property(&self, path: &str, name: &str, answer: Answer) {
        lock(&self.properties).insert((path.to_string(), name.to_string()), answer);
    }

    /// Calls to `member` fail at the transport level.
    pub fn fail_member(&self, member: &str) {
        lock(&self.failing_members).insert(member.to_string());
    }

    /// Calls to `member` reach the remote side, which answers with an error.
    pub fn reject_member(&self, member: &str) {
        lock(&self.remote_errors).insert(member.to_string());
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    pub fn clear_events(&self) {
        lock(&self.events).clear();
    }

    pub fn active_handlers(&self, path: &str) -> usize {
        lock(&self.handlers)
            .values()
            .filter(|(p, _)| p == path)
            .count()
    }

    /// Deliver a `PropertiesChanged` signal to every handler registered for `path`.
    pub fn emit(&self, path: &str, interface: &str, changed: Vec<(&str, OwnedValue)>) {
        let signal = Signal {
            interface: interface.to_string(),
            changed: changed
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            invalidated: Vec::new(),
        };
        let callbacks: Vec<SignalCallback> = lock(&self.handlers)
            .values()
            .filter(|(p, _)| p == path)
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(&signal);
        }
    }

    fn record(&self, event: Event) {
        lock(&self.events).push(event);
    }
}

fn describe(args: &Args<'_>) -> String {
    match args {
        Args::None => String::new(),
        Args::Byte(code) => code.to_string(),
        Args::Property { interface, name } => format!("{interface} {name}"),
        Args::Assign {
            interface,
            name,
            value,
        } => format!("{interface} {name} {value}"),
    }
}

impl Bus for MockBus {
    type Handle = MockHandle;

    fn resolve(&self, interface: &str, path: &str) -> Result<MockHandle, TransportError> {
        self.record(Event::Resolve {
            interface: interface.to_string(),
            path: path.to_string(),
        });
        if lock(&self.unresolvable).contains(path) {
            return Err(TransportError::Other(format!("cannot resolve {path}")));
        }
        Ok(MockHandle {
            interface: interface.to_string(),
            path: path.to_string(),
        })
    }

    fn call(&self, handle: &MockHandle, call: MethodCall<'_>) -> Result<Reply, TransportError> {
        self.record(Event::Call {
            path: handle.path.clone(),
            member: call.member.to_string(),
            args: describe(&call.args),
        });

        if lock(&self.failing_members).contains(call.member) {
            return Err(TransportError::Other("connection reset".to_string()));
        }
        if lock(&self.remote_errors).contains(call.member) {
            return Ok(Reply::Error {
                name: "org.bluez.Error.Failed".to_string(),
                message: format!("{} failed", call.member),
            });
        }

        match (&call.args, handle.interface.as_str()) {
            (Args::Property { name, .. }, PROPERTIES_INTERFACE) => {
                let key = (handle.path.clone(), name.to_string());
                match lock(&self.properties).get(&key) {
                    Some(Answer::Value(v)) => Ok(Reply::Return(Some(v.try_clone()?))),
                    Some(Answer::RemoteError(err)) => Ok(Reply::Error {
                        name: err.to_string(),
                        message: "No such property".to_string(),
                    }),
                    Some(Answer::TransportFault) => {
                        Err(TransportError::Other("decode fault".to_string()))
                    }
                    None => Ok(Reply::Error {
                        name: "org.freedesktop.DBus.Error.InvalidArgs".to_string(),
                        message: format!("No such property '{name}'"),
                    }),
                }
            }
            _ => Ok(Reply::Return(None)),
        }
    }

    fn managed_objects(&self, root: &str) -> Result<Vec<ManagedObject>, TransportError> {
        self.record(Event::Enumerate {
            root: root.to_string(),
        });
        if *lock(&self.enumerate_fails) {
            return Err(TransportError::Other("ObjectManager unavailable".to_string()));
        }
        Ok(lock(&self.objects)
            .iter()
            .map(|(path, interfaces)| ManagedObject {
                path: path.clone(),
                interfaces: interfaces
                    .iter()
                    .map(|i| (i.clone(), PropertyBag::new()))
                    .collect(),
            })
            .collect())
    }

    fn add_signal_handler(
        &self,
        _kind: SignalKind,
        handle: &MockHandle,
        callback: SignalCallback,
    ) -> Result<SubscriptionId, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(Event::AddHandler {
            path: handle.path.clone(),
            id,
        });
        lock(&self.handlers).insert(id, (handle.path.clone(), callback));
        Ok(SubscriptionId(id))
    }

    fn remove_signal_handler(
        &self,
        _kind: SignalKind,
        handle: &MockHandle,
        id: SubscriptionId,
    ) -> Result<(), TransportError> {
        self.record(Event::RemoveHandler {
            path: handle.path.clone(),
            id: id.0,
        });
        if *lock(&self.remove_fails) {
            return Err(TransportError::Other("RemoveMatch failed".to_string()));
        }
        lock(&self.handlers).remove(&id.0);
        Ok(())
    }

    fn close(&self) {
        self.record(Event::Close);
    }
}
