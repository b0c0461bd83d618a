use zbus::names::OwnedErrorName;
use zvariant::Value;

use super::*;
use crate::codec::decode_unsigned;

const PATH: &str = "/org/bluez/hci0/dev_00_11_22_33_44_55/player0";
const IFACE: &str = "org.bluez.MediaPlayer1";

fn owned<'a>(value: impl Into<Value<'a>>) -> OwnedValue {
    OwnedValue::try_from(value.into()).unwrap()
}

fn signal_message<B>(body: &B) -> Message
where
    B: serde::Serialize + zvariant::DynamicType,
{
    Message::signal(PATH, "org.freedesktop.DBus.Properties", "PropertiesChanged")
        .unwrap()
        .build(body)
        .unwrap()
}

fn some_message() -> Message {
    signal_message(&())
}

#[test]
fn properties_changed_keeps_wire_order() {
    let changes = OrderedChanges(vec![
        ("Status".to_string(), owned("paused")),
        ("Position".to_string(), owned(1200u32)),
        ("Browsable".to_string(), owned(true)),
    ]);
    let message = signal_message(&(IFACE, changes, Vec::<String>::new()));

    let signal = decode_properties_changed(&message).unwrap();
    let names: Vec<&str> = signal.changed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Status", "Position", "Browsable"]);
    assert_eq!(decode_unsigned(&signal.changed[1].1), Some(1200));
}

#[test]
fn properties_changed_carries_interface_and_invalidated_names() {
    let changes = OrderedChanges(vec![("Status".to_string(), owned("playing"))]);
    let message = signal_message(&(
        "org.bluez.MediaControl1",
        changes,
        vec!["Track".to_string()],
    ));

    let signal = decode_properties_changed(&message).unwrap();
    assert_eq!(signal.interface, "org.bluez.MediaControl1");
    assert_eq!(signal.invalidated, vec!["Track".to_string()]);
    assert_eq!(signal.changed.len(), 1);
}

#[test]
fn properties_changed_with_empty_changes() {
    let message = signal_message(&(IFACE, OrderedChanges::default(), Vec::<String>::new()));
    let signal = decode_properties_changed(&message).unwrap();
    assert!(signal.changed.is_empty());
}

#[test]
fn malformed_properties_changed_is_rejected() {
    let message = signal_message(&(IFACE, 42u32));
    assert!(decode_properties_changed(&message).is_err());

    let message = signal_message(&());
    assert!(decode_properties_changed(&message).is_err());
}

#[test]
fn error_reply_becomes_a_remote_error() {
    let name = OwnedErrorName::try_from("org.bluez.Error.NotSupported").unwrap();
    let result = Err(zbus::Error::MethodError(
        name,
        Some("Operation is not supported".to_string()),
        some_message(),
    ));

    match reply_from(result, true).unwrap() {
        Reply::Error { name, message } => {
            assert_eq!(name, "org.bluez.Error.NotSupported");
            assert_eq!(message, "Operation is not supported");
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn error_reply_without_description_has_empty_message() {
    let name = OwnedErrorName::try_from("org.bluez.Error.Failed").unwrap();
    let result = Err(zbus::Error::MethodError(name, None, some_message()));

    assert!(matches!(
        reply_from(result, false),
        Ok(Reply::Error { ref message, .. }) if message.is_empty()
    ));
}

#[test]
fn other_failures_are_transport_errors() {
    let result = Err(zbus::Error::Failure("connection reset".to_string()));
    assert!(matches!(
        reply_from(result, false),
        Err(TransportError::Zbus(_))
    ));
}

#[test]
fn non_property_calls_return_nothing() {
    assert!(matches!(
        reply_from(Ok(some_message()), false),
        Ok(Reply::Return(None))
    ));
}

#[test]
fn property_calls_return_the_value() {
    let message = signal_message(&Value::from(42u32));
    match reply_from(Ok(message), true).unwrap() {
        Reply::Return(Some(value)) => assert_eq!(decode_unsigned(&value), Some(42)),
        other => panic!("unexpected reply: {other:?}"),
    }
}
