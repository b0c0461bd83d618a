//! Conversion of wire variants into player domain values.
//!
//! Decoders never fail loudly: a value of the wrong shape is reported as
//! `None`, leaving the caller to treat it like a missing property.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use zvariant::{OwnedValue, Value};

use crate::player::names::{Property, ValueKind, track_field};
use crate::player::Track;

/// A decoded property value, as delivered to change subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
    Path(String),
    Unsigned(u32),
    Track(Track),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Text(s) | PropertyValue::Path(s) => f.write_str(s),
            PropertyValue::Unsigned(n) => write!(f, "{n}"),
            PropertyValue::Track(t) => write!(f, "{t}"),
        }
    }
}

/// Peel one variant layer, if there is one.
pub fn unwrap_variant<'r, 'a>(raw: &'r Value<'a>) -> &'r Value<'a> {
    match raw {
        Value::Value(inner) => &**inner,
        other => other,
    }
}

pub fn decode_bool(raw: &Value<'_>) -> Option<bool> {
    match unwrap_variant(raw) {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

pub fn decode_string(raw: &Value<'_>) -> Option<String> {
    match unwrap_variant(raw) {
        Value::Str(s) => Some(s.to_string()),
        _ => None,
    }
}

/// Object-path value to its string form.
pub fn decode_path(raw: &Value<'_>) -> Option<String> {
    match unwrap_variant(raw) {
        Value::ObjectPath(p) => Some(p.to_string()),
        _ => None,
    }
}

pub fn decode_unsigned(raw: &Value<'_>) -> Option<u32> {
    match unwrap_variant(raw) {
        Value::U32(n) => Some(*n),
        _ => None,
    }
}

/// Decode the `Track` dictionary.
///
/// Only a value that is not a string-keyed dictionary yields `None`; inside
/// the dictionary every field is decoded on its own and falls back to its
/// zero value.
pub fn decode_track(raw: &Value<'_>) -> Option<Track> {
    let Value::Dict(dict) = unwrap_variant(raw).try_clone().ok()? else {
        return None;
    };
    let fields = HashMap::<String, OwnedValue>::try_from(dict).ok()?;
    Some(track_from_fields(&fields))
}

fn track_from_fields(fields: &HashMap<String, OwnedValue>) -> Track {
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(|v| decode_string(v))
            .unwrap_or_default()
    };
    let number = |key: &str| {
        fields
            .get(key)
            .and_then(|v| decode_unsigned(v))
            .unwrap_or_default()
    };

    Track {
        artist: text(track_field::ARTIST),
        title: text(track_field::TITLE),
        album: text(track_field::ALBUM),
        genre: text(track_field::GENRE),
        track_number: number(track_field::TRACK_NUMBER),
        number_of_tracks: number(track_field::NUMBER_OF_TRACKS),
        duration: Duration::from_millis(u64::from(number(track_field::DURATION))),
    }
}

/// Decode a changed property according to its declared shape.
pub fn decode_change(property: Property, raw: &Value<'_>) -> Option<PropertyValue> {
    match property.kind() {
        ValueKind::Bool => decode_bool(raw).map(PropertyValue::Bool),
        ValueKind::Text => decode_string(raw).map(PropertyValue::Text),
        ValueKind::Path => decode_path(raw).map(PropertyValue::Path),
        ValueKind::Unsigned => decode_unsigned(raw).map(PropertyValue::Unsigned),
        ValueKind::Track => decode_track(raw).map(PropertyValue::Track),
    }
}
