//! Selective persistence of the state tree.
//!
//! Only slices on the allow list (and not on the deny list) are written to
//! durable storage. With the default configuration that is the session
//! slice alone, stored under the single key `root`.

use super::RootState;
use super::session::SessionState;
use crate::error::StorageError;
use serde_json::{Map, Value};

pub const ROOT_KEY: &str = "root";
pub const PERSIST_VERSION: u64 = 1;
const VERSION_FIELD: &str = "_version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Session,
    Home,
    Facility,
    Booking,
}

impl Slice {
    pub const ALL: [Slice; 4] = [Slice::Session, Slice::Home, Slice::Facility, Slice::Booking];

    pub fn key(&self) -> &'static str {
        match self {
            Slice::Session => "user",
            Slice::Home => "home",
            Slice::Facility => "facility",
            Slice::Booking => "booking",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistConfig {
    pub key: String,
    pub allow: Vec<Slice>,
    pub deny: Vec<Slice>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: ROOT_KEY.to_string(),
            allow: vec![Slice::Session],
            deny: vec![Slice::Home, Slice::Facility],
        }
    }
}

impl PersistConfig {
    pub fn persists(&self, slice: Slice) -> bool {
        self.allow.contains(&slice) && !self.deny.contains(&slice)
    }
}

/// Serialize the persisted part of `state` into a JSON object.
pub fn snapshot(state: &RootState, config: &PersistConfig) -> Value {
    let mut map = Map::new();
    map.insert(VERSION_FIELD.to_string(), Value::from(PERSIST_VERSION));
    for slice in Slice::ALL {
        if !config.persists(slice) {
            continue;
        }
        let value = match slice {
            Slice::Session => serde_json::to_value(&state.session),
            Slice::Home => serde_json::to_value(&state.home),
            Slice::Facility => serde_json::to_value(&state.facility),
            Slice::Booking => serde_json::to_value(&state.booking),
        };
        // plain data structs; serialization cannot fail
        if let Ok(value) = value {
            map.insert(slice.key().to_string(), value);
        }
    }
    Value::Object(map)
}

/// Rebuild a tree from a snapshot: persisted slices are restored, every
/// other slice starts from its default.
pub fn restore(snapshot: &Value, config: &PersistConfig) -> Result<RootState, StorageError> {
    let map = snapshot.as_object().ok_or_else(|| corrupt("snapshot is not an object"))?;

    match map.get(VERSION_FIELD).and_then(Value::as_u64) {
        Some(PERSIST_VERSION) => {}
        other => {
            return Err(corrupt(&format!(
                "unsupported snapshot version {:?}",
                other
            )));
        }
    }

    let mut state = RootState::default();
    for slice in Slice::ALL {
        if !config.persists(slice) {
            continue;
        }
        let Some(value) = map.get(slice.key()) else {
            continue;
        };
        let value = value.clone();
        match slice {
            Slice::Session => {
                let session: SessionState = decode(value, slice)?;
                // a half-populated session is never resumed
                if session.is_consistent() {
                    state.session = session;
                }
            }
            Slice::Home => state.home = decode(value, slice)?,
            Slice::Facility => state.facility = decode(value, slice)?,
            Slice::Booking => state.booking = decode(value, slice)?,
        }
    }
    Ok(state)
}

pub fn restore_str(raw: &str, config: &PersistConfig) -> Result<RootState, StorageError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| corrupt(&e.to_string()))?;
    restore(&value, config)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, slice: Slice) -> Result<T, StorageError> {
    serde_json::from_value(value).map_err(|e| corrupt(&format!("slice '{}': {}", slice.key(), e)))
}

fn corrupt(message: &str) -> StorageError {
    StorageError::CorruptState {
        message: message.to_string(),
    }
}
