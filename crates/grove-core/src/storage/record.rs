//! The single durable session record and its lenient decoder.
//!
//! Writing is strict: [`PersistedRecord`] serializes every field. Reading is
//! forgiving: each field is decoded on its own, and a missing or mistyped
//! field simply comes back as `None` so the caller can fall back to the
//! default for that field alone.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::timer::{Mode, Species};

/// Storage key of the record. The suffix versions the schema.
pub const STORAGE_KEY: &str = "grove.session.v1";

/// Everything the engine writes on a state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub focus_minutes: f64,
    pub break_minutes: f64,
    pub mode: Mode,
    pub is_running: bool,
    pub remaining_ms: u64,
    /// Length of the in-flight interval.
    pub total_ms: u64,
    /// Predicted wall-clock end of the running interval; `None` when idle.
    pub end_at: Option<i64>,
    pub session_count: u64,
    pub species: Species,
    pub sound_muted: bool,
    pub volume: f64,
    pub ambient_on: bool,
    pub saved_at: i64,
}

impl PersistedRecord {
    /// Overlay this record onto whatever object was stored before, keeping
    /// keys this schema does not know about.
    pub fn merge_into(&self, base: &Map<String, Value>) -> Result<Value, serde_json::Error> {
        let mut merged = base.clone();
        if let Value::Object(fields) = serde_json::to_value(self)? {
            merged.extend(fields);
        }
        Ok(Value::Object(merged))
    }
}

/// A record as read back from storage, field by field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub focus_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub break_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<Mode>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_running: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub remaining_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_at: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub session_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub species: Option<Species>,
    #[serde(default, deserialize_with = "lenient")]
    pub sound_muted: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ambient_on: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub saved_at: Option<f64>,
}

impl StoredRecord {
    /// Decode a stored JSON object.
    ///
    /// Returns `None` when the text is not JSON or not an object; the raw
    /// object is returned alongside so unknown keys survive the next write.
    pub fn parse(json: &str) -> Option<(Self, Map<String, Value>)> {
        let Value::Object(raw) = serde_json::from_str::<Value>(json).ok()? else {
            return None;
        };
        let record = Self::deserialize(Value::Object(raw.clone())).ok()?;
        Some((record, raw))
    }

    /// `remainingMs` as whole milliseconds, if it is a usable number.
    pub fn remaining_ms(&self) -> Option<u64> {
        self.remaining_ms.and_then(non_negative_ms)
    }

    pub fn total_ms(&self) -> Option<u64> {
        self.total_ms.and_then(non_negative_ms)
    }

    pub fn end_at(&self) -> Option<i64> {
        self.end_at.filter(|v| v.is_finite()).map(|v| v.round() as i64)
    }

    pub fn saved_at(&self) -> Option<i64> {
        self.saved_at.filter(|v| v.is_finite()).map(|v| v.round() as i64)
    }
}

fn non_negative_ms(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

/// Decode a field, turning any type mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}
