//! The JSON metadata blob piggybacked on an item's description field
//!
//! Several integrations share this blob, so this codec must round-trip keys it
//! does not recognize, and must treat malformed JSON as an empty record rather
//! than an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extra per-item data that the host's todo model has no field for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Icon shown on the item's card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Due time (`HH:MM:SS`), used only when the owning list cannot store
    /// time-of-day precision and `due` is a bare date
    #[serde(rename = "dueTime", default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,

    /// Forces visual prominence, independently of overdue-ness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent: Option<bool>,

    /// Groups template items into captioned sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Keys written by other integrations. Preserved verbatim on round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemMetadata {
    /// Parse the blob out of a description field.
    ///
    /// This is a total function: a missing description, malformed JSON, or JSON
    /// that is not an object all decode to the default (empty) record.
    pub fn parse(description: Option<&str>) -> Self {
        let text = match description {
            None => return Self::default(),
            Some(text) => text,
        };
        match serde_json::from_str(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::debug!("Ignoring malformed item metadata ({}): {:?}", err, text);
                Self::default()
            }
        }
    }

    /// Serialize this record back into a description string.
    pub fn encode(&self) -> String {
        serde_json::to_string(self)
            .unwrap(/* cannot panic: this record is a JSON object with string keys */)
    }

    /// Read-modify-write helper: parse the existing description, apply `patch`
    /// to the parsed record, and re-encode. Keys that `patch` does not touch
    /// (including foreign keys in `extra`) survive unchanged.
    pub fn update<F>(description: Option<&str>, patch: F) -> String
    where
        F: FnOnce(&mut ItemMetadata),
    {
        let mut meta = Self::parse(description);
        patch(&mut meta);
        meta.encode()
    }
}
