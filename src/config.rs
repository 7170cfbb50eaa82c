//! Support for library configuration options

use std::error::Error;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::item::EntityId;

/// Name of the host event fired whenever an item is completed (consumed by
/// automations and history sensors).
/// Feel free to override it when initing this library.
pub static COMPLETION_EVENT: Lazy<Arc<Mutex<String>>> =
    Lazy::new(|| Arc::new(Mutex::new("popup_todo_completed".to_string())));

/// The three backing lists a board is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// The main list holding the scheduled items
    pub target_list: EntityId,
    /// The due-less "some day" list
    pub long_term_list: EntityId,
    /// The read-only clone source
    pub template_list: EntityId,
}

impl BoardConfig {
    /// Configuration errors are fatal at setup time, never recovered at
    /// runtime: a board with a missing list cannot limp along.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let fields = [
            ("target_list", &self.target_list),
            ("long_term_list", &self.long_term_list),
            ("template_list", &self.template_list),
        ];
        for (name, value) in fields.iter() {
            if value.is_empty() {
                return Err(format!("Missing required config field: {}", name).into());
            }
        }
        if self.target_list == self.long_term_list
            || self.target_list == self.template_list
            || self.long_term_list == self.template_list
        {
            return Err("The configured lists must be three distinct entities".into());
        }
        Ok(())
    }
}
