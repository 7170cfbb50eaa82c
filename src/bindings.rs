//! Declarative entity-state bindings
//!
//! Widgets used to rely on reflective property binding to mirror host entity
//! states into their fields. Here each binding is an explicit descriptor: the
//! source entity, and a converter that writes the state into one field of the
//! target struct. A single generic function reconciles a pushed state snapshot
//! against a target and reports whether anything actually changed, which is
//! what drives change-based recomputation (e.g. of the target-day set).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::target_days::EveSignals;

/// A host entity's state string plus its attribute map
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
}

/// A pushed snapshot of entity states, keyed by entity id
pub type StateMap = HashMap<String, EntityState>;

/// One source-entity/target-field pair. `apply` converts the entity state and
/// writes it into the target, returning whether the field changed.
pub struct EntityBinding<T> {
    pub entity_id: String,
    apply: Box<dyn Fn(&EntityState, &mut T) -> bool + Send + Sync>,
}

impl<T> EntityBinding<T> {
    /// Build a binding from a converter and a field accessor.
    ///
    /// A converter returning `None` leaves the field untouched (e.g. while the
    /// source entity is still unavailable).
    pub fn new<V, Convert, Field>(entity_id: &str, convert: Convert, field: Field) -> Self
    where
        V: PartialEq + 'static,
        Convert: Fn(&EntityState) -> Option<V> + Send + Sync + 'static,
        Field: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        Self {
            entity_id: entity_id.to_string(),
            apply: Box::new(move |state, target| match convert(state) {
                None => false,
                Some(value) => {
                    let slot = field(target);
                    if *slot == value {
                        false
                    } else {
                        *slot = value;
                        true
                    }
                }
            }),
        }
    }
}

/// Reconcile a state snapshot against `target` through the given bindings.
/// Returns true iff any bound field changed, i.e. whether dependent values
/// need recomputing.
pub fn apply_bindings<T>(
    bindings: &[EntityBinding<T>],
    states: &StateMap,
    target: &mut T,
) -> bool {
    let mut changed = false;
    for binding in bindings {
        let state = match states.get(&binding.entity_id) {
            None => continue,
            Some(state) => state,
        };
        if (binding.apply)(state, target) {
            changed = true;
        }
    }
    changed
}

/// `on`/`off` state to a boolean (the host's binary sensors)
pub fn state_to_bool(state: &EntityState) -> Option<bool> {
    match state.state.as_str() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// A timestamp-valued state to its local calendar day.
/// Unavailable/unparseable states clear the field.
pub fn state_to_day(state: &EntityState) -> Option<Option<NaiveDate>> {
    let parsed = DateTime::parse_from_rfc3339(&state.state)
        .map(|instant| instant.with_timezone(&chrono::Local).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(&state.state, "%Y-%m-%d"))
        .ok();
    Some(parsed)
}

/// The `options` attribute of a select-like entity
pub fn attribute_options(state: &EntityState) -> Option<Vec<String>> {
    let options = state.attributes.get("options")?.as_array()?;
    Some(
        options
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
    )
}

/// The stock descriptor set wiring [`EveSignals`] to the host's calendar and
/// snooze-time entities.
pub fn eve_signal_bindings() -> Vec<EntityBinding<EveSignals>> {
    vec![
        EntityBinding::new(
            "binary_sensor.jewish_calendar_erev_shabbat_hag",
            state_to_bool,
            |signals: &mut EveSignals| &mut signals.is_eve,
        ),
        EntityBinding::new(
            "sensor.jewish_calendar_upcoming_candle_lighting",
            state_to_day,
            |signals: &mut EveSignals| &mut signals.erev_date,
        ),
        EntityBinding::new(
            "sensor.jewish_calendar_upcoming_havdalah",
            state_to_day,
            |signals: &mut EveSignals| &mut signals.motzei_date,
        ),
        EntityBinding::new(
            "input_select.snooze_times",
            attribute_options,
            |signals: &mut EveSignals| &mut signals.snooze_times_primary,
        ),
        EntityBinding::new(
            "sensor.snooze_times",
            attribute_options,
            |signals: &mut EveSignals| &mut signals.snooze_times_extra,
        ),
    ]
}
