//! An in-memory host for tests, with tweakable failure behaviour
#![cfg(any(test, feature = "mock_host"))]

use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::item::{EntityId, NewTodo, TodoItem, TodoItemWithEntity, TodoStatus};
use crate::store::ListStore;
use crate::traits::{ListCapabilities, NotificationSink, TodoHost};

/// This stores some behaviour tweaks, that describe how a mocked host will
/// behave during a given test
///
/// So that a function fails _n_ times after _m_ initial successes, set
/// `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    pub update_item_behaviour: (u32, u32),
    pub create_item_behaviour: (u32, u32),
    pub delete_items_behaviour: (u32, u32),
    pub move_item_behaviour: (u32, u32),
    pub fire_completion_event_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            update_item_behaviour: (0, n_fails),
            create_item_behaviour: (0, n_fails),
            delete_items_behaviour: (0, n_fails),
            move_item_behaviour: (0, n_fails),
            fire_completion_event_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_update_item(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_item_behaviour, "update_item")
    }
    pub fn can_create_item(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_item_behaviour, "create_item")
    }
    pub fn can_delete_items(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_items_behaviour, "delete_items")
    }
    pub fn can_move_item(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.move_item_behaviour, "move_item")
    }
    pub fn can_fire_completion_event(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.fire_completion_event_behaviour, "fire_completion_event")
    }
}

/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Box<dyn Error>> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

/// Every mutation call the mock host accepted, in order
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    Update { list: EntityId, item: TodoItem },
    Create { list: EntityId, fields: NewTodo },
    Delete { list: EntityId, uids: Vec<String> },
    Move { list: EntityId, uid: String, previous_uid: Option<String> },
    CompletionEvent { list: EntityId, uid: String },
}

/// An in-memory [`TodoHost`] that confirms mutations by pushing fresh
/// snapshots into a shared [`ListStore`], the way a real subscription feed
/// would.
///
/// Set `confirm_creates(false)` to simulate a host whose feed never reflects a
/// created item (for uid-recovery timeout tests).
pub struct MockHost {
    store: Arc<ListStore>,
    lists: Mutex<HashMap<EntityId, (ListCapabilities, Vec<TodoItem>)>>,
    calls: Mutex<Vec<HostCall>>,
    behaviour: Mutex<MockBehaviour>,
    confirm_creates: AtomicBool,
}

impl MockHost {
    pub fn new(store: Arc<ListStore>) -> Self {
        Self {
            store,
            lists: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            behaviour: Mutex::new(MockBehaviour::new()),
            confirm_creates: AtomicBool::new(true),
        }
    }

    /// Register a list with the given capabilities and initial items, and push
    /// its first snapshot
    pub fn add_list(&self, list: &EntityId, capabilities: ListCapabilities, items: Vec<TodoItem>) {
        self.lists
            .lock()
            .unwrap()
            .insert(list.clone(), (capabilities, items));
        self.push_snapshot(list);
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    /// Whether created items show up in subsequent snapshots (default true)
    pub fn confirm_creates(&self, confirm: bool) {
        self.confirm_creates.store(confirm, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The current items of `list`, in host order
    pub fn items(&self, list: &EntityId) -> Vec<TodoItem> {
        self.lists
            .lock()
            .unwrap()
            .get(list)
            .map(|(_, items)| items.clone())
            .unwrap_or_default()
    }

    fn push_snapshot(&self, list: &EntityId) {
        let items = self.items(list);
        self.store.apply_push(list, items);
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TodoHost for Arc<MockHost> {
    async fn update_item(&self, list: &EntityId, item: &TodoItem) -> Result<(), Box<dyn Error>> {
        self.behaviour.lock().unwrap().can_update_item()?;
        self.record(HostCall::Update { list: list.clone(), item: item.clone() });
        {
            let mut lists = self.lists.lock().unwrap();
            let (_, items) = lists
                .get_mut(list)
                .ok_or_else(|| format!("No such list: {}", list))?;
            let existing = items
                .iter_mut()
                .find(|existing| existing.uid == item.uid)
                .ok_or_else(|| format!("No item {} in {}", item.uid, list))?;
            *existing = item.clone();
        }
        self.push_snapshot(list);
        Ok(())
    }

    async fn create_item(&self, list: &EntityId, fields: &NewTodo) -> Result<(), Box<dyn Error>> {
        self.behaviour.lock().unwrap().can_create_item()?;
        self.record(HostCall::Create { list: list.clone(), fields: fields.clone() });
        if self.confirm_creates.load(Ordering::SeqCst) == false {
            // The call "succeeds" but the feed never reflects it
            return Ok(());
        }
        {
            let mut lists = self.lists.lock().unwrap();
            let (_, items) = lists
                .get_mut(list)
                .ok_or_else(|| format!("No such list: {}", list))?;
            items.push(TodoItem {
                uid: uuid::Uuid::new_v4().to_hyphenated().to_string(),
                summary: fields.summary.clone(),
                status: TodoStatus::NeedsAction,
                description: fields.description.clone(),
                due: fields.due.clone(),
            });
        }
        self.push_snapshot(list);
        Ok(())
    }

    async fn delete_items(&self, list: &EntityId, uids: &[String]) -> Result<(), Box<dyn Error>> {
        self.behaviour.lock().unwrap().can_delete_items()?;
        self.record(HostCall::Delete { list: list.clone(), uids: uids.to_vec() });
        {
            let mut lists = self.lists.lock().unwrap();
            let (_, items) = lists
                .get_mut(list)
                .ok_or_else(|| format!("No such list: {}", list))?;
            items.retain(|item| uids.contains(&item.uid) == false);
        }
        self.push_snapshot(list);
        Ok(())
    }

    async fn move_item(
        &self,
        list: &EntityId,
        uid: &str,
        previous_uid: Option<&str>,
    ) -> Result<(), Box<dyn Error>> {
        self.behaviour.lock().unwrap().can_move_item()?;
        self.record(HostCall::Move {
            list: list.clone(),
            uid: uid.to_string(),
            previous_uid: previous_uid.map(str::to_string),
        });
        {
            let mut lists = self.lists.lock().unwrap();
            let (_, items) = lists
                .get_mut(list)
                .ok_or_else(|| format!("No such list: {}", list))?;
            let from = items
                .iter()
                .position(|item| item.uid == uid)
                .ok_or_else(|| format!("No item {} in {}", uid, list))?;
            let moved = items.remove(from);
            let to = match previous_uid {
                None => 0,
                Some(previous_uid) => {
                    items
                        .iter()
                        .position(|item| item.uid == previous_uid)
                        .ok_or_else(|| format!("No item {} in {}", previous_uid, list))?
                        + 1
                }
            };
            items.insert(to, moved);
        }
        self.push_snapshot(list);
        Ok(())
    }

    fn capabilities(&self, list: &EntityId) -> ListCapabilities {
        self.lists
            .lock()
            .unwrap()
            .get(list)
            .map(|(capabilities, _)| *capabilities)
            .unwrap_or_else(ListCapabilities::empty)
    }

    async fn fire_completion_event(
        &self,
        item: &TodoItemWithEntity,
    ) -> Result<(), Box<dyn Error>> {
        self.behaviour.lock().unwrap().can_fire_completion_event()?;
        log::debug!(
            "Firing {} for \"{}\"",
            crate::config::COMPLETION_EVENT.lock().unwrap(),
            item.summary()
        );
        self.record(HostCall::CompletionEvent {
            list: item.entity_id.clone(),
            uid: item.uid().to_string(),
        });
        Ok(())
    }
}

/// A [`NotificationSink`] that records what the user would have seen
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for Arc<RecordingSink> {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
