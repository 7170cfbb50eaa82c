//! Executing drag/drop intents against the host
//!
//! The host has no cross-list move primitive and none of its mutation calls
//! return the mutated item, so a drop can require a delete, a create, a poll of
//! the subscription feed to learn the new uid, a completion update, and a
//! reorder call, in that order. This module owns that sequence, the Saving
//! state that suppresses re-renders while it runs, and the recovery path that
//! rebuilds the drag surface when any step fails.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::actions::{apply_todo_actions, TodoActions};
use crate::clock::{Clock, Delay};
use crate::due::compute_due_timestamp;
use crate::item::{EntityId, NewTodo, TodoItem, TodoItemWithEntity, TodoStatus};
use crate::store::ListStore;
use crate::traits::{NotificationSink, TodoHost};

pub mod progress;
use progress::{SaveEvent, SaveProgress};

/// How many times the uid-recovery poll reads the subscription snapshot before
/// giving up. The backoff grows linearly: 100ms, 200ms, ... 500ms.
const UID_RECOVERY_ATTEMPTS: u32 = 5;
const UID_RECOVERY_BACKOFF_STEP: Duration = Duration::from_millis(100);

/// Where a dropped item should land within the target list
#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    /// No ordering was requested; skip the move call entirely
    Keep,
    /// Place the item first in the list
    First,
    /// Place the item immediately after the item with this uid
    After(String),
}

/// A drag/drop intent: apply `status`/`due` to `item` and make sure it ends up
/// in `target_entity` at the requested position.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateIntent {
    /// The existing item to update, or a not-yet-created item to add
    pub item: TodoItemWithEntity,
    /// The new due timestamp, if the drop target implies one
    pub due: Option<DateTime<Local>>,
    pub status: TodoStatus,
    /// The list the item should be in. When this differs from
    /// `item.entity_id`, the save becomes a delete+create pair.
    pub target_entity: EntityId,
    pub placement: Placement,
}

/// The controller owning optimistic save state across 1..N backing lists.
///
/// One save proceeds at a time (`&mut self` enforces it within one instance);
/// the Saving flag is advisory beyond that: it mutes the store's re-render
/// notifications but does not queue new intents, so callers are expected to
/// disable their drop targets while [`Reconciler::is_saving`] is true.
pub struct Reconciler<H, N, C, D>
where
    H: TodoHost,
    N: NotificationSink,
    C: Clock,
    D: Delay,
{
    host: H,
    notifications: N,
    clock: C,
    delay: D,
    /// The subscription snapshots, shared with whoever owns the feed
    store: Arc<ListStore>,
    /// The read-only clone source; items "moved" out of it are never deleted
    template_list: Option<EntityId>,
    render_generation: u64,
    saving: bool,
}

impl<H, N, C, D> Reconciler<H, N, C, D>
where
    H: TodoHost,
    N: NotificationSink,
    C: Clock,
    D: Delay,
{
    pub fn new(host: H, notifications: N, clock: C, delay: D, store: Arc<ListStore>) -> Self {
        Self {
            host,
            notifications,
            clock,
            delay,
            store,
            template_list: None,
            render_generation: 0,
            saving: false,
        }
    }

    /// Declare `list` as the template source: a pull-only clone origin that
    /// never receives delete calls when its items are dragged elsewhere.
    pub fn with_template_list(mut self, list: EntityId) -> Self {
        self.template_list = Some(list);
        self
    }

    /// Whether a save is currently in flight (re-renders are suppressed)
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Monotonic counter bumped on every failed operation. Consumers key their
    /// drag-surface DOM on this value, so a bump discards whatever state the
    /// drag library accumulated during the aborted drag.
    pub fn render_generation(&self) -> u64 {
        self.render_generation
    }

    /// Execute a drag/drop intent. Returns whether it fully succeeded.
    ///
    /// On failure the operation is reported through the notification sink and
    /// the render generation is bumped; mutations that already succeeded (e.g.
    /// a create whose uid never came back) are deliberately not rolled back.
    pub async fn save_todo(&mut self, intent: UpdateIntent) -> bool {
        let mut progress = SaveProgress::new();
        self.run_with_progress(intent, &mut progress).await
    }

    /// Same as [`Self::save_todo`], publishing Saving/Finished state changes to
    /// the given feedback channel.
    pub async fn save_todo_with_feedback(
        &mut self,
        intent: UpdateIntent,
        feedback: progress::FeedbackSender,
    ) -> bool {
        let mut progress = SaveProgress::new_with_feedback_channel(feedback);
        self.run_with_progress(intent, &mut progress).await
    }

    /// Delete an item. Runs through the same Saving/Idle machine as a save.
    pub async fn delete_todo(&mut self, item: &TodoItemWithEntity) -> bool {
        let mut progress = SaveProgress::new();
        self.begin(item.summary(), &mut progress);
        let result = self
            .host
            .delete_items(&item.entity_id, &[item.uid().to_string()])
            .await;
        self.finish(item.summary(), result, &mut progress).await
    }

    async fn run_with_progress(
        &mut self,
        intent: UpdateIntent,
        progress: &mut SaveProgress,
    ) -> bool {
        let summary = intent.item.summary().to_string();
        self.begin(&summary, progress);
        let result = self.run_save(intent, progress).await;
        self.finish(&summary, result, progress).await
    }

    fn begin(&mut self, summary: &str, progress: &mut SaveProgress) {
        progress.debug(&format!("Saving \"{}\"", summary));
        self.saving = true;
        self.store.mute();
        progress.feedback(SaveEvent::Saving { summary: summary.to_string() });
    }

    /// The single place user-visible error reporting happens. Always returns
    /// the controller to Idle.
    async fn finish(
        &mut self,
        summary: &str,
        result: Result<(), Box<dyn Error>>,
        progress: &mut SaveProgress,
    ) -> bool {
        if let Err(err) = result {
            progress.error(&format!("Unable to save \"{}\": {}", summary, err));
            self.render_generation += 1;
            self.notifications
                .notify(&format!("Failed to save \"{}\"", summary))
                .await;
        }
        self.saving = false;
        self.store.unmute();
        progress.feedback(SaveEvent::Finished { success: progress.is_success() });
        progress.is_success()
    }

    async fn run_save(
        &mut self,
        intent: UpdateIntent,
        progress: &mut SaveProgress,
    ) -> Result<(), Box<dyn Error>> {
        let source = intent.item.entity_id.clone();
        let target = intent.target_entity.clone();
        let moving = source != target;

        // Step 1: remove the item from its source list. Template items are a
        // pull-only clone origin, and an empty uid means the item was never
        // created anywhere, so neither gets a delete call.
        if moving && intent.item.todo.is_created() && self.template_list.as_ref() != Some(&source) {
            progress.debug(&format!("> Deleting \"{}\" from {}", intent.item.summary(), source));
            self.host
                .delete_items(&source, &[intent.item.uid().to_string()])
                .await?;
        }

        // Step 2: resolve the fully updated item
        let capabilities = self.host.capabilities(&target);
        let mut retargeted = intent.item.clone();
        retargeted.entity_id = target.clone();
        let actions = TodoActions { status: Some(intent.status), due: intent.due, urgent: None };
        let applied = apply_todo_actions(capabilities, &retargeted, &actions, self.clock.now());

        // Step 3: update in place, or create in the target list and wait for
        // the subscription feed to reveal the host-assigned uid
        let resolved_uid;
        if moving == false {
            let status_changed = intent.status != intent.item.status();
            if intent.due.is_some() || status_changed {
                progress.debug(&format!("> Updating \"{}\" in {}", intent.item.summary(), target));
                self.host.update_item(&target, &applied.item.todo).await?;
            }
            resolved_uid = intent.item.uid().to_string();
        } else {
            progress.debug(&format!("> Creating \"{}\" in {}", intent.item.summary(), target));
            self.host
                .create_item(&target, &NewTodo::from(&applied.item.todo))
                .await?;
            let uid = self.recover_uid(&target, &applied.item.todo, progress).await?;

            // The host cannot create items that are already completed, so the
            // completion is a second update once the uid is known
            if applied.item.status().is_completed() {
                let mut completed = applied.item.todo.clone();
                completed.uid = uid.clone();
                progress.debug(&format!("> Completing the new \"{}\"", completed.summary));
                self.host.update_item(&target, &completed).await?;
            }
            resolved_uid = uid;
        }

        if applied.completed {
            let mut final_item = applied.item.clone();
            final_item.todo.uid = resolved_uid.clone();
            self.host.fire_completion_event(&final_item).await?;
        }

        // Step 4: reorder, if the drop requested a position
        match &intent.placement {
            Placement::Keep => {}
            Placement::First => {
                progress.debug(&format!("> Moving {} to the front of {}", resolved_uid, target));
                self.host.move_item(&target, &resolved_uid, None).await?;
            }
            Placement::After(previous_uid) => {
                progress.debug(&format!("> Moving {} after {} in {}", resolved_uid, previous_uid, target));
                self.host
                    .move_item(&target, &resolved_uid, Some(previous_uid))
                    .await?;
            }
        }

        Ok(())
    }

    /// Poll the latest subscription snapshot of `list` until the item we just
    /// created shows up, and return its host-assigned uid.
    ///
    /// This is the only retry logic in the crate: a fixed number of attempts
    /// with linear backoff, then a terminal error. The created item is matched
    /// on summary, description, and normalized due timestamp; it must still be
    /// NeedsAction (freshly created items always are).
    async fn recover_uid(
        &self,
        list: &EntityId,
        expected: &TodoItem,
        progress: &mut SaveProgress,
    ) -> Result<String, Box<dyn Error>> {
        let expected_due = compute_due_timestamp(expected);

        for attempt in 1..=UID_RECOVERY_ATTEMPTS {
            self.delay.sleep(UID_RECOVERY_BACKOFF_STEP * attempt).await;

            let snapshot = self.store.snapshot(list);
            let found = snapshot.iter().find(|candidate| {
                candidate.todo.is_created()
                    && candidate.status() == TodoStatus::NeedsAction
                    && candidate.todo.summary == expected.summary
                    && candidate.todo.description == expected.description
                    && compute_due_timestamp(&candidate.todo) == expected_due
            });
            match found {
                Some(found) => {
                    progress.debug(&format!(
                        "Recovered uid {} for \"{}\" after {} poll(s)",
                        found.uid(), expected.summary, attempt
                    ));
                    return Ok(found.uid().to_string());
                }
                None => progress.debug(&format!(
                    "\"{}\" not in the {} snapshot yet (attempt {}/{})",
                    expected.summary, list, attempt, UID_RECOVERY_ATTEMPTS
                )),
            }
        }

        Err(format!(
            "The host never confirmed the new item \"{}\" in {}",
            expected.summary, list
        )
        .into())
    }
}
