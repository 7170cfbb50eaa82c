//! Utilities to track the progression of a save operation

use std::fmt::{Display, Error, Formatter};

/// An event that happens while a drag/drop intent is being saved
#[derive(Clone, Debug)]
pub enum SaveEvent {
    /// No save is in flight
    Idle,
    /// A save has started; re-renders are suppressed until it finishes
    Saving { summary: String },
    /// The save is finished (and re-renders resumed)
    Finished { success: bool },
}

impl Display for SaveEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            SaveEvent::Idle => write!(f, "Idle"),
            SaveEvent::Saving { summary } => write!(f, "Saving \"{}\"...", summary),
            SaveEvent::Finished { success } => match success {
                true => write!(f, "Saved"),
                false => write!(f, "Save failed"),
            },
        }
    }
}

impl Default for SaveEvent {
    fn default() -> Self {
        Self::Idle
    }
}

/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<SaveEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<SaveEvent>;

/// Create a feedback channel, that can be used to observe the state of the
/// save currently in flight (e.g. to disable drop targets while Saving)
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(SaveEvent::default())
}

/// Tracks the errors that happen during a save, and forwards state changes to
/// an optional listener
pub struct SaveProgress {
    n_errors: u32,
    feedback_channel: Option<FeedbackSender>,
}

impl SaveProgress {
    pub fn new() -> Self {
        Self { n_errors: 0, feedback_channel: None }
    }
    pub fn new_with_feedback_channel(channel: FeedbackSender) -> Self {
        Self { n_errors: 0, feedback_channel: Some(channel) }
    }

    pub fn is_success(&self) -> bool {
        self.n_errors == 0
    }

    /// Log an error
    pub fn error(&mut self, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&mut self, text: &str) {
        log::debug!("{}", text);
    }
    /// Send an event as a feedback to the listener (if any).
    pub fn feedback(&mut self, event: SaveEvent) {
        self.feedback_channel
            .as_ref()
            .map(|sender| sender.send(event));
    }
}

impl Default for SaveProgress {
    fn default() -> Self {
        Self::new()
    }
}
