//! Cross-widget popup coordination
//!
//! Several widgets need to know whether a popup is currently covering the
//! dashboard (e.g. to hold off opening another one). Instead of a page-global
//! mutable flag, instances share one cloneable coordinator object and await
//! its state explicitly.

use tokio::sync::watch;

/// Tracks whether a popup is currently open somewhere on the dashboard.
///
/// Clones share state: every widget gets a clone of the same coordinator.
#[derive(Clone, Debug)]
pub struct PopupCoordinator {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl PopupCoordinator {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Record that a popup opened or closed
    pub fn set_open(&self, open: bool) {
        let _ = self.tx.send(open);
    }

    pub fn is_open(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve as soon as no popup is open (immediately, if none is)
    pub async fn wait_until_clear(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|open| *open == false).await;
    }
}

impl Default for PopupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
