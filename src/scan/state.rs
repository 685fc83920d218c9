// SPDX-License-Identifier: GPL-3.0-only

//! Scan session state and its change notifications
//!
//! [`StateHolder`] wraps a `tokio::sync::watch` channel. Writers mutate the
//! state through [`StateHolder::update`]; the UI either takes snapshots or
//! subscribes and reacts when a change is published.

use tokio::sync::watch;

/// State of one scanner screen session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState {
    /// Whether detection events may start a new result cycle
    pub is_scanning: bool,
    /// Content of the most recent valid detection
    pub last_result: String,
    /// A result dialog is pending
    pub presenting: bool,
    /// Outcome of the latest permission check (`None` until checked)
    pub has_permission: Option<bool>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            is_scanning: true,
            last_result: String::new(),
            presenting: false,
            has_permission: None,
        }
    }
}

/// Observable holder for [`ScanState`]
#[derive(Debug)]
pub struct StateHolder {
    sender: watch::Sender<ScanState>,
}

impl Default for StateHolder {
    fn default() -> Self {
        Self::new(ScanState::default())
    }
}

impl StateHolder {
    pub fn new(initial: ScanState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ScanState {
        self.sender.borrow().clone()
    }

    /// Receiver that is notified on every published change
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.sender.subscribe()
    }

    /// Mutate the state atomically.
    ///
    /// The closure returns whether it changed anything; subscribers are only
    /// notified when it did. The return value is passed through.
    pub fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut ScanState) -> bool,
    {
        self.sender.send_if_modified(modify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_scanning() {
        let state = ScanState::default();
        assert!(state.is_scanning);
        assert!(state.last_result.is_empty());
        assert!(!state.presenting);
        assert_eq!(state.has_permission, None);
    }

    #[test]
    fn test_update_notifies_only_on_change() {
        let holder = StateHolder::default();
        let mut rx = holder.subscribe();
        rx.mark_unchanged();

        assert!(!holder.update(|_| false));
        assert!(!rx.has_changed().unwrap());

        assert!(holder.update(|s| {
            s.last_result = "hello".to_string();
            true
        }));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().last_result, "hello");
    }

    #[test]
    fn test_update_without_subscribers_still_applies() {
        let holder = StateHolder::default();
        holder.update(|s| {
            s.is_scanning = false;
            true
        });
        assert!(!holder.snapshot().is_scanning);
    }
}
