// SPDX-License-Identifier: GPL-3.0-only

//! Scan-result lifecycle
//!
//! The controller gates detection events on the scanning flag. A valid
//! result suspends scanning in the same atomic update that records it, so a
//! burst of identical detections can only ever start one presentation. The
//! presentation runs as a spawned task; when it is dismissed (or times out)
//! scanning resumes.

use super::detection::DetectionEvent;
use super::state::{ScanState, StateHolder};
use super::validation::is_valid_content;
use crate::app::presenter::Presenter;
use crate::fl;
use crate::permissions::CameraPermission;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

/// Controller tuning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Resume scanning after this long even if the dialog is still open.
    /// `None` waits for dismissal.
    pub presentation_timeout: Option<Duration>,
}

/// Which branch a detection event took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// No candidates
    Empty,
    /// First candidate was blank
    Invalid,
    /// Valid, but scanning is paused or a result is already being presented
    Suspended,
    /// Scanning suspended and a presentation scheduled
    Presented,
}

/// Mediates between raw decode events and "one result at a time"
pub struct ScanSessionController<G, P> {
    permission: G,
    presenter: Arc<P>,
    state: Arc<StateHolder>,
    options: SessionOptions,
    pending_presentation: Mutex<Option<AbortHandle>>,
}

impl<G, P> ScanSessionController<G, P>
where
    G: CameraPermission,
    P: Presenter + 'static,
{
    pub fn new(permission: G, presenter: Arc<P>, options: SessionOptions) -> Self {
        Self {
            permission,
            presenter,
            state: Arc::new(StateHolder::default()),
            options,
            pending_presentation: Mutex::new(None),
        }
    }

    /// Snapshot of the session state
    pub fn state(&self) -> ScanState {
        self.state.snapshot()
    }

    /// Change notifications for the session state
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Run the permission gate. A denial is explained to the user.
    pub async fn request_permission(&self) -> bool {
        let granted = self.permission.check_and_request_camera_permission().await;

        self.state.update(|s| {
            let changed = s.has_permission != Some(granted);
            s.has_permission = Some(granted);
            changed
        });

        if granted {
            info!("Camera permission granted");
        } else {
            warn!("Camera permission denied");
            self.presenter
                .display_message(
                    &fl!("permission-title"),
                    &fl!("permission-body"),
                    &fl!("ok"),
                )
                .await;
        }

        granted
    }

    /// Handle one decode attempt.
    ///
    /// Must be called from within a Tokio runtime: the presentation is
    /// spawned onto it.
    pub fn on_detection(&self, event: &DetectionEvent) -> DetectionOutcome {
        let Some(candidate) = event.first() else {
            return DetectionOutcome::Empty;
        };

        if !is_valid_content(&candidate.value) {
            trace!("Ignoring blank detection");
            return DetectionOutcome::Invalid;
        }

        let content = candidate.value.clone();
        let claimed = self.state.update(|s| {
            if !s.is_scanning || s.presenting {
                return false;
            }
            s.last_result = content.clone();
            s.is_scanning = false;
            s.presenting = true;
            true
        });

        if !claimed {
            trace!("Detection while suspended, ignoring");
            return DetectionOutcome::Suspended;
        }

        info!(content_len = content.len(), "QR code scanned, scanning suspended");
        self.schedule_presentation(content);
        DetectionOutcome::Presented
    }

    /// Flip the scanning flag. Returns the new value.
    pub fn toggle_scanning(&self) -> bool {
        let mut now_scanning = false;
        self.state.update(|s| {
            s.is_scanning = !s.is_scanning;
            now_scanning = s.is_scanning;
            true
        });
        info!(scanning = now_scanning, "Scanning toggled");
        now_scanning
    }

    /// Cancel a pending presentation. Called when the screen closes.
    pub fn close(&self) {
        if let Ok(mut pending) = self.pending_presentation.lock()
            && let Some(handle) = pending.take()
            && !handle.is_finished()
        {
            debug!("Cancelling pending result presentation");
            handle.abort();
        }
    }

    fn schedule_presentation(&self, content: String) {
        let presenter = Arc::clone(&self.presenter);
        let state = Arc::clone(&self.state);
        let timeout = self.options.presentation_timeout;

        let title = fl!("scanned-title");
        let body = fl!("scanned-content", content = content);
        let dismiss = fl!("ok");

        let task = tokio::spawn(async move {
            let shown = presenter.display_message(&title, &body, &dismiss);

            match timeout {
                Some(limit) => {
                    if tokio::time::timeout(limit, shown).await.is_err() {
                        warn!(
                            timeout_secs = limit.as_secs(),
                            "Result presentation timed out"
                        );
                    }
                }
                None => shown.await,
            }

            state.update(|s| {
                s.presenting = false;
                s.is_scanning = true;
                true
            });
            debug!("Scanning resumed");
        });

        if let Ok(mut pending) = self.pending_presentation.lock() {
            *pending = Some(task.abort_handle());
        }
    }
}

impl<G, P> Drop for ScanSessionController<G, P> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending_presentation.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
    }
}
