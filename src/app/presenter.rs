// SPDX-License-Identifier: GPL-3.0-only

//! Modal message presentation
//!
//! A presentation resolves when the user dismisses it. The terminal UI hosts
//! dialogs through [`DialogPresenter`]; headless commands print through
//! [`ConsolePresenter`].

use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Surface that shows a message and waits for the user to acknowledge it
pub trait Presenter: Send + Sync {
    fn display_message(
        &self,
        title: &str,
        body: &str,
        dismiss_label: &str,
    ) -> impl Future<Output = ()> + Send;
}

/// A dialog waiting to be shown by the terminal UI
#[derive(Debug)]
pub struct DialogRequest {
    pub title: String,
    pub body: String,
    pub dismiss_label: String,
    done: oneshot::Sender<()>,
}

impl DialogRequest {
    /// Resolve the awaiting presentation
    pub fn dismiss(self) {
        // The awaiting side may have timed out already
        let _ = self.done.send(());
    }

    /// Nobody awaits this dialog anymore (timed out or cancelled)
    pub fn is_abandoned(&self) -> bool {
        self.done.is_closed()
    }
}

/// Forwards presentations to the terminal UI over a channel
#[derive(Debug, Clone)]
pub struct DialogPresenter {
    requests: mpsc::UnboundedSender<DialogRequest>,
}

impl DialogPresenter {
    pub fn new(requests: mpsc::UnboundedSender<DialogRequest>) -> Self {
        Self { requests }
    }

    /// Presenter and the receiving end the UI drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DialogRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Presenter for DialogPresenter {
    async fn display_message(&self, title: &str, body: &str, dismiss_label: &str) {
        let (done, dismissed) = oneshot::channel();
        let request = DialogRequest {
            title: title.to_string(),
            body: body.to_string(),
            dismiss_label: dismiss_label.to_string(),
            done,
        };

        if self.requests.send(request).is_err() {
            warn!(title, "Dialog host is gone, message not shown");
            return;
        }

        // An error means the UI dropped the dialog, which also ends it
        let _ = dismissed.await;
        debug!(title, "Dialog dismissed");
    }
}

/// Prints messages to stdout, optionally waiting for Enter
#[derive(Debug, Clone, Default)]
pub struct ConsolePresenter {
    wait_for_enter: bool,
}

impl ConsolePresenter {
    pub fn new(wait_for_enter: bool) -> Self {
        Self { wait_for_enter }
    }
}

impl Presenter for ConsolePresenter {
    async fn display_message(&self, title: &str, body: &str, dismiss_label: &str) {
        println!("{}", title);
        println!("  {}", body);

        if !self.wait_for_enter {
            return;
        }

        print!("[{}] ", dismiss_label);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = stdin.read_line(&mut line).await {
            warn!(error = %e, "Failed to read dismissal from stdin");
        }
    }
}
