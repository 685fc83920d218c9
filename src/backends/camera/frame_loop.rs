// SPDX-License-Identifier: GPL-3.0-only
//! Background loop threads
//!
//! Frame sources and the terminal input reader run on plain threads that
//! must stop when their screen goes away. [`CaptureLoopController`] owns such
//! a thread together with its stop signal and joins it on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Returned by a loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Stop,
}

/// Owns a named loop thread and its stop signal
pub struct CaptureLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl CaptureLoopController {
    /// Call `loop_fn` repeatedly until it returns [`LoopAction::Stop`] or the
    /// controller is stopped.
    pub fn start<F>(name: &str, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        Self::spawn(name, move |stop| {
            while !stop.load(Ordering::SeqCst) {
                if loop_fn() == LoopAction::Stop {
                    break;
                }
            }
        })
    }

    /// Like [`start`](Self::start), with state created on the loop thread.
    ///
    /// If `init_fn` fails the thread exits without running the loop.
    pub fn start_with_init<S, I, F>(name: &str, init_fn: I, mut loop_fn: F) -> Self
    where
        S: Send + 'static,
        I: FnOnce() -> Result<S, String> + Send + 'static,
        F: FnMut(&mut S) -> LoopAction + Send + 'static,
    {
        let loop_name = name.to_string();
        Self::spawn(name, move |stop| {
            let mut state = match init_fn() {
                Ok(s) => s,
                Err(e) => {
                    warn!(name = %loop_name, error = %e, "Loop initialization failed");
                    return;
                }
            };

            while !stop.load(Ordering::SeqCst) {
                if loop_fn(&mut state) == LoopAction::Stop {
                    break;
                }
            }
        })
    }

    /// Run `body` on a new thread. `body` polls the stop signal itself; use
    /// this when the loop holds borrows that cannot live in a state value.
    pub fn spawn<B>(name: &str, body: B) -> Self
    where
        B: FnOnce(&AtomicBool) + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_signal);
        let thread_name = name.to_string();

        info!(name = %name, "Starting loop thread");

        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                body(&thread_stop);
                debug!(name = %thread_name, "Loop thread exiting");
            });

        let thread_handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(name = %name, error = %e, "Failed to spawn loop thread");
                None
            }
        };

        Self {
            thread_handle,
            stop_signal,
            name: name.to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Signal the loop to stop and wait for the thread
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread without signalling it
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            warn!(name = %self.name, "Loop thread panicked: {:?}", e);
        }
    }
}

/// Counts consecutive failures of a capture loop.
///
/// Each failure sleeps for the backoff so a lost device does not spin.
#[derive(Debug, Clone)]
pub struct ErrorStreak {
    count: u32,
    limit: u32,
    backoff: Duration,
}

impl ErrorStreak {
    pub fn new(limit: u32, backoff: Duration) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
            backoff,
        }
    }

    /// Record a failure and back off. Returns [`LoopAction::Stop`] once the
    /// limit is reached.
    pub fn fail(&mut self) -> LoopAction {
        self.count += 1;
        if self.count >= self.limit {
            return LoopAction::Stop;
        }
        thread::sleep(self.backoff);
        LoopAction::Continue
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;
    use std::time::Instant;

    #[test]
    fn test_loop_stops_itself() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = CaptureLoopController::start("test-loop", move || {
            let count = counter_clone.fetch_add(1, Ordering::SeqCst);
            if count >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        });

        controller.join();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = CaptureLoopController::start("test-loop", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            LoopAction::Continue
        });

        thread::sleep(Duration::from_millis(50));
        controller.stop();
        assert!(counter.load(Ordering::SeqCst) > 0);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_init_failure_skips_loop() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        let mut controller = CaptureLoopController::start_with_init(
            "test-fail-init",
            || Err::<(), _>("no frames".to_string()),
            move |_: &mut ()| {
                ran_clone.store(true, Ordering::SeqCst);
                LoopAction::Stop
            },
        );

        controller.join();
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_spawn_sees_stop_signal() {
        let mut controller = CaptureLoopController::spawn("test-spawn", |stop| {
            while !stop.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
        });

        assert!(controller.is_running());
        controller.stop();
        assert!(!controller.is_running());
    }

    #[test]
    fn test_thread_carries_loop_name() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);

        let mut controller = CaptureLoopController::spawn("v4l2-capture", move |_| {
            *seen_clone.lock().unwrap() = thread::current().name().map(str::to_string);
        });

        controller.join();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("v4l2-capture"));
    }

    #[test]
    fn test_error_streak_stops_at_limit() {
        let mut streak = ErrorStreak::new(3, Duration::from_millis(1));
        assert_eq!(streak.fail(), LoopAction::Continue);
        assert_eq!(streak.fail(), LoopAction::Continue);
        assert_eq!(streak.fail(), LoopAction::Stop);
        assert_eq!(streak.count(), 3);
    }

    #[test]
    fn test_error_streak_reset_and_backoff() {
        let mut streak = ErrorStreak::new(2, Duration::from_millis(20));
        let started = Instant::now();
        assert_eq!(streak.fail(), LoopAction::Continue);
        assert!(started.elapsed() >= Duration::from_millis(20));

        streak.reset();
        assert_eq!(streak.count(), 0);
        assert_eq!(streak.fail(), LoopAction::Continue);
        assert_eq!(streak.fail(), LoopAction::Stop);
    }
}
