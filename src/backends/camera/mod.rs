// SPDX-License-Identifier: GPL-3.0-only

//! Frame producers
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐
//! │ still images │  │  V4L2 device │ (feature "v4l2")
//! └──────┬───────┘  └──────┬───────┘
//!        └────────┬────────┘
//!                 ▼
//!      watch::Sender<Option<Arc<CameraFrame>>>   latest frame only
//!                 │
//!        ┌────────┴────────┐
//!        ▼                 ▼
//!   viewfinder        QR detector
//! ```
//!
//! Sources run on [`frame_loop::CaptureLoopController`] threads and stop when
//! the controller is dropped.

pub mod frame_loop;
pub mod image_source;
pub mod types;
#[cfg(feature = "v4l2")]
pub mod v4l2_capture;
pub mod v4l2_utils;

pub use frame_loop::{CaptureLoopController, LoopAction};
pub use types::*;

use crate::constants::timing;
use crate::errors::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Publishing side of the latest-frame channel
pub type FrameSender = watch::Sender<Option<Arc<CameraFrame>>>;

/// Receiving side of the latest-frame channel
pub type FrameReceiver = watch::Receiver<Option<Arc<CameraFrame>>>;

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// Image files shown in a cycle
    Images(Vec<PathBuf>),
    /// V4L2 device node
    Device(String),
}

/// Start the source and return its loop controller and the frame receiver
pub fn start_source(source: &FrameSource) -> AppResult<(CaptureLoopController, FrameReceiver)> {
    let (sender, receiver) = watch::channel(None);

    let controller = match source {
        FrameSource::Images(paths) => {
            let frames = image_source::load_frames(paths)?;
            image_source::start_image_sequence(
                frames,
                timing::IMAGE_HOLD,
                timing::CAPTURE_IDLE,
                sender,
            )
        }
        FrameSource::Device(path) => start_device(path, sender)?,
    };

    Ok((controller, receiver))
}

#[cfg(feature = "v4l2")]
fn start_device(path: &str, sender: FrameSender) -> AppResult<CaptureLoopController> {
    Ok(v4l2_capture::start_v4l2_capture(path.to_string(), sender))
}

#[cfg(not(feature = "v4l2"))]
fn start_device(path: &str, _sender: FrameSender) -> AppResult<CaptureLoopController> {
    Err(crate::errors::CameraError::BackendError(format!(
        "cannot open {}: built without the v4l2 feature",
        path
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_list_fails() {
        let result = start_source(&FrameSource::Images(Vec::new()));
        assert!(result.is_err());
    }
}
