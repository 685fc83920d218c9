// SPDX-License-Identifier: GPL-3.0-only

//! Still images as a frame source
//!
//! Images are decoded once up front. The loop publishes them in turn, holding
//! each for a fixed period, and starts over after the last one.

use super::FrameSender;
use super::frame_loop::{CaptureLoopController, LoopAction};
use super::types::CameraFrame;
use crate::errors::{AppResult, CameraError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Decode an image file into a frame
pub fn load_frame(path: &Path) -> Result<CameraFrame, CameraError> {
    let image = image::open(path)
        .map_err(|e| CameraError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Loaded image");
    CameraFrame::from_image(&image)
}

/// Load every image, failing on the first unreadable one
pub fn load_frames(paths: &[PathBuf]) -> AppResult<Vec<CameraFrame>> {
    if paths.is_empty() {
        return Err(CameraError::NoCameraFound.into());
    }
    paths
        .iter()
        .map(|path| load_frame(path).map_err(Into::into))
        .collect()
}

struct Sequence {
    frames: Vec<CameraFrame>,
    index: usize,
    shown_at: Option<Instant>,
}

/// Publish `frames` in a cycle, `hold` per image, `idle` between checks
pub fn start_image_sequence(
    frames: Vec<CameraFrame>,
    hold: Duration,
    idle: Duration,
    sender: FrameSender,
) -> CaptureLoopController {
    info!(count = frames.len(), hold_ms = hold.as_millis(), "Starting image sequence");

    CaptureLoopController::start_with_init(
        "image-sequence",
        move || {
            if frames.is_empty() {
                return Err("no images to show".to_string());
            }
            Ok(Sequence {
                frames,
                index: 0,
                shown_at: None,
            })
        },
        move |seq| {
            let due = seq.shown_at.is_none_or(|at| at.elapsed() >= hold);
            if due {
                if seq.shown_at.is_some() {
                    seq.index = (seq.index + 1) % seq.frames.len();
                }
                let mut frame = seq.frames[seq.index].clone();
                frame.captured_at = Instant::now();
                sender.send_replace(Some(Arc::new(frame)));
                seq.shown_at = Some(Instant::now());
            }

            if sender.is_closed() {
                return LoopAction::Stop;
            }

            std::thread::sleep(idle);
            LoopAction::Continue
        },
    )
}
