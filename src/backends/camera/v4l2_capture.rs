// SPDX-License-Identifier: GPL-3.0-only

//! Live capture from a V4L2 device (feature `v4l2`)
//!
//! Negotiates YUYV at the preferred scanning size and falls back to MJPG,
//! which is decoded with the `image` crate. Frames are published to the
//! latest-frame channel; the detector and viewfinder sample from there.

use super::FrameSender;
use super::frame_loop::{CaptureLoopController, ErrorStreak, LoopAction};
use super::types::{CameraFrame, PixelFormat};
use crate::constants::{devices, timing};
use crate::errors::CameraError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Start capturing from `path` on a background thread
pub fn start_v4l2_capture(path: String, sender: FrameSender) -> CaptureLoopController {
    CaptureLoopController::spawn("v4l2-capture", move |stop| {
        if let Err(e) = run_capture(&path, stop, &sender) {
            error!(path = %path, error = %e, "V4L2 capture failed");
        }
    })
}

fn run_capture(path: &str, stop: &AtomicBool, sender: &FrameSender) -> Result<(), CameraError> {
    let dev = Device::with_path(path)
        .map_err(|e| CameraError::InitializationFailed(format!("{}: {}", path, e)))?;

    let fourcc_yuyv = FourCC::new(b"YUYV");
    let fourcc_mjpg = FourCC::new(b"MJPG");

    let format = Format::new(devices::CAPTURE_WIDTH, devices::CAPTURE_HEIGHT, fourcc_yuyv);
    let mut actual = dev
        .set_format(&format)
        .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

    if actual.fourcc != fourcc_yuyv {
        let format = Format::new(devices::CAPTURE_WIDTH, devices::CAPTURE_HEIGHT, fourcc_mjpg);
        actual = dev
            .set_format(&format)
            .map_err(|e| CameraError::InitializationFailed(e.to_string()))?;
    }

    if actual.fourcc != fourcc_yuyv && actual.fourcc != fourcc_mjpg {
        return Err(CameraError::InvalidFormat(format!(
            "device offers neither YUYV nor MJPG (got {})",
            actual.fourcc
        )));
    }

    info!(
        path,
        width = actual.width,
        height = actual.height,
        fourcc = %actual.fourcc,
        "V4L2 format configured"
    );

    let mut stream = Stream::with_buffers(&dev, Type::VideoCapture, 4)
        .map_err(|e| CameraError::BackendError(format!("Failed to create stream: {}", e)))?;

    let mut errors = ErrorStreak::new(devices::MAX_CAPTURE_ERRORS, timing::CAPTURE_ERROR_BACKOFF);

    while !stop.load(Ordering::SeqCst) {
        let (buf, meta) = match stream.next() {
            Ok(frame) => {
                errors.reset();
                frame
            }
            Err(e) => {
                warn!(error = %e, failures = errors.count() + 1, "Failed to capture frame");
                if errors.fail() == LoopAction::Stop {
                    return Err(CameraError::BackendError(format!(
                        "{} consecutive capture failures: {}",
                        devices::MAX_CAPTURE_ERRORS,
                        e
                    )));
                }
                continue;
            }
        };

        let payload = &buf[..(meta.bytesused as usize).min(buf.len())];
        let frame = if actual.fourcc == fourcc_yuyv {
            CameraFrame::new(
                actual.width,
                actual.height,
                actual.stride,
                PixelFormat::YUYV,
                payload.to_vec(),
            )
        } else {
            image::load_from_memory_with_format(payload, image::ImageFormat::Jpeg)
                .map_err(CameraError::from)
                .and_then(|image| CameraFrame::from_image(&image))
        };

        match frame {
            Ok(frame) => {
                sender.send_replace(Some(Arc::new(frame)));
            }
            Err(e) => warn!(error = %e, "Dropping undecodable frame"),
        }

        if sender.is_closed() {
            break;
        }
    }

    Ok(())
}
