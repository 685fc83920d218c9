// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis
//!
//! Frames are sampled from the latest-frame channel at an interval and
//! analysed off the UI loop. QR detection is the only task.

pub mod tasks;
pub mod types;

pub use tasks::QrDetector;
pub use types::FrameRegion;
