// SPDX-License-Identifier: GPL-3.0-only

//! QR Reader - scan QR codes from a camera or image files
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`scan`]: Scan session controller, state, and detection events
//! - [`permissions`]: Camera permission gate and its platform backends
//! - [`app`]: Navigation, actions, presenters, and frame analysis
//! - [`backends`]: Frame sources and video device discovery
//! - [`terminal`]: Terminal user interface
//! - [`config`]: User configuration handling
//! - [`logging`]: Tracing subscriber setup
//!
//! # Example
//!
//! ```ignore
//! // Interactive scanner in the terminal:
//! // qrreader terminal --image code.png
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod logging;
pub mod permissions;
pub mod scan;
pub mod terminal;

// Re-export commonly used types
pub use app::frame_processor::{FrameRegion, QrDetector};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use permissions::{CameraPermission, PermissionStatus, PlatformPermission};
pub use scan::{DetectionEvent, DetectionOutcome, ScanSessionController, ScanState, SessionOptions};
