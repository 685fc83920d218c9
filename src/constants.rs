// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier, also used as the config directory name
pub const APP_ID: &str = "qrreader";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Log file name inside the state directory
pub const LOG_FILE_NAME: &str = "qrreader.log";

/// Route names used by the navigator
pub mod routes {
    /// Landing screen
    pub const MAIN: &str = "MainPage";
    /// Scanner screen
    pub const QR_SCANNER: &str = "QrScannerPage";
    /// Pops the current screen
    pub const BACK: &str = "..";
}

/// Named UI actions bound to keys
pub mod actions {
    pub const NAVIGATE_TO_SCANNER: &str = "navigate-to-scanner";
    pub const TOGGLE_SCANNING: &str = "toggle-scanning";
    pub const GO_BACK: &str = "go-back";
    pub const CHECK_PERMISSIONS: &str = "check-permissions";
    pub const QUIT: &str = "quit";
}

/// Frame processing defaults
pub mod detection {
    /// Frames are downscaled to this maximum dimension before decoding.
    /// QR codes held up to a camera survive this comfortably.
    pub const DEFAULT_MAX_DIMENSION: u32 = 640;

    /// Minimum time between two detection attempts (milliseconds)
    pub const DEFAULT_INTERVAL_MS: u64 = 250;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// UI redraw tick (~60 FPS)
    pub const UI_TICK: Duration = Duration::from_millis(16);

    /// Input polling timeout for the terminal event thread
    pub const INPUT_POLL: Duration = Duration::from_millis(50);

    /// Default time a result dialog may stay open before scanning resumes
    pub const DEFAULT_PRESENTATION_TIMEOUT_SECS: u64 = 120;

    /// How long the image sequence source shows each image
    pub const IMAGE_HOLD: Duration = Duration::from_secs(2);

    /// Sleep granularity of capture loops that pace themselves
    pub const CAPTURE_IDLE: Duration = Duration::from_millis(33);

    /// Pause after a failed capture before the device is polled again
    pub const CAPTURE_ERROR_BACKOFF: Duration = Duration::from_millis(100);
}

/// Device discovery
pub mod devices {
    /// Directory scanned for video nodes
    pub const DEV_DIR: &str = "/dev";

    /// File name prefix of V4L2 capture nodes
    pub const VIDEO_NODE_PREFIX: &str = "video";

    /// Preferred capture size for scanning
    pub const CAPTURE_WIDTH: u32 = 640;
    pub const CAPTURE_HEIGHT: u32 = 480;

    /// Consecutive capture failures before a device is given up
    pub const MAX_CAPTURE_ERRORS: u32 = 30;
}
