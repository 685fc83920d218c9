// SPDX-License-Identifier: GPL-3.0-only

//! Headless commands
//!
//! - Decoding image files through the scan session
//! - Checking camera permission
//! - Listing video devices

use qrreader::app::frame_processor::QrDetector;
use qrreader::app::presenter::ConsolePresenter;
use qrreader::backends::camera::image_source::load_frame;
use qrreader::backends::camera::v4l2_utils;
use qrreader::config::Config;
use qrreader::constants::devices;
use qrreader::fl;
use qrreader::permissions::{FixedPermission, PermissionStatus, PlatformPermission};
use qrreader::scan::{DetectionOutcome, ScanSessionController, SessionOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Decode each image and present the first QR code found in it
pub fn scan_images(
    config: &Config,
    paths: &[PathBuf],
    wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let detector = QrDetector::with_max_dimension(config.max_dimension);

    runtime.block_on(async {
        // Image files need no camera access
        let controller = ScanSessionController::new(
            FixedPermission(PermissionStatus::Granted),
            Arc::new(ConsolePresenter::new(wait)),
            SessionOptions {
                presentation_timeout: config.presentation_timeout(),
            },
        );
        let mut state = controller.subscribe();

        for path in paths {
            let frame = load_frame(path)?;
            let event = detector.detect_blocking(&frame);

            match controller.on_detection(&event) {
                DetectionOutcome::Presented => {
                    // One result at a time: wait until scanning resumes
                    state.wait_for(|s| !s.presenting).await?;
                }
                DetectionOutcome::Empty | DetectionOutcome::Invalid => {
                    println!(
                        "{}",
                        fl!("no-qr-found", path = path.display().to_string())
                    );
                }
                DetectionOutcome::Suspended => {
                    tracing::warn!(path = %path.display(), "Scanning suspended, result skipped");
                }
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Run the configured permission gate and report the outcome
pub fn check_permission(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;

    let granted = runtime.block_on(async {
        let controller = ScanSessionController::new(
            PlatformPermission::from_kind(config.permission_backend),
            Arc::new(ConsolePresenter::new(false)),
            SessionOptions::default(),
        );
        controller.request_permission().await
    });

    if granted {
        println!("{}", fl!("permission-granted"));
    } else {
        println!("{}", fl!("permission-denied"));
    }

    Ok(())
}

/// List all video capture devices
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let devices = v4l2_utils::list_devices(Path::new(devices::DEV_DIR));

    if devices.is_empty() {
        println!("{}", fl!("no-cameras"));
        return Ok(());
    }

    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {}", index, device.card);
        println!("      Path: {}", device.path);
        println!("      Driver: {}", device.driver);
    }

    Ok(())
}
