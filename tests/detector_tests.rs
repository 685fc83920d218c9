// SPDX-License-Identifier: GPL-3.0-only

//! Decoding real QR images through the frame detector

use qrreader::app::frame_processor::{FrameRegion, QrDetector};
use qrreader::backends::camera::image_source::load_frame;
use qrreader::scan::SymbolFormat;
use std::path::PathBuf;
use std::sync::Arc;

/// 320x240 grey image with a version 1 code at (160, 60), 6 px per module
const PAYLOAD: &str = "https://qr.rs/ok";

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/qr_https.png")
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.05,
        "expected about {}, got {}",
        expected,
        actual
    );
}

fn assert_region(bounds: &FrameRegion) {
    for v in [bounds.x, bounds.y, bounds.width, bounds.height] {
        assert!((0.0..=1.0).contains(&v), "{:?} leaves the frame", bounds);
    }
    assert!(bounds.x + bounds.width <= 1.0 + f32::EPSILON);
    assert!(bounds.y + bounds.height <= 1.0 + f32::EPSILON);

    // 21 modules * 6 px = 126 px
    assert_near(bounds.x, 160.0 / 320.0);
    assert_near(bounds.y, 60.0 / 240.0);
    assert_near(bounds.width, 126.0 / 320.0);
    assert_near(bounds.height, 126.0 / 240.0);
}

#[test]
fn test_decodes_fixture_at_full_size() {
    let frame = load_frame(&fixture()).unwrap();
    assert_eq!((frame.width, frame.height), (320, 240));

    let event = QrDetector::new().detect_blocking(&frame);

    assert_eq!(event.results.len(), 1);
    let candidate = &event.results[0];
    assert_eq!(candidate.value, PAYLOAD);
    assert_eq!(candidate.format, SymbolFormat::QrCode { version: 1 });
    assert_region(candidate.bounds.as_ref().unwrap());
}

#[test]
fn test_decodes_fixture_when_downscaled() {
    let frame = load_frame(&fixture()).unwrap();

    // Half size: 3 px per module
    let event = QrDetector::with_max_dimension(160).detect_blocking(&frame);

    assert_eq!(event.results.len(), 1);
    let candidate = &event.results[0];
    assert_eq!(candidate.value, PAYLOAD);
    // Bounds are reported against the original frame, not the downscaled one
    assert_region(candidate.bounds.as_ref().unwrap());
}

#[tokio::test]
async fn test_async_detect_matches_blocking() {
    let frame = Arc::new(load_frame(&fixture()).unwrap());
    let detector = QrDetector::new();

    let event = detector.detect(Arc::clone(&frame)).await;

    assert_eq!(event, detector.detect_blocking(&frame));
    assert_eq!(event.results[0].value, PAYLOAD);
}
