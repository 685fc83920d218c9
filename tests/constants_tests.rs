// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use qrreader::constants::{actions, detection, routes, timing};

#[test]
fn test_routes_are_distinct() {
    assert_ne!(routes::MAIN, routes::QR_SCANNER);
    assert_eq!(routes::BACK, "..");
}

#[test]
fn test_action_names_are_unique() {
    let mut names = vec![
        actions::NAVIGATE_TO_SCANNER,
        actions::TOGGLE_SCANNING,
        actions::GO_BACK,
        actions::CHECK_PERMISSIONS,
        actions::QUIT,
    ];
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 5);
}

#[test]
fn test_input_poll_is_shorter_than_detection_interval() {
    // Key presses must not wait on detection pacing
    assert!(timing::INPUT_POLL.as_millis() < detection::DEFAULT_INTERVAL_MS as u128);
}

#[test]
fn test_lost_device_is_given_up_within_seconds() {
    use qrreader::constants::devices;
    let window = timing::CAPTURE_ERROR_BACKOFF * devices::MAX_CAPTURE_ERRORS;
    assert!(window.as_secs() >= 1);
    assert!(window.as_secs() <= 10);
}
