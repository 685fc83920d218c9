// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for screen navigation and display converters

use qrreader::app::converters::{BoolToScanTextConverter, ValueConverter};
use qrreader::app::navigation::{Navigator, Screen};
use qrreader::constants::routes;
use qrreader::errors::{AppError, ConversionError};

#[test]
fn test_scanner_round_trip() {
    let mut nav = Navigator::default();

    assert_eq!(nav.go_to("QrScannerPage").unwrap(), Screen::QrScanner);
    assert_eq!(nav.go_to("..").unwrap(), Screen::Main);
    assert_eq!(nav.current(), Screen::Main);
}

#[test]
fn test_go_back_at_root_is_noop() {
    let mut nav = Navigator::default();
    assert_eq!(nav.go_back(), None);
    assert_eq!(nav.current(), Screen::Main);

    nav.go_to(routes::QR_SCANNER).unwrap();
    assert_eq!(nav.go_back(), Some(Screen::QrScanner));
    assert_eq!(nav.go_back(), None);
}

#[test]
fn test_unknown_route_errors() {
    let mut nav = Navigator::default();
    assert!(matches!(nav.go_to("Nowhere"), Err(AppError::Navigation(_))));
}

#[test]
fn test_screen_titles() {
    assert_eq!(Screen::Main.title(), "QR Code Reader");
    assert_eq!(Screen::QrScanner.title(), "Scan QR Code");
}

#[test]
fn test_scan_text_converter() {
    let converter = BoolToScanTextConverter;
    assert_eq!(converter.convert(Some(true)), "Pause");
    assert_eq!(converter.convert(Some(false)), "Resume");
    assert_eq!(converter.convert(None), "Scan");

    assert!(matches!(
        converter.convert_back("Resume".to_string()),
        Err(ConversionError::NotSupported { .. })
    ));
}
