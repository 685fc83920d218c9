// SPDX-License-Identifier: GPL-3.0-only

//! Display converters between state values and UI text

use crate::errors::ConversionError;
use crate::fl;

/// One-way or two-way mapping between a state value and its display form
pub trait ValueConverter {
    type Source;
    type Target;

    fn convert(&self, value: Self::Source) -> Self::Target;

    fn convert_back(&self, value: Self::Target) -> Result<Self::Source, ConversionError>;
}

/// Label for the scan toggle: "Pause" while scanning, "Resume" while paused,
/// "Scan" before any state exists
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolToScanTextConverter;

impl ValueConverter for BoolToScanTextConverter {
    type Source = Option<bool>;
    type Target = String;

    fn convert(&self, value: Option<bool>) -> String {
        match value {
            Some(true) => fl!("pause"),
            Some(false) => fl!("resume"),
            None => fl!("scan"),
        }
    }

    fn convert_back(&self, _value: String) -> Result<Option<bool>, ConversionError> {
        Err(ConversionError::NotSupported {
            converter: "BoolToScanTextConverter",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert() {
        let converter = BoolToScanTextConverter;
        assert_eq!(converter.convert(Some(true)), "Pause");
        assert_eq!(converter.convert(Some(false)), "Resume");
        assert_eq!(converter.convert(None), "Scan");
    }

    #[test]
    fn test_convert_back_not_supported() {
        let converter = BoolToScanTextConverter;
        let err = converter.convert_back("Pause".to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::NotSupported { .. }));
    }
}
