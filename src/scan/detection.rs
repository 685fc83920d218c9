// SPDX-License-Identifier: GPL-3.0-only

//! Detection events delivered by the decoder

use crate::app::frame_processor::FrameRegion;

/// Symbology of a decoded candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFormat {
    /// QR code with its symbol version (1-40)
    QrCode { version: usize },
    /// Source did not report a format
    Unknown,
}

/// One decoded string from a frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeCandidate {
    /// Decoded text
    pub value: String,
    /// Symbology metadata (not consulted by the controller)
    pub format: SymbolFormat,
    /// Location in normalized frame coordinates, if known
    pub bounds: Option<FrameRegion>,
}

impl DecodeCandidate {
    /// Candidate carrying only a value
    pub fn from_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: SymbolFormat::Unknown,
            bounds: None,
        }
    }
}

/// Result of one decode attempt, in the order the decoder found them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionEvent {
    pub results: Vec<DecodeCandidate>,
}

impl DetectionEvent {
    pub fn new(results: Vec<DecodeCandidate>) -> Self {
        Self { results }
    }

    /// Event with no candidates
    pub fn empty() -> Self {
        Self::default()
    }

    /// Event built from plain values, in order
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            results: values.into_iter().map(DecodeCandidate::from_value).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The only candidate that matters: later ones are never consulted
    pub fn first(&self) -> Option<&DecodeCandidate> {
        self.results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_wins() {
        let event = DetectionEvent::from_values(["ABC123", "ZZZ"]);
        assert_eq!(event.first().map(|c| c.value.as_str()), Some("ABC123"));
    }

    #[test]
    fn test_empty_event() {
        let event = DetectionEvent::empty();
        assert!(event.is_empty());
        assert!(event.first().is_none());
    }
}
