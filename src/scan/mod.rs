// SPDX-License-Identifier: GPL-3.0-only

//! Scan session: state, detection events, and the controller tying them to
//! the permission gate and the presenter.

pub mod controller;
pub mod detection;
pub mod state;
pub mod validation;

pub use controller::{DetectionOutcome, ScanSessionController, SessionOptions};
pub use detection::{DecodeCandidate, DetectionEvent, SymbolFormat};
pub use state::{ScanState, StateHolder};
pub use validation::is_valid_content;
