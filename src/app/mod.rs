// SPDX-License-Identifier: GPL-3.0-only

//! Application layer: screens, actions, presentation, and frame analysis
//!
//! The terminal UI in [`crate::terminal`] owns the event loop and wires these
//! pieces to a [`crate::scan::ScanSessionController`].

pub mod actions;
pub mod converters;
pub mod frame_processor;
pub mod navigation;
pub mod presenter;

pub use actions::{ActionFn, ActionRegistry};
pub use converters::{BoolToScanTextConverter, ValueConverter};
pub use navigation::{Navigator, RouteTable, Screen};
pub use presenter::{ConsolePresenter, DialogPresenter, DialogRequest, Presenter};
