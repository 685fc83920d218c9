// SPDX-License-Identifier: GPL-3.0-only

//! Backend layer: frame sources and device discovery
//!
//! Decoding and rendering never touch hardware directly; they consume frames
//! published by [`camera`].

pub mod camera;
