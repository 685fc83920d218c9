// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Converts camera frames to luma, downscales them for speed, and hands them
//! to `rqrr` for grid detection and decoding. The result is a
//! [`DetectionEvent`] with candidates in the order `rqrr` found them.

use crate::app::frame_processor::types::FrameRegion;
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection;
use crate::scan::detection::{DecodeCandidate, DetectionEvent, SymbolFormat};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Cheap to clone; the work happens on a blocking task per call.
#[derive(Debug, Clone, Copy)]
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: detection::DEFAULT_MAX_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Detect QR codes without blocking the async runtime
    pub async fn detect(&self, frame: Arc<CameraFrame>) -> DetectionEvent {
        let max_dim = self.max_dimension;

        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                DetectionEvent::empty()
            })
    }

    /// Detect QR codes on the calling thread
    pub fn detect_blocking(&self, frame: &CameraFrame) -> DetectionEvent {
        detect_sync(frame, self.max_dimension)
    }
}

/// Luma plane ready for detection
struct LumaImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> DetectionEvent {
    let start = std::time::Instant::now();

    let (luma, scale) = if frame.width > max_dimension || frame.height > max_dimension {
        let scale = (frame.width as f32 / max_dimension as f32)
            .max(frame.height as f32 / max_dimension as f32);
        let width = ((frame.width as f32 / scale) as u32).max(1);
        let height = ((frame.height as f32 / scale) as u32).max(1);
        (downscale_luma(frame, width, height), scale)
    } else {
        (extract_luma(frame), 1.0)
    };

    trace!(
        width = luma.width,
        height = luma.height,
        scale,
        conversion_ms = start.elapsed().as_millis(),
        "Prepared luma image"
    );

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(luma.width, luma.height, |x, y| {
            luma.data[y * luma.width + x]
        });
    let grids = prepared.detect_grids();

    let mut results = Vec::with_capacity(grids.len());
    for grid in grids {
        let (meta, content) = match grid.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR grid");
                continue;
            }
        };

        // Corners back in original frame pixels
        let corners: Vec<(i32, i32)> = grid
            .bounds
            .iter()
            .map(|p| ((p.x as f32 * scale) as i32, (p.y as f32 * scale) as i32))
            .collect();
        let bounds = FrameRegion::from_corners(&corners, frame.width, frame.height);

        debug!(
            content_len = content.len(),
            version = meta.version.0,
            x = bounds.x,
            y = bounds.y,
            "Decoded QR code"
        );

        results.push(DecodeCandidate {
            value: content,
            format: SymbolFormat::QrCode {
                version: meta.version.0,
            },
            bounds: Some(bounds),
        });
    }

    if !results.is_empty() {
        debug!(
            count = results.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    DetectionEvent::new(results)
}

/// Luma plane at full resolution, without stride padding
fn extract_luma(frame: &CameraFrame) -> LumaImage {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let mut data = Vec::with_capacity(width * height);

    for y in 0..frame.height {
        for x in 0..frame.width {
            data.push(frame.luma_at(x, y));
        }
    }

    LumaImage {
        width,
        height,
        data,
    }
}

/// Downscale to `dst_width` x `dst_height` luma using bilinear interpolation
fn downscale_luma(frame: &CameraFrame, dst_width: u32, dst_height: u32) -> LumaImage {
    let src_width = frame.width;
    let src_height = frame.height;

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let mut data = Vec::with_capacity((dst_width * dst_height) as usize);

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as u32;
            let y0 = src_y as u32;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let p00 = frame.luma_at(x0, y0) as f32;
            let p01 = frame.luma_at(x1, y0) as f32;
            let p10 = frame.luma_at(x0, y1) as f32;
            let p11 = frame.luma_at(x1, y1) as f32;

            let value = p00 * (1.0 - x_frac) * (1.0 - y_frac)
                + p01 * x_frac * (1.0 - y_frac)
                + p10 * (1.0 - x_frac) * y_frac
                + p11 * x_frac * y_frac;

            data.push(value as u8);
        }
    }

    LumaImage {
        width: dst_width as usize,
        height: dst_height as usize,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::PixelFormat;

    #[test]
    fn test_extract_luma_skips_stride_padding() {
        // 2x2 gray frame with 2 bytes of padding per row
        let data: Vec<u8> = vec![
            10, 20, 0, 0, //
            30, 40, 0, 0,
        ];
        let frame = CameraFrame::new(2, 2, 4, PixelFormat::Gray8, data).unwrap();

        let luma = extract_luma(&frame);
        assert_eq!(luma.width, 2);
        assert_eq!(luma.height, 2);
        assert_eq!(luma.data, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_downscale_luma() {
        // 4x2 gradient in luma
        let data: Vec<u8> = vec![
            0, 85, 170, 255, //
            0, 85, 170, 255,
        ];
        let frame = CameraFrame::new(4, 2, 4, PixelFormat::Gray8, data).unwrap();

        let luma = downscale_luma(&frame, 2, 1);
        assert_eq!(luma.data.len(), 2);
        assert!(luma.data[0] < 100);
        assert!(luma.data[1] > 150);
    }

    #[test]
    fn test_blank_frame_has_no_candidates() {
        let frame = CameraFrame::new(64, 64, 64, PixelFormat::Gray8, vec![255u8; 64 * 64]).unwrap();
        let event = QrDetector::new().detect_blocking(&frame);
        assert!(event.is_empty());
    }

    #[tokio::test]
    async fn test_async_detect_downscales_large_frames() {
        let frame = CameraFrame::new(1280, 720, 1280, PixelFormat::Gray8, vec![0u8; 1280 * 720])
            .unwrap();
        let event = QrDetector::with_max_dimension(320).detect(Arc::new(frame)).await;
        assert!(event.is_empty());
    }
}
