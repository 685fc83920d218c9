// SPDX-License-Identifier: GPL-3.0-only

//! Geometry of detections within a frame

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions,
/// so they survive downscaling for detection and scaling for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }

    /// Axis-aligned bounding box of a quadrilateral given in pixels,
    /// clamped to the frame
    pub fn from_corners(corners: &[(i32, i32)], frame_width: u32, frame_height: u32) -> Self {
        let clamp_x = |v: i32| v.clamp(0, frame_width as i32) as u32;
        let clamp_y = |v: i32| v.clamp(0, frame_height as i32) as u32;

        let min_x = corners.iter().map(|c| clamp_x(c.0)).min().unwrap_or(0);
        let max_x = corners.iter().map(|c| clamp_x(c.0)).max().unwrap_or(0);
        let min_y = corners.iter().map(|c| clamp_y(c.1)).min().unwrap_or(0);
        let max_y = corners.iter().map(|c| clamp_y(c.1)).max().unwrap_or(0);

        Self::from_pixels(
            min_x,
            min_y,
            max_x - min_x,
            max_y - min_y,
            frame_width,
            frame_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_region_from_pixels() {
        let region = FrameRegion::from_pixels(100, 50, 200, 100, 1000, 500);
        assert!((region.x - 0.1).abs() < 0.001);
        assert!((region.y - 0.1).abs() < 0.001);
        assert!((region.width - 0.2).abs() < 0.001);
        assert!((region.height - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let region = FrameRegion::from_corners(&[(-10, 20), (60, 20), (60, 90), (-10, 90)], 100, 100);
        assert!((region.x - 0.0).abs() < 0.001);
        assert!((region.y - 0.2).abs() < 0.001);
        assert!((region.width - 0.6).abs() < 0.001);
        assert!((region.height - 0.7).abs() < 0.001);
    }
}
