// SPDX-License-Identifier: GPL-3.0-only

//! Frame and device types shared by the frame sources, the detector, and the
//! viewfinder

use crate::errors::CameraError;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Pixel layout of [`CameraFrame::data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel)
    RGB24,
    /// Gray8 - 8-bit luma
    Gray8,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V, 4 bytes per 2 pixels)
    YUYV,
}

impl PixelFormat {
    /// Minimum bytes per row for a frame of `width` pixels
    pub fn min_stride(&self, width: u32) -> u32 {
        match self {
            PixelFormat::RGBA => width * 4,
            PixelFormat::RGB24 => width * 3,
            PixelFormat::Gray8 => width,
            PixelFormat::YUYV => width.div_ceil(2) * 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::RGBA => "RGBA",
            PixelFormat::RGB24 => "RGB24",
            PixelFormat::Gray8 => "GRAY8",
            PixelFormat::YUYV => "YUYV",
        };
        f.write_str(name)
    }
}

/// A captured frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row, may include padding
    pub stride: u32,
    /// When the frame was published
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a frame, checking that `data` covers every row
    pub fn new(
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<Self, CameraError> {
        let data = data.into();

        if width == 0 || height == 0 {
            return Err(CameraError::InvalidFormat(format!(
                "empty frame {}x{}",
                width, height
            )));
        }
        if stride < format.min_stride(width) {
            return Err(CameraError::InvalidFormat(format!(
                "stride {} too small for {} pixels of {}",
                stride, width, format
            )));
        }

        let required = stride as usize * (height as usize - 1) + format.min_stride(width) as usize;
        if data.len() < required {
            return Err(CameraError::InvalidFormat(format!(
                "{} bytes for a {}x{} {} frame, need {}",
                data.len(),
                width,
                height,
                format,
                required
            )));
        }

        Ok(Self {
            width,
            height,
            data,
            format,
            stride,
            captured_at: Instant::now(),
        })
    }

    /// Convert a decoded image into an RGBA frame
    pub fn from_image(image: &image::DynamicImage) -> Result<Self, CameraError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, width * 4, PixelFormat::RGBA, rgba.into_raw())
    }

    /// Luma (BT.601) of the pixel at `(x, y)`, clamped to the frame
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let data = &self.data;

        match self.format {
            PixelFormat::Gray8 => data
                .get((y * self.stride + x) as usize)
                .copied()
                .unwrap_or(0),
            PixelFormat::YUYV => {
                let pair_x = (x & !1) as usize;
                let base = y as usize * self.stride as usize + pair_x * 2;
                let offset = if x & 1 == 0 { base } else { base + 2 };
                data.get(offset).copied().unwrap_or(0)
            }
            PixelFormat::RGBA | PixelFormat::RGB24 => {
                let (r, g, b) = self.rgb_at(x, y);
                rgb_to_luma(r, g, b)
            }
        }
    }

    /// RGB of the pixel at `(x, y)`, clamped to the frame
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let data = &self.data;

        match self.format {
            PixelFormat::RGBA => {
                let idx = (y * self.stride + x * 4) as usize;
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::RGB24 => {
                let idx = (y * self.stride + x * 3) as usize;
                if idx + 2 < data.len() {
                    (data[idx], data[idx + 1], data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::Gray8 => {
                let v = self.luma_at(x, y);
                (v, v, v)
            }
            PixelFormat::YUYV => {
                // Two pixels share one U/V pair
                let pair_x = (x & !1) as usize;
                let base = y as usize * self.stride as usize + pair_x * 2;
                if base + 3 >= data.len() {
                    return (0, 0, 0);
                }
                let luma = if x & 1 == 0 { data[base] } else { data[base + 2] };
                yuv_to_rgb(luma, data[base + 1], data[base + 3])
            }
        }
    }
}

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// A V4L2 capture node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device node, e.g. `/dev/video0`
    pub path: String,
    /// Card name reported by the driver
    pub card: String,
    /// Driver name
    pub driver: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_buffer() {
        let result = CameraFrame::new(4, 2, 16, PixelFormat::RGBA, vec![0u8; 20]);
        assert!(matches!(result, Err(CameraError::InvalidFormat(_))));
    }

    #[test]
    fn test_rejects_small_stride() {
        let result = CameraFrame::new(4, 2, 8, PixelFormat::RGBA, vec![0u8; 64]);
        assert!(result.is_err());
    }

    #[test]
    fn test_last_row_may_omit_padding() {
        // 2 rows, stride 10, row payload 8: 10 + 8 bytes suffice
        let frame = CameraFrame::new(2, 2, 10, PixelFormat::RGBA, vec![0u8; 18]);
        assert!(frame.is_ok());
    }

    #[test]
    fn test_yuyv_luma_and_rgb() {
        // Y0=16 U=128 Y1=235 V=128: pure grays
        let frame = CameraFrame::new(2, 1, 4, PixelFormat::YUYV, vec![16u8, 128, 235, 128]).unwrap();
        assert_eq!(frame.luma_at(0, 0), 16);
        assert_eq!(frame.luma_at(1, 0), 235);
        assert_eq!(frame.rgb_at(1, 0), (235, 235, 235));
    }

    #[test]
    fn test_rgba_luma() {
        let frame = CameraFrame::new(
            2,
            1,
            8,
            PixelFormat::RGBA,
            vec![255u8, 255, 255, 255, 0, 0, 0, 255],
        )
        .unwrap();
        assert_eq!(frame.luma_at(0, 0), 255);
        assert_eq!(frame.luma_at(1, 0), 0);
    }

    #[test]
    fn test_from_image() {
        let image = image::DynamicImage::new_luma8(3, 2);
        let frame = CameraFrame::from_image(&image).unwrap();
        assert_eq!(frame.format, PixelFormat::RGBA);
        assert_eq!(frame.stride, 12);
        assert_eq!(frame.data.len(), 24);
    }
}
