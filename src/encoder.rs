use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, RgbaImage};

use crate::capture::CapturedFrame;
use crate::error::EncodeError;

/// Turns captured frames into JPEG buffers at a fixed scale and quality.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    scale: f32,
    quality: u8,
}

impl FrameEncoder {
    pub fn new(scale: f32, quality: u8) -> Self {
        Self {
            scale,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn encode(&self, frame: CapturedFrame) -> Result<Vec<u8>, EncodeError> {
        let img: RgbaImage =
            ImageBuffer::from_raw(frame.width, frame.height, frame.pixels)
                .ok_or(EncodeError::BadDimensions)?;

        // Native scale skips resampling entirely
        let img = if self.scale == 1.0 {
            img
        } else {
            let (width, height) = scaled_dimensions(frame.width, frame.height, self.scale);
            // Bilinear: blur beats aliasing for motion content
            imageops::resize(&img, width, height, FilterType::Triangle)
        };

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.quality);
        encoder.encode_image(&img)?;

        Ok(jpeg)
    }
}

/// Output size for a scaled frame: each dimension rounded, floored at 1.
fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scaled_w = (width as f32 * scale).round() as u32;
    let scaled_h = (height as f32 * scale).round() as u32;
    (scaled_w.max(1), scaled_h.max(1))
}
