//! Image loading for texture data

use crate::assets::AssetError;
use std::path::Path;

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path, converting to RGBA8
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();

        log::debug!("loading image from {}", path.display());

        let img = image::open(path).map_err(|e| AssetError::ImageDecode {
            path: path.to_path_buf(),
            source: e,
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("loaded {}x{} image from {}", width, height, path.display());

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
