/// RGBA raster carrier plus the image-file adapters around it

use crate::error::{Result, StegoError};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Width x height x 4 (RGBA) pixel buffer of a cover or stego image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCarrier {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelCarrier {
    /// Wrap a raw RGBA buffer, checking that its length matches the dimensions
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| StegoError::InvalidCarrier("dimensions overflow".to_string()))?;
        if rgba.len() != expected {
            return Err(StegoError::InvalidCarrier(format!(
                "{}x{} RGBA needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    /// Decode any image file the `image` crate understands into RGBA
    pub fn decode(file_bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(file_bytes).map_err(StegoError::ImageDecode)?;
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            rgba: rgba.into_raw(),
        }
    }

    /// Encode as PNG (lossless, so the embedded LSBs survive)
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.to_image()
            .write_to(&mut out, ImageFormat::Png)
            .map_err(StegoError::ImageEncode)?;
        Ok(out.into_inner())
    }

    /// Write to `path`, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_image().save(path).map_err(StegoError::ImageEncode)
    }

    pub fn to_image(&self) -> DynamicImage {
        // Length was validated on construction
        let buf = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height));
        DynamicImage::ImageRgba8(buf)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub(crate) fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }
}
