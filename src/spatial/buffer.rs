//! Decoded raster buffers handed to the core by the image source

use crate::io::error::{Result, invalid_image};
use image::{Rgba, RgbaImage};

/// Channel layouts accepted by the core
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Single luminance channel
    Gray,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
}

impl ChannelLayout {
    /// Map a channel count to its layout
    pub const fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Number of bytes per pixel
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Validated, already-decoded pixel data with 8 bits per channel
///
/// Pixels are stored row-major with interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw pixel data after checking its shape
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if:
    /// - Either dimension is zero or the data is empty
    /// - The channel count is not 1, 3 or 4
    /// - The data length does not match `width * height * channels`
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid_image(&format!(
                "zero dimension ({width}x{height})"
            )));
        }
        if data.is_empty() {
            return Err(invalid_image(&"pixel buffer is empty"));
        }
        let layout = ChannelLayout::from_channels(channels).ok_or_else(|| {
            invalid_image(&format!(
                "unsupported channel count {channels} (expected 1, 3 or 4)"
            ))
        })?;

        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(invalid_image(&format!(
                "buffer holds {} bytes, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Wrap an RGBA image without copying
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the image has a zero dimension
    pub fn from_rgba(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, 4, image.into_raw())
    }

    /// Width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as (width, height)
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel layout of the data
    pub const fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Expand to four channels, gray and RGB receive an opaque alpha
    pub fn to_rgba(&self) -> RgbaImage {
        if self.layout == ChannelLayout::Rgba {
            if let Some(image) = RgbaImage::from_raw(self.width, self.height, self.data.clone()) {
                return image;
            }
        }

        let stride = self.layout.channels();
        let mut pixels = self.data.chunks_exact(stride);
        RgbaImage::from_fn(self.width, self.height, |_, _| {
            let pixel = pixels.next().unwrap_or(&[]);
            match (self.layout, pixel) {
                (ChannelLayout::Gray, &[v]) => Rgba([v, v, v, 255]),
                (ChannelLayout::Rgb, &[r, g, b]) => Rgba([r, g, b, 255]),
                (ChannelLayout::Rgba, &[r, g, b, a]) => Rgba([r, g, b, a]),
                _ => Rgba([0, 0, 0, 0]),
            }
        })
    }
}
