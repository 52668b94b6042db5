//! Color signatures summarizing the appearance of a pixel region

use crate::spatial::geometry::Rect;
use image::RgbaImage;
use serde::Deserialize;

/// Which statistics a signature carries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureKind {
    /// Channel means only
    #[default]
    Mean,
    /// Channel means and standard deviations
    MeanVariance,
}

/// Fixed-length summary of a region's color on the 0-255 scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSignature {
    /// Mean red, green, blue
    pub mean: [f64; 3],
    /// Standard deviation of red, green, blue when requested
    pub spread: Option<[f64; 3]>,
}

impl ColorSignature {
    /// Signature of a uniform color
    pub const fn uniform(rgb: [f64; 3]) -> Self {
        Self {
            mean: rgb,
            spread: None,
        }
    }

    /// Summarize the whole image
    pub fn of_image(image: &RgbaImage, kind: SignatureKind) -> Self {
        let (width, height) = image.dimensions();
        Self::of_region(image, Rect::full(width, height), kind)
    }

    /// Summarize a rectangle of the image, clamped to its bounds
    ///
    /// Alpha is ignored: a region is judged by the colors it stores.
    /// An empty region yields a black signature.
    pub fn of_region(image: &RgbaImage, region: Rect, kind: SignatureKind) -> Self {
        let (width, height) = image.dimensions();
        let x_end = region.x.saturating_add(region.width).min(width);
        let y_end = region.y.saturating_add(region.height).min(height);

        let mut sum = [0.0_f64; 3];
        let mut sum_sq = [0.0_f64; 3];
        let mut count = 0_u64;

        for y in region.y..y_end {
            for x in region.x..x_end {
                if let Some(pixel) = image.get_pixel_checked(x, y) {
                    for ((s, sq), &v) in sum.iter_mut().zip(sum_sq.iter_mut()).zip(pixel.0.iter())
                    {
                        let v = f64::from(v);
                        *s += v;
                        *sq += v * v;
                    }
                    count += 1;
                }
            }
        }

        if count == 0 {
            return Self {
                mean: [0.0; 3],
                spread: (kind == SignatureKind::MeanVariance).then_some([0.0; 3]),
            };
        }

        let n = count as f64;
        let mean = sum.map(|s| s / n);
        let spread = (kind == SignatureKind::MeanVariance).then(|| {
            let mut spread = [0.0; 3];
            for ((out, &sq), &m) in spread.iter_mut().zip(sum_sq.iter()).zip(mean.iter()) {
                *out = m.mul_add(-m, sq / n).max(0.0).sqrt();
            }
            spread
        });

        Self { mean, spread }
    }
}
