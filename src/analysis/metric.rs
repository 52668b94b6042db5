//! Distance functions between color signatures
//!
//! Every metric is total, symmetric, non-negative and zero for identical
//! signatures. Spreads take part only when both signatures carry them.

use crate::analysis::signature::ColorSignature;
use serde::Deserialize;

/// Rec. 601 luma weights scaled to sum to 3, so a gray shift costs the
/// same as under the plain Euclidean metric
const LUMA_WEIGHTS: [f64; 3] = [0.897, 1.761, 0.342];

/// Supported distance functions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorMetric {
    /// Euclidean distance over channel statistics
    #[default]
    Euclidean,
    /// Euclidean distance weighted by each channel's luma contribution
    LuminanceWeighted,
    /// Low-cost perceptual approximation weighting red and blue by mean red
    Redmean,
}

impl ColorMetric {
    /// Distance between two signatures
    pub fn distance(self, a: &ColorSignature, b: &ColorSignature) -> f64 {
        let weights = match self {
            Self::Euclidean => [1.0; 3],
            Self::LuminanceWeighted => LUMA_WEIGHTS,
            Self::Redmean => redmean_weights(a.mean[0], b.mean[0]),
        };

        let mut total = weighted_square(&a.mean, &b.mean, &weights);
        if let (Some(sa), Some(sb)) = (&a.spread, &b.spread) {
            total += weighted_square(sa, sb, &weights);
        }
        total.sqrt()
    }

    /// Parse a metric name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "euclidean" => Some(Self::Euclidean),
            "luminanceweighted" | "luminance" | "luma" => Some(Self::LuminanceWeighted),
            "redmean" => Some(Self::Redmean),
            _ => None,
        }
    }
}

// Weights depend on the mean of both reds so the result stays symmetric
fn redmean_weights(red_a: f64, red_b: f64) -> [f64; 3] {
    let r = f64::midpoint(red_a, red_b);
    [2.0 + r / 256.0, 4.0, 2.0 + (255.0 - r) / 256.0]
}

fn weighted_square(a: &[f64; 3], b: &[f64; 3], weights: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .zip(weights.iter())
        .map(|((x, y), w)| {
            let d = x - y;
            w * d * d
        })
        .sum()
}
