//! Tests for color signature computation over regions

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use photomosaic::analysis::signature::{ColorSignature, SignatureKind};
    use photomosaic::spatial::geometry::Rect;

    fn halves() -> RgbaImage {
        // Left half red, right half blue
        RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    // Tests the mean over the whole image averages all pixels
    // Verified by dividing by the width only
    #[test]
    fn test_mean_of_image() {
        let signature = ColorSignature::of_image(&halves(), SignatureKind::Mean);
        assert_eq!(signature.mean, [127.5, 0.0, 127.5]);
        assert_eq!(signature.spread, None);
    }

    // Tests region signatures only see the pixels inside the rectangle
    // Verified by ignoring the region origin
    #[test]
    fn test_region_mean() {
        let region = Rect {
            x: 2,
            y: 0,
            width: 2,
            height: 2,
        };
        let signature = ColorSignature::of_region(&halves(), region, SignatureKind::Mean);
        assert_eq!(signature.mean, [0.0, 0.0, 255.0]);
    }

    // Tests the spread is the population standard deviation per channel
    // Verified by using the sample variance
    #[test]
    fn test_mean_variance_spread() {
        let signature = ColorSignature::of_image(&halves(), SignatureKind::MeanVariance);
        let spread = signature.spread.unwrap_or([0.0; 3]);
        assert!((spread[0] - 127.5).abs() < 1e-9);
        assert!(spread[1].abs() < 1e-9);
        assert!((spread[2] - 127.5).abs() < 1e-9);
    }

    // Tests regions past the image edge are clamped and empty regions are black
    // Verified by removing the bounds clamp
    #[test]
    fn test_region_clamped() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([30, 60, 90, 255]));
        let wide = Rect {
            x: 1,
            y: 1,
            width: 10,
            height: 10,
        };
        let signature = ColorSignature::of_region(&image, wide, SignatureKind::Mean);
        assert_eq!(signature.mean, [30.0, 60.0, 90.0]);

        let outside = Rect {
            x: 5,
            y: 5,
            width: 2,
            height: 2,
        };
        let empty = ColorSignature::of_region(&image, outside, SignatureKind::MeanVariance);
        assert_eq!(empty.mean, [0.0; 3]);
        assert_eq!(empty.spread, Some([0.0; 3]));
    }

    // Tests alpha does not weigh into the signature
    // Verified by premultiplying colors by alpha
    #[test]
    fn test_alpha_ignored() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([100, 150, 200, 0]));
        let signature = ColorSignature::of_image(&image, SignatureKind::Mean);
        assert_eq!(signature.mean, [100.0, 150.0, 200.0]);
    }
}
