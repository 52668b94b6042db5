//! Tests for pixel buffer validation and RGBA expansion

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use photomosaic::MosaicError;
    use photomosaic::spatial::buffer::{ChannelLayout, PixelBuffer};

    // Tests every supported layout is accepted with a matching length
    // Verified by accepting only RGBA buffers
    #[test]
    fn test_supported_layouts() {
        assert!(PixelBuffer::new(2, 2, 1, vec![0; 4]).is_ok());
        assert!(PixelBuffer::new(2, 2, 3, vec![0; 12]).is_ok());
        let rgba = PixelBuffer::new(2, 2, 4, vec![0; 16]);
        assert_eq!(rgba.map(|b| b.layout()).ok(), Some(ChannelLayout::Rgba));
    }

    // Tests malformed buffers are rejected as invalid images
    // Verified by skipping the length check
    #[test]
    fn test_rejects_malformed() {
        let cases = [
            PixelBuffer::new(0, 2, 4, vec![0; 8]),
            PixelBuffer::new(2, 2, 4, Vec::new()),
            PixelBuffer::new(2, 2, 2, vec![0; 8]),
            PixelBuffer::new(2, 2, 4, vec![0; 15]),
        ];
        for case in cases {
            assert!(matches!(
                case,
                Err(MosaicError::InvalidImage { tile: None, .. })
            ));
        }
    }

    // Tests gray and RGB data gain an opaque alpha channel
    // Verified by leaving alpha at zero for expanded layouts
    #[test]
    fn test_to_rgba_expands() {
        let gray = PixelBuffer::new(2, 1, 1, vec![10, 200]);
        let rgba = gray.map(|b| b.to_rgba()).ok();
        assert_eq!(
            rgba.map(|img| img.into_raw()),
            Some(vec![10, 10, 10, 255, 200, 200, 200, 255])
        );

        let rgb = PixelBuffer::new(1, 2, 3, vec![1, 2, 3, 4, 5, 6]);
        let rgba = rgb.map(|b| b.to_rgba()).ok();
        assert_eq!(rgba.map(|img| *img.get_pixel(0, 1)), Some(Rgba([4, 5, 6, 255])));
    }

    // Tests RGBA images round through the buffer unchanged
    // Verified by dropping the alpha channel on conversion
    #[test]
    fn test_from_rgba_preserves_pixels() {
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 9, 128]));
        let buffer = PixelBuffer::from_rgba(image.clone());
        assert_eq!(buffer.as_ref().map(PixelBuffer::dimensions).ok(), Some((3, 2)));
        assert_eq!(buffer.map(|b| b.to_rgba()).ok(), Some(image));
    }

    // Tests the aspect ratio is width over height
    // Verified by inverting the ratio
    #[test]
    fn test_aspect_ratio() {
        let buffer = PixelBuffer::new(4, 2, 1, vec![0; 8]);
        assert_eq!(buffer.map(|b| b.aspect_ratio()).ok(), Some(2.0));
    }
}
