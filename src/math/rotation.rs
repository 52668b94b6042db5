//! Rotation of RGBA buffers and rotated rectangle geometry

use image::{Rgba, RgbaImage};

/// Corners of a `width` x `height` rectangle rotated about its center
///
/// Coordinates are relative to the center, in the order top-left,
/// top-right, bottom-right, bottom-left before rotation. Positive angles
/// rotate clockwise in image coordinates (y pointing down).
pub fn rotated_corners(width: f64, height: f64, degrees: f64) -> [[f64; 2]; 4] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (hw, hh) = (width / 2.0, height / 2.0);
    [[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]]
        .map(|[x, y]| [x.mul_add(cos, -(y * sin)), x.mul_add(sin, y * cos)])
}

/// Size of the axis-aligned box enclosing the rotated rectangle
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let corners = rotated_corners(f64::from(width), f64::from(height), degrees);
    let extent = |axis: usize| {
        let (min, max) = corners.iter().fold((f64::MAX, f64::MIN), |(lo, hi), c| {
            let v = c.get(axis).copied().unwrap_or(0.0);
            (lo.min(v), hi.max(v))
        });
        // Tolerance keeps exact right angles from gaining a pixel
        ((max - min) - 1e-9).ceil().max(1.0) as u32
    };
    (extent(0), extent(1))
}

/// Rotate an image about its center, expanding the canvas to fit
///
/// Uses inverse mapping with bilinear sampling. Pixels that map outside
/// the source become fully transparent. A zero angle returns a copy.
pub fn rotate_expand(image: &RgbaImage, degrees: f64) -> RgbaImage {
    if degrees.abs() < f64::EPSILON {
        return image.clone();
    }

    let (src_w, src_h) = image.dimensions();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let src_cx = f64::from(src_w) / 2.0;
    let src_cy = f64::from(src_h) / 2.0;
    let dst_cx = f64::from(dst_w) / 2.0;
    let dst_cy = f64::from(dst_h) / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |x, y| {
        // Pixel centers, rotated back into the source frame
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        let sx = dx.mul_add(cos, dy * sin) + src_cx - 0.5;
        let sy = (-dx).mul_add(sin, dy * cos) + src_cy - 0.5;
        sample_bilinear(image, sx, sy)
    })
}

fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (width, height) = image.dimensions();
    if x <= -1.0 || y <= -1.0 || x >= f64::from(width) || y >= f64::from(height) {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |px: f64, py: f64| -> [f64; 4] {
        if px < 0.0 || py < 0.0 || px >= f64::from(width) || py >= f64::from(height) {
            return [0.0; 4];
        }
        image
            .get_pixel_checked(px as u32, py as u32)
            .map_or([0.0; 4], |p| p.0.map(f64::from))
    };

    let taps = [
        (fetch(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (fetch(x0 + 1.0, y0), fx * (1.0 - fy)),
        (fetch(x0, y0 + 1.0), (1.0 - fx) * fy),
        (fetch(x0 + 1.0, y0 + 1.0), fx * fy),
    ];

    // Premultiply so transparent taps do not darken the edges
    let mut alpha = 0.0;
    let mut color = [0.0; 3];
    for (tap, weight) in &taps {
        let a = tap[3] * weight;
        alpha += a;
        for (channel, value) in color.iter_mut().zip(tap.iter()) {
            *channel += value * a;
        }
    }

    if alpha <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let to_u8 = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Rgba([
        to_u8(color[0] / alpha),
        to_u8(color[1] / alpha),
        to_u8(color[2] / alpha),
        to_u8(alpha),
    ])
}
