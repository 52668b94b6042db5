//! Pure dimension arithmetic for cropping, orientation and cell sizing
//!
//! Nothing here touches pixels. Integer arithmetic is used wherever the
//! result feeds a crop so that repeated application is exact.

/// Axis-aligned pixel rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Rectangle covering a whole image
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Check if the rectangle covers an entire image of the given size
    pub const fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// Largest rectangle with the aspect of `frame` that fits in `source`
///
/// The crop is centered, then moved along the cropped axis by `shift`
/// times the removed length. `shift` is clamped to [-0.5, 0.5] so the
/// crop never leaves the source.
///
/// ```
/// # use photomosaic::spatial::geometry::crop_center_rect;
/// let rect = crop_center_rect((5472, 3452), (3000, 3000), 0.0);
/// assert_eq!((rect.width, rect.height), (3452, 3452));
/// let rect = crop_center_rect((5472, 3452), (3000, 1500), 0.2);
/// assert_eq!((rect.width, rect.height), (5472, 2736));
/// ```
pub fn crop_center_rect(source: (u32, u32), frame: (u32, u32), shift: f64) -> Rect {
    let (src_w, src_h) = (u64::from(source.0), u64::from(source.1));
    let (frame_w, frame_h) = (u64::from(frame.0.max(1)), u64::from(frame.1.max(1)));
    let shift = shift.clamp(-0.5, 0.5);

    // Source taller than the frame: keep full width, trim rows
    if src_h * frame_w > src_w * frame_h {
        let crop_h = (src_w * frame_h / frame_w).max(1);
        let spare = src_h - crop_h;
        let offset = (spare as f64 * shift) as i64;
        let y = (spare / 2) as i64 + offset;
        Rect {
            x: 0,
            y: y.clamp(0, spare as i64) as u32,
            width: src_w as u32,
            height: crop_h as u32,
        }
    } else {
        let crop_w = (src_h * frame_w / frame_h).clamp(1, src_w.max(1));
        let spare = src_w - crop_w;
        let offset = (spare as f64 * shift) as i64;
        let x = (spare / 2) as i64 + offset;
        Rect {
            x: x.clamp(0, spare as i64) as u32,
            y: 0,
            width: crop_w as u32,
            height: src_h as u32,
        }
    }
}

/// Swap `requested` so its orientation matches `source`
///
/// ```
/// # use photomosaic::spatial::geometry::auto_orient;
/// assert_eq!(auto_orient((5472, 3452), (400, 300)), (400, 300));
/// assert_eq!(auto_orient((5472, 3452), (300, 400)), (400, 300));
/// ```
pub const fn auto_orient(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    if (source.0 < source.1) == (requested.0 < requested.1) {
        requested
    } else {
        (requested.1, requested.0)
    }
}

/// Cell size giving each tile about `redundancy` uses over the canvas
///
/// Solves `rows * cols ~= tiles * redundancy` for a cell with the given
/// integer aspect, rounding the scale up so the cell count never exceeds
/// the budget.
///
/// ```
/// # use photomosaic::spatial::geometry::derive_cell_size;
/// assert_eq!(derive_cell_size((3000, 4000), 160, (3, 4), 1.0), (240, 320));
/// assert_eq!(derive_cell_size((3000, 4000), 160, (3, 4), 5.0), (108, 144));
/// ```
pub fn derive_cell_size(
    canvas: (u32, u32),
    tiles: usize,
    aspect: (u32, u32),
    redundancy: f64,
) -> (u32, u32) {
    let area = f64::from(canvas.0) * f64::from(canvas.1);
    let aspect_area = f64::from(aspect.0.max(1)) * f64::from(aspect.1.max(1));
    let tiles = tiles.max(1) as f64;
    let redundancy = if redundancy > 0.0 { redundancy } else { 1.0 };

    let scale = (area / tiles / redundancy / aspect_area).sqrt().ceil().max(1.0) as u32;
    (aspect.0.max(1) * scale, aspect.1.max(1) * scale)
}

/// Scale a cell size by the overscan factor, never below one pixel
pub fn scaled_size(size: (u32, u32), factor: f64) -> (u32, u32) {
    let scale = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
    (scale(size.0), scale(size.1))
}
