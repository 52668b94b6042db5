//! Tests for canvas compositing, tilt and color correction

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use photomosaic::MosaicError;
    use photomosaic::analysis::signature::{ColorSignature, SignatureKind};
    use photomosaic::spatial::buffer::PixelBuffer;
    use photomosaic::spatial::canvas::{MosaicRenderer, RenderOptions, correct_color};
    use photomosaic::spatial::grid::{CellGrid, GridBuilder};
    use photomosaic::spatial::tiles::{SourcePool, TileNormalizer, TilePool};
    use std::borrow::Cow;

    const COLORS: [[u8; 3]; 4] = [[200, 0, 0], [0, 200, 0], [0, 0, 200], [90, 90, 90]];

    fn grid() -> CellGrid {
        let target = RgbaImage::from_pixel(20, 10, Rgba([128, 128, 128, 255]));
        GridBuilder::new((10, 5))
            .build(&target)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn pool(tile_size: (u32, u32)) -> TilePool {
        let mut sources = SourcePool::new();
        for (i, [r, g, b]) in COLORS.iter().enumerate() {
            let image = RgbaImage::from_pixel(20, 10, Rgba([*r, *g, *b, 255]));
            let buffer = PixelBuffer::from_rgba(image).unwrap_or_else(|e| panic!("{e}"));
            sources.push(format!("tile-{i}"), buffer);
        }
        sources
            .normalize(&TileNormalizer::new(tile_size, SignatureKind::Mean))
            .unwrap_or_else(|e| panic!("{e}"))
    }

    fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
        Rgba([r, g, b, 255])
    }

    // Tests tiles at the cell size exactly fill their cells
    // Verified by placing tiles at the cell origin plus half a cell
    #[test]
    fn test_render_fills_cells() {
        let mut grid = grid();
        grid.assign(&[0, 1, 2, 3]).unwrap_or_else(|e| panic!("{e}"));
        let canvas = MosaicRenderer::default()
            .render(&mut grid, &pool((10, 5)), &[0, 1, 2, 3])
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(canvas.dimensions(), (20, 10));
        assert_eq!(canvas.get_pixel(0, 0), &rgba(COLORS[0]));
        assert_eq!(canvas.get_pixel(19, 0), &rgba(COLORS[1]));
        assert_eq!(canvas.get_pixel(0, 9), &rgba(COLORS[2]));
        assert_eq!(canvas.get_pixel(19, 9), &rgba(COLORS[3]));
        assert!(canvas.pixels().all(|p| p.0[3] == 255));
    }

    // Tests earlier committed cells end up on top of overlapping ones
    // Verified by drawing cells in commit order
    #[test]
    fn test_render_first_commit_on_top() {
        let tiles = pool((14, 7));
        let render = |order: &[usize]| {
            let mut grid = grid();
            grid.assign(&[0, 1, 2, 3]).unwrap_or_else(|e| panic!("{e}"));
            MosaicRenderer::default()
                .render(&mut grid, &tiles, order)
                .unwrap_or_else(|e| panic!("{e}"))
        };

        // Cells 0 and 1 overlap on columns 8..12 of the first row
        assert_eq!(render(&[0, 1, 2, 3]).get_pixel(9, 0), &rgba(COLORS[0]));
        assert_eq!(render(&[1, 0, 2, 3]).get_pixel(9, 0), &rgba(COLORS[1]));
    }

    // Tests placements outside the canvas fail only when clipping is off
    // Verified by ignoring the clip flag
    #[test]
    fn test_render_canvas_bounds() {
        let tiles = pool((14, 7));
        let mut strict_grid = grid();
        strict_grid
            .assign(&[0, 1, 2, 3])
            .unwrap_or_else(|e| panic!("{e}"));
        let strict = MosaicRenderer::new(RenderOptions {
            clip: false,
            ..RenderOptions::default()
        });

        match strict.render(&mut strict_grid, &tiles, &[0, 1, 2, 3]) {
            Err(MosaicError::CanvasBounds {
                cell,
                placement,
                canvas,
            }) => {
                assert_eq!(cell, [1, 1]);
                assert_eq!(placement, [8, 4, 14, 7]);
                assert_eq!(canvas, (20, 10));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut grid = grid();
        grid.assign(&[0, 1, 2, 3]).unwrap_or_else(|e| panic!("{e}"));
        assert!(MosaicRenderer::default()
            .render(&mut grid, &tiles, &[0, 1, 2, 3])
            .is_ok());
    }

    // Tests tilt angles are bounded, recorded per cell and seeded
    // Verified by drawing angles in commit order
    #[test]
    fn test_render_tilt() {
        let tiles = pool((10, 5));
        let renderer = MosaicRenderer::new(RenderOptions {
            tilt_max_degrees: 10.0,
            seed: 5,
            ..RenderOptions::default()
        });
        let angles = |order: &[usize]| {
            let mut grid = grid();
            grid.assign(&[3, 2, 1, 0]).unwrap_or_else(|e| panic!("{e}"));
            renderer
                .render(&mut grid, &tiles, order)
                .unwrap_or_else(|e| panic!("{e}"));
            grid.cells()
                .iter()
                .map(|cell| cell.tilt_degrees.unwrap_or(f64::NAN))
                .collect::<Vec<_>>()
        };

        let first = angles(&[0, 1, 2, 3]);
        assert!(first.iter().all(|a| (-10.0..=10.0).contains(a)));
        assert!(first.iter().any(|a| a.abs() > 0.0));
        assert_eq!(first, angles(&[3, 2, 1, 0]));
    }

    // Tests a cell without a tile is reported
    // Verified by skipping unassigned cells
    #[test]
    fn test_render_unassigned_cell() {
        let mut grid = grid();
        let result = MosaicRenderer::default().render(&mut grid, &pool((10, 5)), &[0, 1, 2, 3]);
        assert!(matches!(
            result,
            Err(MosaicError::InvalidParameter {
                parameter: "assignment",
                ..
            })
        ));
    }

    // Tests color correction moves pixels towards the cell mean and keeps alpha
    // Verified by applying the full difference regardless of strength
    #[test]
    fn test_correct_color() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([100, 100, 100, 128]));
        let tile = ColorSignature::uniform([100.0, 100.0, 100.0]);
        let target = ColorSignature::uniform([150.0, 100.0, 250.0]);

        assert!(matches!(correct_color(&image, &tile, &target, 0.0), Cow::Borrowed(_)));
        let full = correct_color(&image, &tile, &target, 1.0);
        assert_eq!(full.get_pixel(1, 1), &Rgba([150, 100, 250, 128]));
        let half = correct_color(&image, &tile, &target, 0.5);
        assert_eq!(half.get_pixel(0, 2), &Rgba([125, 100, 175, 128]));
    }

    // Tests correction saturates at the channel range
    // Verified by letting channels wrap around
    #[test]
    fn test_correct_color_clamps() {
        let image = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([250, 10, 0, 255])
            } else {
                Rgba([200, 60, 0, 255])
            }
        });
        let tile = ColorSignature::uniform([225.0, 35.0, 0.0]);
        let target = ColorSignature::uniform([255.0, 0.0, 0.0]);
        let corrected = correct_color(&image, &tile, &target, 1.0);
        assert_eq!(corrected.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(corrected.get_pixel(1, 0), &Rgba([230, 25, 0, 255]));
    }
}
