//! Image decoding into pixel buffers and canvas export

use crate::io::configuration::SUPPORTED_EXTENSIONS;
use crate::io::error::{MosaicError, Result};
use crate::spatial::buffer::PixelBuffer;
use crate::spatial::tiles::{SourcePool, TileId};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};

/// Decode an image file into a validated buffer
///
/// The EXIF orientation, when present, is applied so the buffer is upright.
/// Gray and RGB images keep their layout; everything else is converted
/// to RGBA.
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded and
/// `InvalidImage` if the decoded image is empty
pub fn load_buffer(path: &Path) -> Result<PixelBuffer> {
    let load_error = |source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| load_error(ImageError::IoError(e)))?
        .into_decoder()
        .map_err(load_error)?;
    let orientation = decoder.orientation().map_err(load_error)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(load_error)?;
    if orientation != Orientation::NoTransforms {
        log::debug!("applying {orientation:?} to {}", path.display());
        image.apply_orientation(orientation);
    }
    let (width, height) = (image.width(), image.height());

    match image {
        DynamicImage::ImageLuma8(gray) => PixelBuffer::new(width, height, 1, gray.into_raw()),
        DynamicImage::ImageRgb8(rgb) => PixelBuffer::new(width, height, 3, rgb.into_raw()),
        other => PixelBuffer::new(width, height, 4, other.into_rgba8().into_raw()),
    }
}

/// Check whether a path has an image extension this tool reads
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// Image files below `dir`, recursively, sorted by path
///
/// # Errors
///
/// Returns `FileSystem` if a directory cannot be read
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|source| MosaicError::FileSystem {
            path: current.clone(),
            operation: "read directory",
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| MosaicError::FileSystem {
                    path: current.clone(),
                    operation: "read directory entry",
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if is_supported(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Load every image below `dir` into a pool, ids are paths relative to it
///
/// Files that fail to decode are skipped with a warning.
///
/// # Errors
///
/// Returns `FileSystem` if the directory cannot be read
pub fn load_pool(dir: &Path) -> Result<SourcePool> {
    let mut pool = SourcePool::new();
    for path in collect_images(dir)? {
        let id = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        match load_buffer(&path) {
            Ok(buffer) => pool.push(TileId::new(id), buffer),
            Err(error) => log::warn!("skipping tile: {error}"),
        }
    }
    log::debug!("loaded {} tiles from {}", pool.len(), dir.display());
    Ok(pool)
}

/// Save the canvas, creating parent directories
///
/// Formats without alpha (JPEG) receive the canvas flattened to RGB.
///
/// # Errors
///
/// Returns:
/// - `FileSystem` if the parent directory cannot be created
/// - `ImageExport` if encoding or writing fails
pub fn save_canvas(canvas: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }

    let export_error = |source| MosaicError::ImageExport {
        path: path.to_path_buf(),
        source,
    };

    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgba8(canvas.clone())
            .into_rgb8()
            .save(path)
            .map_err(export_error),
        _ => canvas.save(path).map_err(export_error),
    }
}
