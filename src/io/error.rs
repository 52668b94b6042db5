//! Error types and context management for mosaic operations

use crate::spatial::tiles::TileId;
use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Pixel buffer is empty, zero-sized or has an unsupported layout
    InvalidImage {
        /// Tile the buffer belongs to (`None` for the target image)
        tile: Option<TileId>,
        /// Description of what's wrong with the buffer
        reason: String,
    },

    /// Grid geometry does not fit the target image
    InvalidDimensions {
        /// Target image dimensions (width, height)
        image: (u32, u32),
        /// Requested cell dimensions (width, height)
        cell: (u32, u32),
        /// Explanation of the mismatch
        reason: &'static str,
    },

    /// Pool cannot cover every cell with tile reuse disabled
    InsufficientTiles {
        /// Number of tiles in the pool
        tiles: usize,
        /// Number of cells to fill
        cells: usize,
    },

    /// Tile placement exceeds the canvas while clipping is disabled
    CanvasBounds {
        /// Cell grid coordinates (row, col)
        cell: [usize; 2],
        /// Placement rectangle (x, y, width, height)
        placement: [i64; 4],
        /// Canvas dimensions (width, height)
        canvas: (u32, u32),
    },

    /// Run aborted through its cancellation token
    Cancelled {
        /// Cells assigned before the abort
        assigned: usize,
        /// Total cells in the grid
        cells: usize,
    },

    /// A configuration value is out of range
    InvalidParameter {
        /// Configuration key, as spelled in the TOML file
        parameter: &'static str,
        /// Rejected value as text
        value: String,
        /// Accepted range or rule the value breaks
        reason: String,
    },

    /// A target or tile file could not be decoded
    ImageLoad {
        /// File that was opened
        path: PathBuf,
        /// Decoder failure
        source: image::ImageError,
    },

    /// Failed to save the finished canvas to disk
    ImageExport {
        /// Destination of the mosaic
        path: PathBuf,
        /// Encoder failure
        source: image::ImageError,
    },

    /// Reading a directory or writing a file failed
    FileSystem {
        /// File or directory being accessed
        path: PathBuf,
        /// What was being done, e.g. "read directory"
        operation: &'static str,
        /// I/O failure
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    Configuration {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage { tile, reason } => match tile {
                Some(id) => write!(f, "Invalid image for tile '{id}': {reason}"),
                None => write!(f, "Invalid target image: {reason}"),
            },
            Self::InvalidDimensions {
                image,
                cell,
                reason,
            } => {
                write!(
                    f,
                    "Invalid dimensions: {reason} (image {}x{}, cell {}x{})",
                    image.0, image.1, cell.0, cell.1
                )
            }
            Self::InsufficientTiles { tiles, cells } => {
                write!(f, "Not enough tiles: {tiles} tiles for {cells} cells")
            }
            Self::CanvasBounds {
                cell,
                placement,
                canvas,
            } => {
                write!(
                    f,
                    "Tile for cell ({}, {}) placed at {}x{}+{}+{} exceeds canvas {}x{}",
                    cell[0],
                    cell[1],
                    placement[2],
                    placement[3],
                    placement[0],
                    placement[1],
                    canvas.0,
                    canvas.1
                )
            }
            Self::Cancelled { assigned, cells } => {
                write!(f, "Run cancelled after assigning {assigned} of {cells} cells")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Cannot decode '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(f, "Cannot write mosaic to '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(f, "Cannot {operation} '{}': {source}", path.display())
            }
            Self::Configuration { path, source } => {
                write!(f, "Failed to parse configuration '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source: decode, .. } | Self::ImageExport { source: decode, .. } => {
                Some(decode)
            }
            Self::FileSystem { source: io, .. } => Some(io),
            Self::Configuration { source: toml, .. } => Some(toml),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Attaches the tile or file that caused an error while it propagates
///
/// Context already present on the error is never replaced by a tile, while
/// a path always replaces the placeholder left by the `From` conversions.
pub trait WithContext<T> {
    /// Name the tile whose buffer was rejected
    ///
    /// # Errors
    ///
    /// Propagates the underlying error, tagged with `tile`
    fn with_tile(self, tile: &TileId) -> Result<T>;

    /// Name the file being read or written
    ///
    /// # Errors
    ///
    /// Propagates the underlying error, tagged with `path`
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<MosaicError>,
{
    fn with_tile(self, tile: &TileId) -> Result<T> {
        self.map_err(|e| match e.into() {
            MosaicError::InvalidImage { tile: None, reason } => MosaicError::InvalidImage {
                tile: Some(tile.clone()),
                reason,
            },
            other => other,
        })
    }

    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        let path = path.into();
        self.map_err(|e| {
            let mut error = e.into();
            if let MosaicError::ImageLoad { path: slot, .. }
            | MosaicError::ImageExport { path: slot, .. }
            | MosaicError::FileSystem { path: slot, .. }
            | MosaicError::Configuration { path: slot, .. } = &mut error
            {
                *slot = path;
            }
            error
        })
    }
}

impl From<image::ImageError> for MosaicError {
    fn from(source: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(source: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::new(),
            operation: "access",
            source,
        }
    }
}

/// Reject a configuration value
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid image error for a buffer not yet tied to a tile
pub fn invalid_image(reason: &impl ToString) -> MosaicError {
    MosaicError::InvalidImage {
        tile: None,
        reason: reason.to_string(),
    }
}
