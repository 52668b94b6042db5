/// Command-line parsing and batch processing
pub mod cli;
/// Run configuration and shared constants
pub mod configuration;
/// Error types and context propagation
pub mod error;
/// Image decoding and canvas export
pub mod image;
/// Logger initialization
pub mod logging;
/// Progress bars fed by the pipeline
pub mod progress;
