//! CLI entry point for the photographic mosaic builder

use clap::Parser;
use photomosaic::io::cli::{Cli, MosaicProcessor};
use photomosaic::io::logging;

fn main() -> photomosaic::Result<()> {
    let cli = Cli::parse();
    logging::init(
        logging::level_for(cli.quiet, cli.verbose),
        cli.log_file.as_deref(),
    )?;
    let mut processor = MosaicProcessor::new(cli);
    processor.process()
}
