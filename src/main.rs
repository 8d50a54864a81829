//! raster-compose - merge and re-encode raster tiles from the command line.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use image::ImageFormat;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raster_compose::{
    config::{Cli, Command, InspectArgs, MergeArgs},
    is_single_color_image, BufferOptions, ImageConfig, ImageSource, LayerMerger, MergeOptions,
    OutputFormat, RasterError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match cli.image_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(
        paletted = config.paletted,
        jpeg_quality = config.jpeg_quality,
        "image configuration"
    );

    let result = match cli.command {
        Command::Merge(args) => run_merge(args, config),
        Command::Inspect(args) => run_inspect(args, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Merge Command
// =============================================================================

fn run_merge(args: MergeArgs, config: ImageConfig) -> Result<(), RasterError> {
    let format = args.output_format();

    let mut merger = LayerMerger::with_config(config);
    for path in &args.inputs {
        merger.add(
            ImageSource::from_file(path, format_of(path))
                .with_transparent(args.transparent)
                .with_config(config),
        );
    }

    let mut options = MergeOptions::new()
        .format(format.clone())
        .bgcolor(args.bgcolor.clone())
        .transparent(args.transparent);
    if let Some(size) = args.size {
        options = options.size(size);
    }

    let mut merged = merger.merge(&options)?;
    let data = merged.to_bytes(&BufferOptions::new().format(format.clone()))?;
    std::fs::write(&args.output, &data)?;

    info!(
        "Wrote {} ({} layers, {}, {} bytes)",
        args.output.display(),
        args.inputs.len(),
        format,
        data.len()
    );
    Ok(())
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(args: InspectArgs, config: ImageConfig) -> Result<(), RasterError> {
    let mut reports = Vec::with_capacity(args.inputs.len());

    for path in &args.inputs {
        let format = source_format(path);
        let mime_type = format
            .as_deref()
            .and_then(|f| OutputFormat::from_name(f).ok())
            .map(OutputFormat::mime_type);
        let mut source = ImageSource::from_file(path, format_of(path)).with_config(config);
        let image = source.as_image()?;

        reports.push(serde_json::json!({
            "path": path.display().to_string(),
            "format": format,
            "mime_type": mime_type,
            "width": image.width(),
            "height": image.height(),
            "color_type": format!("{:?}", image.color()),
            "has_alpha": image.color().has_alpha(),
            "single_color": is_single_color_image(image),
        }));
    }

    let json = serde_json::to_string_pretty(&reports).map_err(std::io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// Declared format of an input file, from its extension.
fn format_of(path: &Path) -> String {
    source_format(path).unwrap_or_else(|| "png".to_string())
}

fn source_format(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .map(|ext| match ext {
            "jpg" => "jpeg".to_string(),
            "tif" => "tiff".to_string(),
            other => other.to_string(),
        })
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "raster_compose=debug"
    } else {
        "raster_compose=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
