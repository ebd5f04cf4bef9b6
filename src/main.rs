//! Command-line interface for the knee segmentation pipelines.
//!
//! Set the `RUST_LOG` environment variable (or pass `-v`/`-vv`) to control
//! log output, e.g. `RUST_LOG=knee_mesh=debug`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use knee_mesh::config::{
    DEFAULT_FILLER_SLICES, DEFAULT_ISO_LEVEL, ReconstructionConfig, SegmentationConfig,
};
use knee_mesh::enums::SliceOrder;
use knee_mesh::pipeline::{reconstruct_series, segment_series};

/// Knee segmentation and surface reconstruction from DICOM slice series.
#[derive(Parser)]
#[command(name = "knee-mesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment each slice and write it as a grayscale PNG
    Segment {
        /// Directory containing the .dcm slices
        input_dir: PathBuf,

        /// Directory the segmented PNGs are written to
        #[arg(short, long, default_value = "segmented")]
        output_dir: PathBuf,

        /// Slice ordering
        #[arg(long, value_enum, default_value_t)]
        order: OrderArg,
    },
    /// Stack segmented slices into a volume and write an OBJ surface mesh
    Reconstruct {
        /// Directory containing the .dcm slices
        input_dir: PathBuf,

        /// Path of the OBJ file to write
        #[arg(short, long, default_value = "mesh/knee.obj")]
        output: PathBuf,

        /// Zero slices inserted before each segmented slice
        #[arg(long, default_value_t = DEFAULT_FILLER_SLICES)]
        filler_slices: usize,

        /// Level at which the isosurface is extracted
        #[arg(long, default_value_t = DEFAULT_ISO_LEVEL)]
        iso_level: f32,

        /// Physical voxel spacing as row,column,slice
        #[arg(long, value_parser = parse_spacing, default_value = "0.5,0.5,0.5")]
        spacing: (f32, f32, f32),

        /// Slice ordering
        #[arg(long, value_enum, default_value_t)]
        order: OrderArg,
    },
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OrderArg {
    #[default]
    FileName,
    InstanceNumber,
    Unsorted,
}

impl From<OrderArg> for SliceOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::FileName => SliceOrder::FileName,
            OrderArg::InstanceNumber => SliceOrder::InstanceNumber,
            OrderArg::Unsorted => SliceOrder::Unsorted,
        }
    }
}

fn parse_spacing(value: &str) -> Result<(f32, f32, f32), String> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|error| error.to_string()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[row, col, depth] => Ok((row, col, depth)),
        _ => Err(format!(
            "expected three comma-separated values, got {value:?}"
        )),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Segment {
            input_dir,
            output_dir,
            order,
        } => {
            let mut config = SegmentationConfig::new(input_dir, output_dir);
            config.order = order.into();
            let summary = segment_series(&config)?;
            println!(
                "segmented {} slices into {} ({} skipped)",
                summary.written,
                config.output_dir.display(),
                summary.skipped
            );
        }
        Commands::Reconstruct {
            input_dir,
            output,
            filler_slices,
            iso_level,
            spacing,
            order,
        } => {
            let mut config = ReconstructionConfig::new(input_dir, output);
            config.filler_slices = filler_slices;
            config.iso_level = iso_level;
            config.voxel_spacing = spacing;
            config.order = order.into();
            let mesh = reconstruct_series(&config)?;
            println!(
                "wrote {} vertices and {} faces to {}",
                mesh.vertex_count(),
                mesh.face_count(),
                config.output_path.display()
            );
        }
    }

    Ok(())
}
