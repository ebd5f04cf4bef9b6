use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ReconstructionConfig, SegmentationConfig};
use crate::mesh::{Mesh, MeshError, extract_mesh};
use crate::obj::{ObjWriteError, save_obj};
use crate::segmentation::{self, SegmentationError};
use crate::slice_loader::{SliceLoader, SliceLoaderError};
use crate::slice_writer::{self, SliceWriteError};
use crate::volume::{Volume, VolumeError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Loader(#[from] SliceLoaderError),

    #[error("cannot segment {name}: {source}")]
    Segmentation {
        name: String,
        #[source]
        source: SegmentationError,
    },

    #[error(transparent)]
    Volume(#[from] VolumeError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    SliceWrite(#[from] SliceWriteError),

    #[error(transparent)]
    ObjWrite(#[from] ObjWriteError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a [`segment_series`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationSummary {
    /// Slices segmented and written as PNGs.
    pub written: usize,
    /// Slices skipped because no foreground region was found.
    pub skipped: usize,
}

/// Segment every slice in a directory and write the results as PNGs.
///
/// Output files are named `segmented_knee_<stem>.png` after their source
/// slice. The output directory is created if absent. A slice without a
/// foreground region is skipped and counted in the summary rather than
/// aborting the batch; write failures are fatal.
pub fn segment_series(config: &SegmentationConfig) -> Result<SegmentationSummary, PipelineError> {
    fs::create_dir_all(&config.output_dir).map_err(|source| PipelineError::Io {
        path: config.output_dir.clone(),
        source,
    })?;
    let slices = SliceLoader::load_from_directory(&config.input_dir, config.order)?;

    let mut summary = SegmentationSummary {
        written: 0,
        skipped: 0,
    };
    for slice in &slices {
        match segmentation::segment(&slice.pixels) {
            Ok(segmented) => {
                let file_name = format!("segmented_knee_{}.png", slice.stem());
                slice_writer::save_png(&segmented, &config.output_dir.join(file_name))?;
                summary.written += 1;
            }
            Err(error) => {
                warn!("skipping {}: {error}", slice.name);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "segmented {} slices into {} ({} skipped)",
        summary.written,
        config.output_dir.display(),
        summary.skipped
    );
    Ok(summary)
}

/// Reconstruct a surface mesh from a directory of slices.
///
/// Loads and segments every slice, stacks the results with
/// `config.filler_slices` zero planes before each one, extracts the
/// isosurface at `config.iso_level` and writes it to `config.output_path`
/// (parents created, any previous file overwritten). Unlike
/// [`segment_series`], a slice that cannot be segmented aborts the whole
/// run: the stacked volume needs every slice.
pub fn reconstruct_series(config: &ReconstructionConfig) -> Result<Mesh, PipelineError> {
    config.validate()?;

    let slices = SliceLoader::load_from_directory(&config.input_dir, config.order)?;
    let mut segmented = Vec::with_capacity(slices.len());
    for slice in &slices {
        let pixels = segmentation::segment(&slice.pixels).map_err(|source| {
            PipelineError::Segmentation {
                name: slice.name.clone(),
                source,
            }
        })?;
        segmented.push(pixels);
    }

    let volume = Volume::assemble(&segmented, config.filler_slices, config.voxel_spacing)?;
    info!(
        "assembled {:?} volume from {} slices",
        volume.dim(),
        slices.len()
    );

    let mesh = extract_mesh(&volume, config.iso_level)?;

    if let Some(parent) = config
        .output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    save_obj(&mesh, &config.output_path)?;

    Ok(mesh)
}
