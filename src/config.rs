use std::path::PathBuf;

use thiserror::Error;

use crate::enums::SliceOrder;

/// Zero slices inserted before each segmented slice when assembling a volume.
pub const DEFAULT_FILLER_SLICES: usize = 5;

/// Scalar level at which the isosurface is extracted.
pub const DEFAULT_ISO_LEVEL: f32 = 0.3;

/// Physical size of one voxel along (row, column, depth).
pub const DEFAULT_VOXEL_SPACING: (f32, f32, f32) = (0.5, 0.5, 0.5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("iso level must be finite, got {0}")]
    NonFiniteIsoLevel(f32),

    #[error("voxel spacing must be finite and positive, got {0:?}")]
    InvalidSpacing((f32, f32, f32)),
}

/// Settings for the per-slice segmentation pipeline.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Directory holding the `.dcm` slice files.
    pub input_dir: PathBuf,
    /// Directory the segmented PNGs are written to; created if absent.
    pub output_dir: PathBuf,
    pub order: SliceOrder,
}

impl SegmentationConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            order: SliceOrder::default(),
        }
    }
}

/// Settings for the volume reconstruction pipeline.
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Directory holding the `.dcm` slice files.
    pub input_dir: PathBuf,
    /// Path of the OBJ file to write; overwritten if present.
    pub output_path: PathBuf,
    /// Zero slices inserted before each segmented slice.
    pub filler_slices: usize,
    pub iso_level: f32,
    pub voxel_spacing: (f32, f32, f32),
    pub order: SliceOrder,
}

impl ReconstructionConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            filler_slices: DEFAULT_FILLER_SLICES,
            iso_level: DEFAULT_ISO_LEVEL,
            voxel_spacing: DEFAULT_VOXEL_SPACING,
            order: SliceOrder::default(),
        }
    }

    /// Check field values before any I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.iso_level.is_finite() {
            return Err(ConfigError::NonFiniteIsoLevel(self.iso_level));
        }
        let (r, c, d) = self.voxel_spacing;
        if ![r, c, d].iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(ConfigError::InvalidSpacing(self.voxel_spacing));
        }
        Ok(())
    }
}
