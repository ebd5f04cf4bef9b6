//! # knee-mesh
//!
//! Segments the knee region from a series of DICOM slices and reconstructs
//! a 3D surface mesh from the stacked segmentation results.
//!
//! Each slice is thresholded with Otsu's method, its 8-connected foreground
//! components are labeled and only the largest one is kept. From there two
//! batch pipelines exist:
//!
//!  - [`pipeline::segment_series`] writes every segmented slice as a
//!    grayscale PNG;
//!  - [`pipeline::reconstruct_series`] stacks the segmented slices into a
//!    volume (with configurable zero filler planes between them), extracts
//!    an isosurface mesh and writes it as a Wavefront OBJ file.
//!
//! Slice ordering is an explicit contract ([`enums::SliceOrder`]): file-name
//! order by default, or the DICOM `InstanceNumber` tag. DICOM files are
//! assumed to be single-frame axial slices from one series; files that fail
//! to decode are skipped with a warning.
//!
//! # Examples
//!
//! ## Reconstructing a mesh from a slice directory
//!
//! Segment all DICOM files in the knee/ directory, stack them with the
//! default filler spacing and write the extracted surface to an OBJ file.
//!
//! ```no_run
//! # use knee_mesh::config::ReconstructionConfig;
//! # use knee_mesh::pipeline::reconstruct_series;
//! let config = ReconstructionConfig::new("knee", "mesh/knee.obj");
//! let mesh = reconstruct_series(&config).expect("should have reconstructed the series");
//! println!("{} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
//! ```

pub mod config;
pub mod enums;
pub mod mesh;
pub mod obj;
pub mod pipeline;
pub mod segmentation;
pub mod slice_loader;
pub mod slice_writer;
pub mod volume;
