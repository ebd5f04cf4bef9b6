use fast_surface_nets::ndshape::{RuntimeShape, Shape};
use fast_surface_nets::{SurfaceNetsBuffer, surface_nets};
use thiserror::Error;
use tracing::debug;

use crate::volume::Volume;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("volume has no isosurface crossing at level {iso_level}")]
    EmptyIsosurface { iso_level: f32 },
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    /// 0-based vertex indices, three per triangle.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Extract the isosurface of `volume` at `iso_level`.
///
/// The volume is read as the signed field `iso_level - value`, whose zero
/// crossing is the requested level, and contoured with surface nets. Vertex
/// coordinates are voxel indices (row, column, slice) scaled by the volume's
/// spacing.
///
/// # Errors
///
/// Returns [`MeshError::EmptyIsosurface`] when no crossing exists, e.g. for
/// an all-zero volume or a level above every voxel.
pub fn extract_mesh(volume: &Volume, iso_level: f32) -> Result<Mesh, MeshError> {
    let (rows, cols, depth) = volume.dim();
    let shape = RuntimeShape::<u32, 3>::new([rows as u32, cols as u32, depth as u32]);

    let mut field = vec![0.0_f32; shape.size() as usize];
    for ((row, col, slice), &value) in volume.data().indexed_iter() {
        let index = shape.linearize([row as u32, col as u32, slice as u32]);
        field[index as usize] = iso_level - f32::from(value);
    }

    let mut buffer = SurfaceNetsBuffer::default();
    surface_nets(
        &field,
        &shape,
        [0; 3],
        [rows as u32 - 1, cols as u32 - 1, depth as u32 - 1],
        &mut buffer,
    );

    if buffer.positions.is_empty() {
        return Err(MeshError::EmptyIsosurface { iso_level });
    }

    let (row_spacing, col_spacing, depth_spacing) = volume.spacing;
    let vertices = buffer
        .positions
        .iter()
        .map(|&[row, col, slice]| [row * row_spacing, col * col_spacing, slice * depth_spacing])
        .collect();
    let faces = buffer
        .indices
        .chunks_exact(3)
        .map(|triangle| [triangle[0], triangle[1], triangle[2]])
        .collect();

    let mesh = Mesh { vertices, faces };
    debug!(
        "extracted {} vertices and {} faces at level {iso_level}",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}
