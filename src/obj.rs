use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::mesh::Mesh;

#[derive(Debug, Error)]
#[error("failed to write mesh to {}", .path.display())]
pub struct ObjWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Save a mesh as a Wavefront OBJ file.
///
/// Writes one `v x y z` line per vertex and one `f i j k` line per triangle,
/// both in input order; face indices are 1-based as the format requires. No
/// normals, texture coordinates or materials are emitted. The parent
/// directory must already exist.
pub fn save_obj(mesh: &Mesh, path: &Path) -> Result<(), ObjWriteError> {
    let io_context = |source| ObjWriteError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_context)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, mesh).map_err(io_context)?;

    info!(
        "saved {} vertices and {} faces to {}",
        mesh.vertex_count(),
        mesh.face_count(),
        path.display()
    );
    Ok(())
}

fn write_records(writer: &mut impl Write, mesh: &Mesh) -> io::Result<()> {
    for vertex in &mesh.vertices {
        writeln!(writer, "v {} {} {}", vertex[0], vertex[1], vertex[2])?;
    }
    for face in &mesh.faces {
        writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    fn quad_mesh() -> Mesh {
        Mesh {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.25],
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    #[test]
    fn round_trips_vertices_and_faces() {
        let file = NamedTempFile::with_suffix(".obj").unwrap();
        let mesh = quad_mesh();
        save_obj(&mesh, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for line in contents.lines() {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    let coords: Vec<f32> =
                        fields.map(|f| f.parse().unwrap()).collect();
                    vertices.push(coords);
                }
                Some("f") => {
                    let indices: Vec<u32> =
                        fields.map(|f| f.parse().unwrap()).collect();
                    faces.push(indices);
                }
                other => panic!("unexpected record: {other:?}"),
            }
        }

        assert_eq!(vertices.len(), 4);
        for (written, original) in vertices.iter().zip(&mesh.vertices) {
            for axis in 0..3 {
                assert_relative_eq!(written[axis], original[axis], epsilon = 1e-6);
            }
        }

        assert_eq!(faces, vec![vec![1, 2, 3], vec![1, 3, 4]]);
    }

    #[test]
    fn face_indices_are_one_based() {
        let file = NamedTempFile::with_suffix(".obj").unwrap();
        save_obj(&quad_mesh(), file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.lines().any(|line| line == "f 1 2 3"));
        assert!(!contents.lines().any(|line| line.starts_with("f 0")));
    }

    #[test]
    fn missing_parent_directory_is_an_error() {
        let error = save_obj(
            &quad_mesh(),
            Path::new("/nonexistent-knee-mesh-dir/mesh.obj"),
        )
        .unwrap_err();
        assert!(error.path.ends_with("mesh.obj"));
    }
}
