use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};
use ndarray::Array2;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SliceWriteError {
    #[error("pixel buffer did not match image dimensions")]
    BufferMismatch,

    #[error("failed to write image to {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Render a slice as an 8-bit grayscale image.
///
/// Intensities are min-max normalized to `[0, 255]`; a constant slice
/// renders all-zero.
pub fn to_grayscale(slice: &Array2<u16>) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let (height, width) = slice.dim();
    let min = slice.iter().copied().min().unwrap_or(0);
    let max = slice.iter().copied().max().unwrap_or(0);
    let scale = if max > min {
        255.0 / f32::from(max - min)
    } else {
        0.0
    };

    let pixel_data: Vec<u8> = slice
        .into_par_iter()
        .map(|&value| (f32::from(value - min) * scale).round() as u8)
        .collect();

    ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
}

/// Write a segmented slice as a grayscale PNG.
pub fn save_png(slice: &Array2<u16>, path: &Path) -> Result<(), SliceWriteError> {
    let image = to_grayscale(slice).ok_or(SliceWriteError::BufferMismatch)?;
    image.save(path).map_err(|source| SliceWriteError::Save {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn normalizes_to_full_range() {
        let slice = ndarray::array![[0_u16, 1000], [400, 0]];

        let image = to_grayscale(&slice).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [255]);
        assert_eq!(image.get_pixel(0, 1).0, [102]);
    }

    #[test]
    fn constant_slice_renders_black() {
        let slice = Array2::from_elem((3, 3), 42);
        let image = to_grayscale(&slice).unwrap();
        assert!(image.pixels().all(|pixel| pixel.0 == [0]));
    }

    #[test]
    fn rows_map_to_image_height() {
        let slice = Array2::<u16>::zeros((2, 3));
        let image = to_grayscale(&slice).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn writes_a_readable_png() {
        let mut slice = Array2::<u16>::zeros((4, 4));
        slice[[1, 1]] = 900;

        let file = NamedTempFile::with_suffix(".png").unwrap();
        save_png(&slice, file.path()).unwrap();

        let read_back = image::open(file.path()).unwrap().to_luma8();
        assert_eq!((read_back.width(), read_back.height()), (4, 4));
        assert_eq!(read_back.get_pixel(1, 1).0, [255]);
        assert_eq!(read_back.get_pixel(0, 0).0, [0]);
    }
}
