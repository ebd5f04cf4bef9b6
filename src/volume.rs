use ndarray::{Array2, Array3, s};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("cannot assemble a volume from an empty slice series")]
    EmptySeries,

    #[error("slice {index} has dimensions {found:?}, expected {expected:?}")]
    InconsistentDimensions {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Scalar volume together with its physical voxel spacing.
#[derive(Debug, Clone)]
pub struct Volume {
    pub data: Array3<u16>,
    pub spacing: (f32, f32, f32),
}

impl Volume {
    pub fn new(data: Array3<u16>, spacing: (f32, f32, f32)) -> Self {
        Self { data, spacing }
    }

    /// Get the dimensions of the volume (rows, columns, depth)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Stack segmented slices into a volume, zero-padded between slices.
    ///
    /// Each slice is preceded by `filler_slices` all-zero planes, so `n`
    /// slices produce a depth of `n * (filler_slices + 1)` along the new
    /// trailing axis. `filler_slices = 0` is plain stacking.
    ///
    /// # Errors
    ///
    /// Fails if the series is empty or any slice differs in shape from the
    /// first.
    pub fn assemble(
        slices: &[Array2<u16>],
        filler_slices: usize,
        spacing: (f32, f32, f32),
    ) -> Result<Self, VolumeError> {
        let first = slices.first().ok_or(VolumeError::EmptySeries)?;
        let (rows, cols) = first.dim();
        for (index, slice) in slices.iter().enumerate() {
            if slice.dim() != (rows, cols) {
                return Err(VolumeError::InconsistentDimensions {
                    index,
                    expected: (rows, cols),
                    found: slice.dim(),
                });
            }
        }

        let depth = slices.len() * (filler_slices + 1);
        let mut data = Array3::<u16>::zeros((rows, cols, depth));
        for (i, slice) in slices.iter().enumerate() {
            let plane = i * (filler_slices + 1) + filler_slices;
            data.slice_mut(s![.., .., plane]).assign(slice);
        }

        Ok(Self::new(data, spacing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACING: (f32, f32, f32) = (0.5, 0.5, 0.5);

    #[test]
    fn interleaves_filler_before_each_slice() {
        let g1 = Array2::from_elem((3, 3), 7);
        let g2 = Array2::from_elem((3, 3), 9);

        let volume = Volume::assemble(&[g1.clone(), g2.clone()], 2, SPACING).unwrap();
        assert_eq!(volume.dim(), (3, 3, 6));

        for plane in [0, 1, 3, 4] {
            assert!(
                volume.data().slice(s![.., .., plane]).iter().all(|&v| v == 0),
                "plane {plane} should be filler"
            );
        }
        assert_eq!(volume.data().slice(s![.., .., 2]), g1);
        assert_eq!(volume.data().slice(s![.., .., 5]), g2);
    }

    #[test]
    fn zero_filler_is_plain_stacking() {
        let g1 = Array2::from_elem((2, 4), 1);
        let g2 = Array2::from_elem((2, 4), 2);
        let g3 = Array2::from_elem((2, 4), 3);

        let volume = Volume::assemble(&[g1, g2, g3], 0, SPACING).unwrap();
        assert_eq!(volume.dim(), (2, 4, 3));
        assert_eq!(volume.data()[[0, 0, 0]], 1);
        assert_eq!(volume.data()[[0, 0, 1]], 2);
        assert_eq!(volume.data()[[0, 0, 2]], 3);
    }

    #[test]
    fn rejects_mismatched_slice_shapes() {
        let g1 = Array2::from_elem((3, 3), 1);
        let g2 = Array2::from_elem((2, 3), 1);

        let error = Volume::assemble(&[g1, g2], 5, SPACING).unwrap_err();
        assert!(matches!(
            error,
            VolumeError::InconsistentDimensions {
                index: 1,
                expected: (3, 3),
                found: (2, 3),
            }
        ));
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(
            Volume::assemble(&[], 5, SPACING),
            Err(VolumeError::EmptySeries)
        ));
    }
}
