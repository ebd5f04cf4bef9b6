use std::collections::VecDeque;

use ndarray::{Array2, Zip};
use thiserror::Error;

/// Histogram resolution for threshold selection.
const OTSU_BINS: usize = 256;

/// Offsets of the 8-connected neighborhood.
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("thresholding produced no foreground region")]
    NoForegroundRegion,
}

/// One 8-connected foreground component.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Region {
    pub(crate) label: u32,
    pub(crate) area: usize,
}

/// Isolate the largest bright structure in a slice.
///
/// Thresholds the image with Otsu's method, labels the 8-connected
/// components of the `value > threshold` mask and keeps the pixels of the
/// component with the largest area, zeroing everything else. The output
/// always shares the input's shape.
///
/// # Errors
///
/// Returns [`SegmentationError::NoForegroundRegion`] when the mask is empty,
/// which includes any single-valued input.
pub fn segment(image: &Array2<u16>) -> Result<Array2<u16>, SegmentationError> {
    let threshold = otsu_threshold(image);
    let mask = image.mapv(|value| value > threshold);
    let (labels, regions) = label_components(&mask);
    let knee = largest_region(&regions).ok_or(SegmentationError::NoForegroundRegion)?;

    Ok(Zip::from(image)
        .and(&labels)
        .map_collect(|&value, &label| if label == knee.label { value } else { 0 }))
}

/// Global threshold maximizing inter-class variance.
///
/// Histograms the image into 256 bins spanning the observed intensity range
/// and returns the lower edge of the first bin that maximizes the variance
/// between the two classes. A single-valued image yields that value, so the
/// strict `>` foreground test selects nothing.
pub fn otsu_threshold(image: &Array2<u16>) -> u16 {
    let min = image.iter().copied().min().unwrap_or(0);
    let max = image.iter().copied().max().unwrap_or(0);
    if min == max {
        return min;
    }

    let bin_width = f64::from(max - min) / OTSU_BINS as f64;
    let mut histogram = [0usize; OTSU_BINS];
    for &value in image {
        let bin = (f64::from(value - min) / bin_width) as usize;
        histogram[bin.min(OTSU_BINS - 1)] += 1;
    }

    let total = image.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(bin, &count)| bin as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut best_variance = 0.0;
    let mut best_bin = 0;

    for (bin, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0.0 {
            break;
        }
        sum_background += bin as f64 * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;
        let variance = weight_background
            * weight_foreground
            * (mean_background - mean_foreground).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_bin = bin;
        }
    }

    min + (best_bin as f64 * bin_width) as u16
}

/// Label 8-connected foreground components.
///
/// Components are numbered from 1 in raster-scan discovery order; background
/// stays 0. Also returns the per-component areas in label order.
pub(crate) fn label_components(mask: &Array2<bool>) -> (Array2<u32>, Vec<Region>) {
    let (rows, cols) = mask.dim();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            if !mask[[row, col]] || labels[[row, col]] != 0 {
                continue;
            }

            let label = regions.len() as u32 + 1;
            let mut area = 0;
            labels[[row, col]] = label;
            queue.push_back((row, col));

            while let Some((r, c)) = queue.pop_front() {
                area += 1;
                for (dr, dc) in NEIGHBORS {
                    let (nr, nc) = (r as isize + dr, c as isize + dc);
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if mask[[nr, nc]] && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = label;
                        queue.push_back((nr, nc));
                    }
                }
            }

            regions.push(Region { label, area });
        }
    }

    (labels, regions)
}

/// First region with strictly maximum area, in label order.
fn largest_region(regions: &[Region]) -> Option<Region> {
    regions.iter().copied().fold(None, |best, region| match best {
        Some(current) if region.area > current.area => Some(region),
        None => Some(region),
        _ => best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn grid_with_block(background: u16) -> Array2<u16> {
        let mut grid = Array2::from_elem((8, 8), background);
        grid.slice_mut(s![1..4, 1..4]).fill(200);
        grid
    }

    #[test]
    fn otsu_separates_bimodal_values() {
        let grid = grid_with_block(10);
        let threshold = otsu_threshold(&grid);
        assert!((10..200).contains(&threshold));
    }

    #[test]
    fn keeps_single_bright_component() {
        let grid = grid_with_block(10);
        let segmented = segment(&grid).unwrap();
        for ((row, col), &value) in segmented.indexed_iter() {
            if (1..4).contains(&row) && (1..4).contains(&col) {
                assert_eq!(value, 200);
            } else {
                assert_eq!(value, 0);
            }
        }
    }

    #[test]
    fn uniform_grid_has_no_foreground() {
        let grid = Array2::from_elem((4, 4), 7);
        assert!(matches!(
            segment(&grid),
            Err(SegmentationError::NoForegroundRegion)
        ));
    }

    #[test]
    fn keeps_largest_of_two_components() {
        let mut grid = Array2::from_elem((10, 10), 10);
        grid.slice_mut(s![1..4, 1..4]).fill(200);
        grid.slice_mut(s![6..8, 6..8]).fill(200);

        let segmented = segment(&grid).unwrap();
        assert_eq!(segmented[[1, 1]], 200);
        assert_eq!(segmented[[6, 6]], 0);
    }

    #[test]
    fn area_tie_keeps_first_component() {
        let mut grid = Array2::from_elem((6, 8), 10);
        grid.slice_mut(s![1..3, 1..3]).fill(200);
        grid.slice_mut(s![1..3, 5..7]).fill(200);

        let segmented = segment(&grid).unwrap();
        assert_eq!(segmented[[1, 1]], 200);
        assert_eq!(segmented[[1, 5]], 0);
    }

    #[test]
    fn diagonal_pixels_form_one_component() {
        let mut grid = Array2::from_elem((7, 7), 10);
        grid[[1, 1]] = 200;
        grid[[2, 2]] = 200;
        grid[[3, 3]] = 200;
        grid[[5, 5]] = 200;

        let segmented = segment(&grid).unwrap();
        assert_eq!(segmented[[1, 1]], 200);
        assert_eq!(segmented[[2, 2]], 200);
        assert_eq!(segmented[[3, 3]], 200);
        assert_eq!(segmented[[5, 5]], 0);
    }

    #[test]
    fn segmenting_a_segmented_slice_is_stable() {
        let grid = grid_with_block(10);
        let once = segment(&grid).unwrap();
        let twice = segment(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn labels_count_areas() {
        let mut mask = Array2::from_elem((5, 5), false);
        mask[[0, 0]] = true;
        mask[[4, 4]] = true;
        mask[[4, 3]] = true;

        let (labels, regions) = label_components(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].area, 1);
        assert_eq!(regions[1].area, 2);
        assert_eq!(labels[[0, 0]], 1);
        assert_eq!(labels[[4, 3]], 2);
        assert_eq!(labels[[4, 4]], 2);
    }
}
