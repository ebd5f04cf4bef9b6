use crate::enums::SliceOrder;

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, s};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SliceLoaderError {
    #[error("no decodable DICOM slices in {}", .0.display())]
    NoValidImages(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single slice file was skipped.
#[derive(Debug, Error)]
enum DecodeError {
    #[error("DICOM read error: {0}")]
    Read(#[from] dicom::object::ReadError),

    #[error("pixel data error: {0}")]
    Pixels(#[from] dicom::pixeldata::Error),
}

/// One decoded slice and the file name it came from.
#[derive(Debug, Clone)]
pub struct SliceImage {
    pub name: String,
    pub pixels: Array2<u16>,
}

impl SliceImage {
    /// File name without its extension, used to derive output names.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }
}

pub struct SliceLoader;

impl SliceLoader {
    /// Load every decodable `.dcm` slice in a directory.
    ///
    /// Files that fail to open or decode are skipped with a warning; one bad
    /// slice does not abort the batch.
    ///
    /// # Errors
    ///
    /// Returns [`SliceLoaderError::NoValidImages`] if the directory holds no
    /// `.dcm` files or none of them decodes.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        order: SliceOrder,
    ) -> Result<Vec<SliceImage>, SliceLoaderError> {
        let path = path.as_ref();
        let mut paths = Self::collect_dicom_paths(path)?;
        if paths.is_empty() {
            return Err(SliceLoaderError::NoValidImages(path.to_path_buf()));
        }

        if matches!(order, SliceOrder::FileName) {
            paths.sort_by_key(|p| p.file_name().map(|name| name.to_os_string()));
        }

        let mut slices_with_order = Vec::new();
        for file_path in &paths {
            match Self::load_slice(file_path, order) {
                Ok(entry) => slices_with_order.push(entry),
                Err(error) => warn!("skipping {}: {error}", file_path.display()),
            }
        }
        if slices_with_order.is_empty() {
            return Err(SliceLoaderError::NoValidImages(path.to_path_buf()));
        }

        if matches!(order, SliceOrder::InstanceNumber) {
            slices_with_order
                .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }

        debug!(
            "loaded {} of {} slices from {}",
            slices_with_order.len(),
            paths.len(),
            path.display()
        );

        Ok(slices_with_order
            .into_iter()
            .map(|(_, slice)| slice)
            .collect())
    }

    fn collect_dicom_paths(path: &Path) -> Result<Vec<PathBuf>, SliceLoaderError> {
        Ok(fs::read_dir(path)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect())
    }

    fn load_slice(
        path: &Path,
        order: SliceOrder,
    ) -> Result<(Option<f32>, SliceImage), DecodeError> {
        let dicom_object = open_file(path)?;
        let pixels = Self::decode_image(&dicom_object)?;
        let sort_key = Self::get_sort_order(&dicom_object, order);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok((sort_key, SliceImage { name, pixels }))
    }

    fn decode_image(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Array2<u16>, DecodeError> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::First);
        let array = pixel_data.to_ndarray_with_options::<u16>(&options)?;
        Ok(array.slice_move(s![0, .., .., 0]))
    }

    fn get_sort_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        order: SliceOrder,
    ) -> Option<f32> {
        match order {
            SliceOrder::InstanceNumber => dicom_object
                .element(tags::INSTANCE_NUMBER)
                .ok()?
                .to_int::<i32>()
                .ok()
                .map(|n| n as f32),
            SliceOrder::FileName | SliceOrder::Unsorted => None,
        }
    }
}
