/// How slices are ordered before segmentation and stacking.
///
/// Directory enumeration order is platform-dependent, so it is never used
/// implicitly; callers that want it must opt in with [`SliceOrder::Unsorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceOrder {
    /// Lexicographic by file name.
    #[default]
    FileName,
    /// Ascending DICOM `InstanceNumber`.
    InstanceNumber,
    /// Whatever order the directory enumeration yields.
    Unsorted,
}
