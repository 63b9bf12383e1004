use thiserror::Error;

/// Error codes from sparse format checks.
#[derive(Error, Debug)]
pub enum SparseFormatError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Data is not sorted by row index within each column")]
    BadRowval,
    #[error("Column pointers are not monotonically increasing")]
    BadColptr,
}
