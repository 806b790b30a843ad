use thiserror::Error;

/// Result type for splitter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a per-frame snapshot is structurally inconsistent.
///
/// These are caller errors: the offending frame is rejected as a whole and
/// any previously recorded state for its source id is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("label array has {actual} entries but the mesh has {expected} triangles")]
    LabelCountMismatch { expected: usize, actual: usize },

    #[error("label {label} is outside the domain of {domain_len} labels")]
    LabelOutOfRange { label: u16, domain_len: usize },

    #[error("triangle index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("malformed mesh buffers: {0}")]
    MalformedBuffers(String),

    #[error("trackable id '{0}' does not match the expected <hex16>-<hex16> form")]
    TrackableIdFormat(String),
}
