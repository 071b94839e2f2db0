/// Failures reported by the render coordinator and buffer construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// Malformed rectangle, bad stride, or mismatched source/destination shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Bit depth the kernel has no instantiation for.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// The host raised its abort signal between rows.
    #[error("render aborted after {rows_done} of {rows_total} rows")]
    Aborted { rows_done: u32, rows_total: u32 },
}
