use crate::page::SlotKind;

/// Result codes returned through the status channel.
///
/// Every failure maps to exactly one negative code; non-negative statuses are
/// operation results.
pub mod code {
    pub const ARITY_MISMATCH: i32 = -12;
    pub const OUT_OF_RANGE: i32 = -13;
    pub const NULL_HANDLE: i32 = -14;
    pub const TYPE_MISMATCH: i32 = -15;
    pub const ALLOC_FAILED: i32 = -22;
    pub const MAP_FAILED: i32 = -23;
    pub const UNKNOWN_OPERATION: i32 = -38;
    /// OS errors are reported as `OS_ERROR_BASE - errno`.
    pub const OS_ERROR_BASE: i32 = -1000;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("[{op}] params len mismatch! expected {expected} actual {actual}")]
    ArityMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("[{op}] input [{param}={index}] out of range! the index limit is [0, {capacity})")]
    OutOfRange {
        op: &'static str,
        param: &'static str,
        index: u64,
        capacity: usize,
    },

    #[error("[{op}] input [{param}={index}] got nullptr!")]
    NullHandle {
        op: &'static str,
        param: &'static str,
        index: usize,
    },

    #[error("[{op}] input [{param}={index}] holds a {found:?} handle, expected {expected}")]
    TypeMismatch {
        op: &'static str,
        param: &'static str,
        index: usize,
        expected: &'static str,
        found: SlotKind,
    },

    #[error("[{op}] failed to allocate {size} bytes")]
    AllocFailed { op: &'static str, size: u64 },

    #[error("[{op}] mmap failed: errno={errno}")]
    MapFailed { op: &'static str, errno: i32 },

    #[error("[{op}] os error: errno={errno}")]
    Os { op: &'static str, errno: i32 },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl PageError {
    /// The negative status code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            PageError::ArityMismatch { .. } => code::ARITY_MISMATCH,
            PageError::OutOfRange { .. } => code::OUT_OF_RANGE,
            PageError::NullHandle { .. } => code::NULL_HANDLE,
            PageError::TypeMismatch { .. } => code::TYPE_MISMATCH,
            PageError::AllocFailed { .. } => code::ALLOC_FAILED,
            PageError::MapFailed { .. } => code::MAP_FAILED,
            PageError::UnknownOperation(_) => code::UNKNOWN_OPERATION,
            PageError::Os { errno, .. } => code::OS_ERROR_BASE.saturating_sub(*errno),
        }
    }

    /// Capture `errno` of the last failed libc call.
    pub(crate) fn last_os(op: &'static str) -> Self {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        PageError::Os { op, errno }
    }

    /// Look up the status code of a variant by name, e.g. `"NullHandle"`.
    ///
    /// `Os` has no fixed code and is not accepted.
    pub fn from_name(name: &str) -> Option<i32> {
        let code = match name {
            "ArityMismatch" => code::ARITY_MISMATCH,
            "OutOfRange" => code::OUT_OF_RANGE,
            "NullHandle" => code::NULL_HANDLE,
            "TypeMismatch" => code::TYPE_MISMATCH,
            "AllocFailed" => code::ALLOC_FAILED,
            "MapFailed" => code::MAP_FAILED,
            "UnknownOperation" => code::UNKNOWN_OPERATION,
            _ => return None,
        };
        Some(code)
    }
}

/// Flatten a call result into the 32-bit status returned to foreign hosts.
///
/// Results wider than 32 bits keep only their low half.
pub fn status(result: &Result<i64, PageError>) -> i32 {
    match result {
        Ok(v) => *v as i32,
        Err(e) => e.code(),
    }
}
