//! Wire status codes and the global status table.
//!
//! Every classified error resolves to exactly one [`StatusCode`]. The set is
//! closed and mirrors the canonical RPC status space, so values round-trip
//! through the `code: int32` field of a [`WireStatus`](crate::WireStatus)
//! without translation.
//!
//! # Mapping
//!
//! [`map_code`] turns an HTTP-style local code into a wire code. It is pure
//! and total: anything outside the table resolves to `Internal`.
//!
//! ```rust
//! use status_chain::{map_code, StatusCode};
//!
//! assert_eq!(map_code(200), StatusCode::Ok);
//! assert_eq!(map_code(404), StatusCode::NotFound);
//! assert_eq!(map_code(502), StatusCode::Unavailable);
//! assert_eq!(map_code(418), StatusCode::Internal);
//! ```

use std::fmt;

/// Local "request succeeded" code.
pub const HTTP_OK: i32 = 200;

/// Local "resource missing" code.
pub const HTTP_NOT_FOUND: i32 = 404;

/// Local "upstream failed" code.
pub const HTTP_BAD_GATEWAY: i32 = 502;

// ============================================================================
// Status Code
// ============================================================================

/// Wire-level outcome code.
///
/// Discriminants are the wire values. The enum is `Copy` because it is a
/// classification value, freely extracted and passed around by boundary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum StatusCode {
    /// Not an error.
    Ok = 0,
    /// The operation was cancelled by the caller.
    Cancelled = 1,
    /// Unknown error, including chains nobody classified.
    Unknown = 2,
    /// The caller supplied an invalid argument.
    InvalidArgument = 3,
    /// The deadline expired before the operation completed.
    DeadlineExceeded = 4,
    /// A requested entity was not found.
    NotFound = 5,
    /// The entity the caller tried to create already exists.
    AlreadyExists = 6,
    /// The caller lacks permission for the operation.
    PermissionDenied = 7,
    /// A quota or resource limit was exhausted.
    ResourceExhausted = 8,
    /// The system is not in a state required for the operation.
    FailedPrecondition = 9,
    /// The operation was aborted, typically by a concurrency conflict.
    Aborted = 10,
    /// The operation was attempted past the valid range.
    OutOfRange = 11,
    /// The operation is not implemented or supported.
    Unimplemented = 12,
    /// An internal invariant was broken.
    Internal = 13,
    /// The service is currently unavailable.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The caller has no valid authentication credentials.
    Unauthenticated = 16,
}

impl StatusCode {
    /// Every code in wire order.
    pub const ALL: [StatusCode; 17] = [
        Self::Ok,
        Self::Cancelled,
        Self::Unknown,
        Self::InvalidArgument,
        Self::DeadlineExceeded,
        Self::NotFound,
        Self::AlreadyExists,
        Self::PermissionDenied,
        Self::ResourceExhausted,
        Self::FailedPrecondition,
        Self::Aborted,
        Self::OutOfRange,
        Self::Unimplemented,
        Self::Internal,
        Self::Unavailable,
        Self::DataLoss,
        Self::Unauthenticated,
    ];

    /// Wire value of this code.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Decode a wire value, returning `None` outside the closed set.
    #[inline]
    pub const fn from_i32(value: i32) -> Option<Self> {
        if value < 0 || value as usize >= Self::ALL.len() {
            return None;
        }
        Some(Self::ALL[value as usize])
    }

    /// Canonical name, e.g. `"PermissionDenied"`.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
            Self::InvalidArgument => "InvalidArgument",
            Self::DeadlineExceeded => "DeadlineExceeded",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::PermissionDenied => "PermissionDenied",
            Self::ResourceExhausted => "ResourceExhausted",
            Self::FailedPrecondition => "FailedPrecondition",
            Self::Aborted => "Aborted",
            Self::OutOfRange => "OutOfRange",
            Self::Unimplemented => "Unimplemented",
            Self::Internal => "Internal",
            Self::Unavailable => "Unavailable",
            Self::DataLoss => "DataLoss",
            Self::Unauthenticated => "Unauthenticated",
        }
    }

    /// Whether this code reports success.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<StatusCode> for i32 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.as_i32()
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = UnknownStatusCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value).ok_or(UnknownStatusCode { value })
    }
}

/// A wire value outside the closed [`StatusCode`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatusCode {
    /// The rejected wire value.
    pub value: i32,
}

impl fmt::Display for UnknownStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status code {} is not a known wire code (must be 0-16)", self.value)
    }
}

impl std::error::Error for UnknownStatusCode {}

// ============================================================================
// Global Table
// ============================================================================

/// Map a local HTTP-style code to a wire status code.
///
/// Total: unmapped inputs resolve to [`StatusCode::Internal`].
#[inline]
pub const fn map_code(input: i32) -> StatusCode {
    match input {
        HTTP_OK => StatusCode::Ok,
        HTTP_NOT_FOUND => StatusCode::NotFound,
        HTTP_BAD_GATEWAY => StatusCode::Unavailable,
        _ => StatusCode::Internal,
    }
}
