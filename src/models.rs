//! Concrete error kinds and the values derived from them.
//!
//! # Kinds
//!
//! - [`ExternalError`]: a full status (code, message, details) plus an id.
//!   Construction appends a stack-trace detail.
//! - [`SpecialError`]: a small named/coded payload plus an id.
//! - [`HappyError`]: the "no failure" sentinel; always `Ok`.
//! - [`DetailOnlyError`]: a bare detail carrier, spliced in by the merge.
//! - [`RemoteError`]: a status received from a peer; its details are
//!   read-only.
//!
//! # Identity
//!
//! Ids are drawn once, at construction, from a [`Provenance`]. The plain
//! constructors use [`Provenance::global`]; the `with_provenance` variants
//! take an explicit bundle.

use crate::{
    Classifiable, DetailBearing, DetailList, DetailSink, ErrorNode, Identifiable, Provenance,
    StatusCode, STACK_TRACE_TYPE_TAG, codes, Detail,
};
use std::borrow::Cow;
use std::fmt;

/// Fixed id of every [`HappyError`].
pub const HAPPY_ID: &str = "∞";

/// Message of every [`DetailOnlyError`].
pub const DETAILS_ATTACHED: &str = "(details attached)";

/// Name and description of the unhandled-error sentinel.
pub const UNHANDLED_ERROR: &str = "unhandled error";

// ============================================================================
// Derived Values
// ============================================================================

/// Display-normalized view of an error.
///
/// Never stored on a chain; always derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Special {
    /// Short name.
    pub name: String,
    /// Human description.
    pub description: String,
    /// Numeric code; HTTP-style for `SpecialError`, wire-style otherwise.
    pub code: i32,
}

impl Special {
    /// Build a special view.
    pub fn new(name: impl Into<String>, description: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            code,
        }
    }

    /// Fallback for chains with no classification-bearing node.
    pub fn unhandled() -> Self {
        Self::new(UNHANDLED_ERROR, UNHANDLED_ERROR, StatusCode::Unknown.as_i32())
    }

    /// The view of [`HappyError`].
    pub fn happiness() -> Self {
        Self::new("Happiness", "Happy", codes::HTTP_OK)
    }
}

/// Full status object of a classified node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Wire code.
    pub code: StatusCode,
    /// Status message.
    pub message: String,
    /// Ordered details.
    pub details: Vec<Detail>,
}

impl Status {
    /// Status without details.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Replace the details.
    pub fn with_details(mut self, details: impl IntoIterator<Item = Detail>) -> Self {
        self.details = details.into_iter().collect();
        self
    }
}

// ============================================================================
// External Error
// ============================================================================

/// Error carrying a full status and a unique id.
///
/// The detail list grows in place, so every handle to a chain containing
/// this node observes details merged later.
pub struct ExternalError {
    id: String,
    code: StatusCode,
    message: Cow<'static, str>,
    details: DetailList,
}

impl ExternalError {
    /// Create an error using the global provenance.
    ///
    /// `details` come first; the stack-trace detail is appended after them.
    pub fn new(
        code: StatusCode,
        message: impl Into<Cow<'static, str>>,
        details: impl IntoIterator<Item = Detail>,
    ) -> Self {
        Self::with_provenance(Provenance::global(), code, message, details)
    }

    /// Create an error drawing id and stack from `provenance`.
    pub fn with_provenance(
        provenance: &Provenance,
        code: StatusCode,
        message: impl Into<Cow<'static, str>>,
        details: impl IntoIterator<Item = Detail>,
    ) -> Self {
        let details: DetailList = details.into_iter().collect();
        details.push(Detail::new(STACK_TRACE_TYPE_TAG, provenance.capture_stack()));

        Self {
            id: provenance.next_id(),
            code,
            message: message.into(),
            details,
        }
    }
}

impl fmt::Debug for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalError")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("details", &self.details)
            .finish()
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExternalError {}

impl Classifiable for ExternalError {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn status(&self) -> Status {
        Status::new(self.code, &*self.message).with_details(self.details.snapshot())
    }

    fn code(&self) -> StatusCode {
        self.code
    }

    fn special(&self) -> Special {
        Special::new(self.code.name(), &*self.message, self.code.as_i32())
    }
}

impl DetailBearing for ExternalError {
    fn details(&self) -> Vec<Detail> {
        self.details.snapshot()
    }

    fn detail_count(&self) -> usize {
        self.details.len()
    }
}

impl DetailSink for ExternalError {
    fn append_details(&self, details: Vec<Detail>) {
        self.details.extend(details);
    }
}

impl Identifiable for ExternalError {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ErrorNode for ExternalError {
    fn as_classifiable(&self) -> Option<&(dyn Classifiable + 'static)> {
        Some(self)
    }

    fn as_detail_bearing(&self) -> Option<&(dyn DetailBearing + 'static)> {
        Some(self)
    }

    fn as_detail_sink(&self) -> Option<&(dyn DetailSink + 'static)> {
        Some(self)
    }

    fn as_identifiable(&self) -> Option<&(dyn Identifiable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Special Error
// ============================================================================

/// Wire code for a [`SpecialError`]'s own numeric code.
///
/// Same shape as [`codes::map_code`] but an independent table.
// TODO: confirm with product whether this table should track map_code or diverge.
#[inline]
pub const fn special_status_code(code: i32) -> StatusCode {
    match code {
        200 => StatusCode::Ok,
        404 => StatusCode::NotFound,
        502 => StatusCode::Unavailable,
        _ => StatusCode::Internal,
    }
}

/// Error wrapping a [`Special`] payload.
#[derive(Debug)]
pub struct SpecialError {
    id: String,
    data: Special,
}

impl SpecialError {
    /// Create an error using the global provenance.
    pub fn new(data: Special) -> Self {
        Self::with_provenance(Provenance::global(), data)
    }

    /// Create an error drawing its id from `provenance`.
    pub fn with_provenance(provenance: &Provenance, data: Special) -> Self {
        Self {
            id: provenance.next_id(),
            data,
        }
    }

    /// The payload.
    #[inline]
    pub fn data(&self) -> &Special {
        &self.data
    }
}

impl fmt::Display for SpecialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "special error: {} ({})", self.data.name, self.data.code)
    }
}

impl std::error::Error for SpecialError {}

impl Classifiable for SpecialError {
    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn status(&self) -> Status {
        Status::new(self.code(), self.data.name.as_str())
    }

    fn code(&self) -> StatusCode {
        special_status_code(self.data.code)
    }

    fn special(&self) -> Special {
        self.data.clone()
    }
}

impl Identifiable for SpecialError {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ErrorNode for SpecialError {
    fn as_classifiable(&self) -> Option<&(dyn Classifiable + 'static)> {
        Some(self)
    }

    fn as_identifiable(&self) -> Option<&(dyn Identifiable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Happy Error
// ============================================================================

/// Success sentinel flowing through the same machinery as real errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HappyError;

impl fmt::Display for HappyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Happy")
    }
}

impl std::error::Error for HappyError {}

impl Classifiable for HappyError {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("Happy")
    }

    fn status(&self) -> Status {
        Status::new(StatusCode::Ok, "happy")
    }

    fn code(&self) -> StatusCode {
        StatusCode::Ok
    }

    fn special(&self) -> Special {
        Special::happiness()
    }
}

impl Identifiable for HappyError {
    fn id(&self) -> &str {
        HAPPY_ID
    }
}

impl ErrorNode for HappyError {
    fn as_classifiable(&self) -> Option<&(dyn Classifiable + 'static)> {
        Some(self)
    }

    fn as_identifiable(&self) -> Option<&(dyn Identifiable + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Detail-Only Error
// ============================================================================

/// Pure detail carrier with no message of its own and no cause.
#[derive(Debug, Default)]
pub struct DetailOnlyError {
    details: DetailList,
}

impl DetailOnlyError {
    /// Carrier holding `details` in order.
    pub fn new(details: impl IntoIterator<Item = Detail>) -> Self {
        Self {
            details: details.into_iter().collect(),
        }
    }
}

impl fmt::Display for DetailOnlyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DETAILS_ATTACHED)
    }
}

impl std::error::Error for DetailOnlyError {}

impl DetailBearing for DetailOnlyError {
    fn details(&self) -> Vec<Detail> {
        self.details.snapshot()
    }

    fn detail_count(&self) -> usize {
        self.details.len()
    }
}

impl DetailSink for DetailOnlyError {
    fn append_details(&self, details: Vec<Detail>) {
        self.details.extend(details);
    }
}

impl ErrorNode for DetailOnlyError {
    fn as_detail_bearing(&self) -> Option<&(dyn DetailBearing + 'static)> {
        Some(self)
    }

    fn as_detail_sink(&self) -> Option<&(dyn DetailSink + 'static)> {
        Some(self)
    }
}

// ============================================================================
// Remote Error
// ============================================================================

/// A status received from an upstream peer.
///
/// The peer owns these details; they are exposed read-only, so merging new
/// details into a chain rooted here splices a carrier instead of mutating.
#[derive(Debug)]
pub struct RemoteError {
    status: Status,
}

impl RemoteError {
    /// Adopt a received status.
    pub fn new(status: Status) -> Self {
        Self { status }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status.message)
    }
}

impl std::error::Error for RemoteError {}

impl Classifiable for RemoteError {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.status.message)
    }

    fn status(&self) -> Status {
        self.status.clone()
    }

    fn code(&self) -> StatusCode {
        self.status.code
    }

    fn special(&self) -> Special {
        Special::new(
            self.status.code.name(),
            self.status.message.as_str(),
            self.status.code.as_i32(),
        )
    }
}

impl DetailBearing for RemoteError {
    fn details(&self) -> Vec<Detail> {
        self.status.details.clone()
    }

    fn detail_count(&self) -> usize {
        self.status.details.len()
    }
}

impl ErrorNode for RemoteError {
    fn as_classifiable(&self) -> Option<&(dyn Classifiable + 'static)> {
        Some(self)
    }

    fn as_detail_bearing(&self) -> Option<&(dyn DetailBearing + 'static)> {
        Some(self)
    }
}
