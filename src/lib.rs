//! # Status Chain
//!
//! Structured error classification and detail aggregation for services that
//! report errors across a process boundary.
//!
//! ## Design Philosophy
//!
//! 1. **Internal code produces rich, typed errors** that carry a status code,
//!    a message, an id, and opaque details
//! 2. **Generic layers wrap freely** without knowing what they wrap
//! 3. **Middleware attaches details** to chains it does not own
//! 4. **The boundary extracts a deterministic triple** (code, message,
//!    details) however deep the root cause sits
//!
//! ## Chain Model
//!
//! A [`Chain`] is a cheap handle to the outermost [`ErrorNode`]. Nodes own
//! their causes, and capabilities are discovered by walking from the
//! outside in (see [`capability`]). Nothing in the lookup, merge, or
//! specialization paths can fail: absent capabilities degrade to defined
//! fallbacks.
//!
//! ## Quick Start
//!
//! ```rust
//! use status_chain::{add_details, Chain, Detail, ExternalError, StatusCode};
//!
//! let root = ExternalError::new(StatusCode::PermissionDenied, "root error", []);
//! let chain = Chain::from(root)
//!     .context("I am some metadata")
//!     .context("I think I know what ID I have");
//!
//! let chain = add_details(chain, [Detail::new("type.example.com/note", b"I am bogus".to_vec())]);
//!
//! let wire = chain.to_wire();
//! assert_eq!(wire.code, StatusCode::PermissionDenied.as_i32());
//! assert_eq!(wire.details.len(), 2); // stack trace + note
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: payload-revealing debug formatting (debug builds only)
//! - `serde`: `Serialize`/`Deserialize` for the wire triple

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use std::sync::Arc;

pub mod boundary;
pub mod capability;
pub mod codes;
pub mod convenience;
pub mod details;
pub mod identity;
pub mod logging;
pub mod merge;
pub mod models;
pub mod wire;

pub use boundary::*;
pub use capability::*;
pub use codes::*;
pub use convenience::*;
pub use details::*;
pub use identity::*;
pub use logging::*;
pub use merge::*;
pub use models::*;
pub use wire::*;

/// Type alias for Results whose error is a chain.
pub type Result<T> = result::Result<T, Chain>;

// ============================================================================
// Chain Handle
// ============================================================================

/// Handle to the outermost node of an error chain.
///
/// Cloning the handle shares the nodes, so in-place detail merges are
/// visible through every clone.
#[derive(Clone)]
#[must_use = "errors should be handled or reported"]
pub struct Chain {
    head: Arc<dyn ErrorNode>,
}

impl Chain {
    /// Start a chain from a root node.
    #[inline]
    pub fn new<N: ErrorNode>(node: N) -> Self {
        Self {
            head: Arc::new(node),
        }
    }

    /// Start a chain from any standard error. The result has no capabilities.
    #[inline]
    pub fn foreign<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::new(Foreign::new(error))
    }

    /// Wrap this chain in a generic context layer.
    #[inline]
    pub fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Wrapped::new(context, self))
    }

    /// The outermost node.
    #[inline]
    pub fn node(&self) -> &(dyn ErrorNode + 'static) {
        &*self.head
    }

    /// Whether both handles point at the same outermost node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.head, &other.head)
    }

    /// Address of the outermost node, for identity checks during traversal.
    #[inline]
    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.head) as *const ()
    }

    /// Pre-order walk over every node, outermost first.
    #[inline]
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Outermost node satisfying capability `C`.
    #[inline]
    pub fn find<C: Capability>(&self) -> Option<&C::Target> {
        find_capability::<C>(self)
    }

    /// Full rendered message, context layers included.
    #[inline]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Details as read through the outermost detail-bearing node.
    pub fn details(&self) -> Vec<Detail> {
        self.find::<ReadDetails>()
            .map(|node| node.details())
            .unwrap_or_default()
    }

    /// Id of the outermost id-bearing node.
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.find::<Identify>().map(|node| node.id())
    }

    /// Outermost classification-bearing node.
    #[inline]
    pub fn classify(&self) -> Option<&dyn Classifiable> {
        boundary::classify(self)
    }

    /// Wire code of the chain, `Unknown` when unclassified.
    #[inline]
    pub fn code(&self) -> StatusCode {
        boundary::status_code(self)
    }

    /// Display-normalized view, falling back to the unhandled sentinel.
    #[inline]
    pub fn special(&self) -> Special {
        boundary::special_of(self)
    }

    /// Merge `details` into the chain. See [`add_details`].
    #[inline]
    pub fn add_details<I>(self, details: I) -> Self
    where
        I: IntoIterator<Item = Detail>,
    {
        merge::add_details(self, details)
    }

    /// Render the boundary triple. See [`boundary::to_wire`].
    #[inline]
    pub fn to_wire(&self) -> WireStatus {
        boundary::to_wire(self)
    }

    /// Structured internal log view borrowing from this chain.
    ///
    /// ```rust
    /// # use status_chain::{Chain, ExternalError, StatusCode};
    /// let chain = Chain::from(ExternalError::new(StatusCode::Internal, "boom", []));
    /// let log = chain.internal_log();
    /// assert_eq!(log.code(), StatusCode::Internal);
    /// ```
    #[inline]
    pub fn internal_log(&self) -> ChainLog<'_> {
        ChainLog::new(self)
    }

    /// Callback-style logging; the view dies when `f` returns.
    #[inline]
    pub fn with_internal_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ChainLog<'_>) -> R,
    {
        let log = self.internal_log();
        f(&log)
    }
}

impl<N: ErrorNode> From<N> for Chain {
    #[inline]
    fn from(node: N) -> Self {
        Self::new(node)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.head, f)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.head, f)
    }
}

impl Error for Chain {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.head.source()
    }
}

// ============================================================================
// Generic Nodes
// ============================================================================

/// Generic context layer: a string plus exactly one cause.
///
/// Renders as `"{context}: {cause}"`. Carries no capabilities of its own.
#[derive(Debug)]
pub struct Wrapped {
    context: Cow<'static, str>,
    cause: Chain,
}

impl Wrapped {
    /// Wrap `cause` with `context`.
    #[inline]
    pub fn new(context: impl Into<Cow<'static, str>>, cause: Chain) -> Self {
        Self {
            context: context.into(),
            cause,
        }
    }

    /// The context string.
    #[inline]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The wrapped chain.
    #[inline]
    pub fn cause(&self) -> &Chain {
        &self.cause
    }
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.cause)
    }
}

impl Error for Wrapped {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

impl ErrorNode for Wrapped {
    fn causes(&self) -> &[Chain] {
        std::slice::from_ref(&self.cause)
    }
}

/// A standard error adopted as a chain root.
pub struct Foreign {
    inner: Box<dyn Error + Send + Sync + 'static>,
}

impl Foreign {
    /// Adopt `error`.
    #[inline]
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(error),
        }
    }

    /// The adopted error.
    #[inline]
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.inner
    }
}

impl fmt::Debug for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Foreign").field(&self.inner).finish()
    }
}

impl fmt::Display for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for Foreign {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

impl ErrorNode for Foreign {}
