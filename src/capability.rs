//! Capability contracts and the chain traversal every lookup is built on.
//!
//! Capabilities are structural: a node satisfies one by returning `Some`
//! from the matching `ErrorNode::as_*` accessor. Each concrete kind declares
//! its set in its `ErrorNode` impl, so lookup is a plain dispatch and never
//! reflection.
//!
//! | Marker | Contract | Satisfied by |
//! |---|---|---|
//! | [`Classify`] | [`Classifiable`] | `ExternalError`, `SpecialError`, `HappyError`, `RemoteError` |
//! | [`ReadDetails`] | [`DetailBearing`] | `ExternalError`, `DetailOnlyError`, `RemoteError` |
//! | [`MutableDetails`] | [`DetailSink`] | `ExternalError`, `DetailOnlyError` |
//! | [`Identify`] | [`Identifiable`] | `ExternalError`, `SpecialError`, `HappyError` |
//!
//! # Traversal
//!
//! [`find_capability`] walks depth-first, pre-order, starting at the
//! outermost node and visiting a node's causes in declaration order. It
//! returns the first conforming node. Causes are fixed at construction, so
//! the walk ends when every branch reaches a root. A node reachable along
//! more than one branch is visited only the first time.

use crate::{Chain, Detail, Special, Status, StatusCode};
use smallvec::SmallVec;
use std::borrow::Cow;

/// A unit of an error chain.
///
/// Every accessor defaults to "not supported"; kinds override the ones they
/// satisfy.
pub trait ErrorNode: std::error::Error + Send + Sync + 'static {
    /// Causes in traversal order. Roots have none.
    fn causes(&self) -> &[Chain] {
        &[]
    }

    /// This node as a classification source.
    fn as_classifiable(&self) -> Option<&(dyn Classifiable + 'static)> {
        None
    }

    /// This node as a read-only detail source.
    fn as_detail_bearing(&self) -> Option<&(dyn DetailBearing + 'static)> {
        None
    }

    /// This node as an in-place detail sink.
    fn as_detail_sink(&self) -> Option<&(dyn DetailSink + 'static)> {
        None
    }

    /// This node as an id bearer.
    fn as_identifiable(&self) -> Option<&(dyn Identifiable + 'static)> {
        None
    }
}

/// Has a message and a wire classification.
pub trait Classifiable {
    /// Human-readable message of this node alone.
    fn message(&self) -> Cow<'_, str>;

    /// Full status object: code, message, details.
    fn status(&self) -> Status;

    /// Wire code of this node.
    fn code(&self) -> StatusCode {
        self.status().code
    }

    /// Display-normalized view.
    fn special(&self) -> Special;
}

/// Exposes an ordered detail list.
pub trait DetailBearing {
    /// Snapshot of the details, oldest first.
    fn details(&self) -> Vec<Detail>;

    /// Number of details currently held.
    fn detail_count(&self) -> usize {
        self.details().len()
    }
}

/// A detail list that grows in place.
pub trait DetailSink: DetailBearing {
    /// Append `details` at the tail, preserving their order.
    fn append_details(&self, details: Vec<Detail>);
}

/// Carries a stable unique id.
pub trait Identifiable {
    /// The id assigned at construction.
    fn id(&self) -> &str;
}

// ============================================================================
// Capability Markers
// ============================================================================

/// A named contract that [`find_capability`] can search for.
pub trait Capability {
    /// The contract a conforming node is viewed through.
    type Target: ?Sized + 'static;

    /// View `node` through the contract, if it conforms.
    fn probe(node: &dyn ErrorNode) -> Option<&Self::Target>;
}

/// Nodes exposing message + classification.
#[derive(Debug, Clone, Copy)]
pub struct Classify;

/// Nodes exposing a detail list, mutable or not.
#[derive(Debug, Clone, Copy)]
pub struct ReadDetails;

/// Nodes whose detail list can grow in place.
#[derive(Debug, Clone, Copy)]
pub struct MutableDetails;

/// Nodes carrying an id.
#[derive(Debug, Clone, Copy)]
pub struct Identify;

impl Capability for Classify {
    type Target = dyn Classifiable;

    #[inline]
    fn probe(node: &dyn ErrorNode) -> Option<&Self::Target> {
        node.as_classifiable()
    }
}

impl Capability for ReadDetails {
    type Target = dyn DetailBearing;

    #[inline]
    fn probe(node: &dyn ErrorNode) -> Option<&Self::Target> {
        node.as_detail_bearing()
    }
}

impl Capability for MutableDetails {
    type Target = dyn DetailSink;

    #[inline]
    fn probe(node: &dyn ErrorNode) -> Option<&Self::Target> {
        node.as_detail_sink()
    }
}

impl Capability for Identify {
    type Target = dyn Identifiable;

    #[inline]
    fn probe(node: &dyn ErrorNode) -> Option<&Self::Target> {
        node.as_identifiable()
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Pre-order iterator over the nodes of a chain, outermost first.
///
/// Each distinct node is yielded once, even when shared by several causes.
pub struct Nodes<'a> {
    pending: SmallVec<[&'a Chain; 8]>,
    visited: SmallVec<[*const (); 8]>,
}

impl<'a> Nodes<'a> {
    #[inline]
    pub(crate) fn new(chain: &'a Chain) -> Self {
        let mut pending = SmallVec::new();
        pending.push(chain);
        Self {
            pending,
            visited: SmallVec::new(),
        }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a dyn ErrorNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let chain = self.pending.pop()?;
            let addr = chain.addr();
            if self.visited.contains(&addr) {
                continue;
            }
            self.visited.push(addr);

            let node = chain.node();
            // Reversed so the first cause is popped next.
            self.pending.extend(node.causes().iter().rev());
            return Some(node);
        }
    }
}

/// Return the outermost node of `chain` satisfying capability `C`.
///
/// ```rust
/// use status_chain::{find_capability, Chain, Classify, ExternalError, StatusCode};
///
/// let chain = Chain::from(ExternalError::new(StatusCode::NotFound, "missing", []))
///     .context("loading profile");
///
/// let classified = find_capability::<Classify>(&chain).unwrap();
/// assert_eq!(classified.code(), StatusCode::NotFound);
/// ```
#[inline]
pub fn find_capability<C: Capability>(chain: &Chain) -> Option<&C::Target> {
    chain.nodes().find_map(C::probe)
}
