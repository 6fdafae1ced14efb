//! Attaching details to chains the caller does not own.
//!
//! Two paths:
//!
//! 1. **In place**: the outermost [`MutableDetails`] node appends the new
//!    details. Every handle to the chain sees them and the returned handle
//!    is the one passed in.
//! 2. **Splice**: when no node can grow, the outermost readable detail list
//!    (if any) is copied, the new details are appended to the copy, and the
//!    result is carried by a [`DetailOnlyError`] joined in front of the
//!    original chain.
//!
//! Neither path changes the chain's message or classification.

use crate::{Chain, Detail, DetailBearing, DetailOnlyError, DetailVec, ErrorNode, MutableDetails, ReadDetails};
use std::error::Error;
use std::fmt;

/// Merge `details` into `chain`, returning the chain to use from now on.
///
/// Total: never fails and never drops or reorders existing details.
/// Duplicates are kept. An empty `details` returns `chain` untouched.
///
/// ```rust
/// use status_chain::{add_details, Chain, Detail, RemoteError, Status, StatusCode};
///
/// let status = Status::new(StatusCode::Unavailable, "upstream down")
///     .with_details([Detail::new("peer", b"a".to_vec())]);
/// let chain = Chain::from(RemoteError::new(status));
///
/// let merged = add_details(chain, [Detail::new("local", b"b".to_vec())]);
/// let tags: Vec<String> = merged.details().iter().map(|d| d.type_tag().to_string()).collect();
/// assert_eq!(tags, ["peer", "local"]);
/// assert_eq!(merged.code(), StatusCode::Unavailable);
/// ```
pub fn add_details<I>(chain: Chain, details: I) -> Chain
where
    I: IntoIterator<Item = Detail>,
{
    let new: DetailVec = details.into_iter().collect();
    if new.is_empty() {
        return chain;
    }

    if let Some(sink) = chain.find::<MutableDetails>() {
        sink.append_details(new.into_vec());
        return chain;
    }

    let existing = chain
        .find::<ReadDetails>()
        .map(DetailBearing::details)
        .unwrap_or_default();

    let carrier = DetailOnlyError::new(existing.into_iter().chain(new));
    Chain::new(Joined::new(Chain::new(carrier), chain))
}

/// Splice node placing a detail carrier in front of an existing chain.
///
/// Renders and reports its source as the original chain; lookups see the
/// carrier first.
#[derive(Debug)]
pub struct Joined {
    // [carrier, original]
    causes: [Chain; 2],
}

impl Joined {
    /// Join `carrier` ahead of `original`.
    pub fn new(carrier: Chain, original: Chain) -> Self {
        Self {
            causes: [carrier, original],
        }
    }

    /// The spliced detail carrier.
    #[inline]
    pub fn carrier(&self) -> &Chain {
        &self.causes[0]
    }

    /// The chain that was merged into.
    #[inline]
    pub fn original(&self) -> &Chain {
        &self.causes[1]
    }
}

impl fmt::Display for Joined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.original(), f)
    }
}

impl Error for Joined {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.original().source()
    }
}

impl ErrorNode for Joined {
    fn causes(&self) -> &[Chain] {
        &self.causes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExternalError, HappyError, RemoteError, Special, Status, StatusCode};
    use std::io;

    fn tags(chain: &Chain) -> Vec<String> {
        chain.details().iter().map(|d| d.type_tag().to_string()).collect()
    }

    fn detail(tag: &str) -> Detail {
        Detail::new(tag, tag.as_bytes().to_vec())
    }

    fn remote(existing: &[&str]) -> Chain {
        let status = Status::new(StatusCode::Aborted, "remote failed")
            .with_details(existing.iter().map(|t| detail(t)));
        Chain::from(RemoteError::new(status))
    }

    #[test]
    fn appends_after_existing_details() {
        let chain = remote(&["a", "b"]).context("call");
        let merged = add_details(chain, [detail("c"), detail("d")]);
        assert_eq!(tags(&merged), ["a", "b", "c", "d"]);
    }

    #[test]
    fn bare_chain_gets_exactly_the_new_details() {
        let chain = Chain::foreign(io::Error::other("disk")).context("read");
        let merged = add_details(chain, [detail("x")]);
        assert_eq!(tags(&merged), ["x"]);
        assert!(merged.classify().is_none());
    }

    #[test]
    fn mutation_path_keeps_handle_and_message() {
        let chain = Chain::from(ExternalError::new(StatusCode::PermissionDenied, "root error", []))
            .context("metadata");
        let observer = chain.clone();
        let before = chain.message();

        let merged = add_details(chain, [detail("x")]);

        assert!(merged.ptr_eq(&observer));
        assert_eq!(merged.message(), before);
        assert_eq!(merged.code(), StatusCode::PermissionDenied);
        // The clone observes the in-place append.
        assert_eq!(observer.details().len(), 2);
    }

    #[test]
    fn splice_path_keeps_message_and_classification() {
        let chain = remote(&["a"]).context("outer");
        let before_message = chain.message();
        let before_special = chain.special();

        let merged = add_details(chain.clone(), [detail("b")]);

        assert!(!merged.ptr_eq(&chain));
        assert_eq!(merged.message(), before_message);
        assert_eq!(merged.special(), before_special);
        assert_eq!(merged.code(), StatusCode::Aborted);
        // The original remote node is untouched.
        assert_eq!(tags(&chain), ["a"]);
    }

    #[test]
    fn splice_source_is_the_original_source() {
        let chain = Chain::foreign(io::Error::other("disk")).context("read");
        let merged = add_details(chain.clone(), [detail("x")]);
        let a = merged.source().map(|s| s.to_string());
        let b = chain.source().map(|s| s.to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_splices_accumulate() {
        let chain = Chain::from(HappyError).context("ok");
        let once = add_details(chain, [detail("a")]);
        // The carrier is mutable, so later merges append in place.
        let twice = add_details(once.clone(), [detail("b"), detail("a")]);

        assert!(twice.ptr_eq(&once));
        assert_eq!(tags(&twice), ["a", "b", "a"]);
        assert_eq!(twice.special(), Special::happiness());
    }

    #[test]
    fn empty_merge_is_a_no_op() {
        let chain = remote(&["a"]);
        let merged = add_details(chain.clone(), Vec::new());
        assert!(merged.ptr_eq(&chain));
    }

    #[test]
    fn duplicates_are_kept() {
        let chain = Chain::from(ExternalError::new(StatusCode::Internal, "boom", []));
        let merged = chain.add_details([detail("d"), detail("d")]);
        assert_eq!(tags(&merged)[1..], ["d", "d"]);
    }
}
