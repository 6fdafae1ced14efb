//! Opaque detail payloads and the shared, append-only detail list.
//!
//! A [`Detail`] is a type tag plus opaque bytes. Order is significant: lists
//! only ever grow at the tail and are never reordered or deduplicated.
//!
//! # Memory
//!
//! Payloads routinely carry stack snapshots and other internal data, so
//! every `Detail` zeroizes its tag and payload on drop. Clones are
//! independent copies that zeroize themselves.

use smallvec::SmallVec;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Type tag of the stack-trace detail every `ExternalError` carries.
pub const STACK_TRACE_TYPE_TAG: &str = "type.googleapis.com/status_chain.StackTrace";

/// Inline capacity of a detail list before it spills to the heap.
///
/// Typical chains carry the stack trace plus one or two middleware details.
pub(crate) const INLINE_DETAILS: usize = 4;

/// Inline-first storage used wherever details are batched.
pub type DetailVec = SmallVec<[Detail; INLINE_DETAILS]>;

/// Opaque typed diagnostic payload.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Detail {
    type_tag: String,
    payload: Vec<u8>,
}

impl Detail {
    /// Create a detail from a type tag and payload bytes.
    #[inline]
    pub fn new(type_tag: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            type_tag: type_tag.into(),
            payload: payload.into(),
        }
    }

    /// Create a detail, rejecting an empty type tag.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::EmptyTypeTag`] when `type_tag` is empty; a
    /// receiver cannot route an untagged payload.
    pub fn checked_new(
        type_tag: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, DetailError> {
        let type_tag = type_tag.into();
        if type_tag.is_empty() {
            return Err(DetailError::EmptyTypeTag);
        }
        Ok(Self::new(type_tag, payload))
    }

    /// The payload's type tag.
    #[inline]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// The opaque payload.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether this is the synthetic stack-trace detail.
    #[inline]
    pub fn is_stack_trace(&self) -> bool {
        self.type_tag == STACK_TRACE_TYPE_TAG
    }
}

impl fmt::Debug for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detail")
            .field("type_tag", &self.type_tag)
            .field("payload_len", &self.payload.len())
            .field("payload", &"<REDACTED>")
            .finish()
    }
}

/// Validation failure when building a [`Detail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailError {
    /// The type tag was empty.
    EmptyTypeTag,
}

impl fmt::Display for DetailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTypeTag => f.write_str("detail type tag must not be empty"),
        }
    }
}

impl std::error::Error for DetailError {}

// ============================================================================
// Shared Detail List
// ============================================================================

/// Append-only detail list that can grow through a shared reference.
///
/// Chains are shared behind `Arc`, so in-place merging needs interior
/// mutability. The mutex serializes concurrent appends on the same node; a
/// poisoned lock is recovered because appends never leave the list in a
/// partial state.
#[derive(Default)]
pub struct DetailList {
    entries: Mutex<DetailVec>,
}

impl DetailList {
    /// Empty list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, DetailVec> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append details at the tail, preserving their order.
    pub fn extend<I>(&self, details: I)
    where
        I: IntoIterator<Item = Detail>,
    {
        self.lock().extend(details);
    }

    /// Append a single detail.
    #[inline]
    pub fn push(&self, detail: Detail) {
        self.lock().push(detail);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<Detail> {
        self.lock().to_vec()
    }

    /// Number of entries.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

impl FromIterator<Detail> for DetailList {
    fn from_iter<I: IntoIterator<Item = Detail>>(details: I) -> Self {
        Self {
            entries: Mutex::new(details.into_iter().collect()),
        }
    }
}

impl fmt::Debug for DetailList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lock().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_new_rejects_empty_tag() {
        assert_eq!(Detail::checked_new("", b"x".to_vec()), Err(DetailError::EmptyTypeTag));
        let ok = Detail::checked_new("tag", b"x".to_vec()).unwrap();
        assert_eq!(ok.type_tag(), "tag");
        assert_eq!(ok.payload(), b"x");
    }

    #[test]
    fn debug_redacts_payload() {
        let detail = Detail::new("tag", b"secret bytes".to_vec());
        let debug = format!("{:?}", detail);
        assert!(debug.contains("tag"));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn zeroize_clears_payload() {
        let mut detail = Detail::new("tag", b"secret".to_vec());
        detail.zeroize();
        assert!(detail.payload().is_empty());
        assert!(detail.type_tag().is_empty());
    }

    #[test]
    fn list_appends_in_order_without_dedup() {
        let list: DetailList = [Detail::new("a", vec![1u8])].into_iter().collect();
        list.extend([Detail::new("b", vec![2u8]), Detail::new("b", vec![2u8])]);
        list.push(Detail::new("c", vec![3u8]));

        let tags: Vec<String> = list.snapshot().iter().map(|d| d.type_tag().to_string()).collect();
        assert_eq!(list.len(), 4);
        assert_eq!(tags, ["a", "b", "b", "c"]);
        assert_eq!(list.snapshot()[1], Detail::new("b", vec![2u8]));
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let list = DetailList::new();
        assert_eq!(list.len(), 0);
        list.push(Detail::new("a", Vec::<u8>::new()));
        let before = list.snapshot();
        list.push(Detail::new("b", Vec::<u8>::new()));
        assert_eq!(before.len(), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        use std::sync::Arc;
        use std::thread;

        let list = Arc::new(DetailList::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let list = Arc::clone(&list);
                thread::spawn(move || {
                    for j in 0..25 {
                        list.push(Detail::new(format!("t{}", i), vec![j as u8]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(list.len(), 200);
    }
}
