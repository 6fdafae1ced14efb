//! Boundary-facing lookups: classification, specialization, wire rendering.
//!
//! Everything here is total. A chain with no classification-bearing node
//! renders as `Unknown` and specializes to [`Special::unhandled`].

use crate::{Chain, Classifiable, Classify, Special, StatusCode, WireDetail, WireStatus, sanitize_message};

/// Outermost classification-bearing node of `chain`.
#[inline]
pub fn classify(chain: &Chain) -> Option<&(dyn Classifiable + 'static)> {
    chain.find::<Classify>()
}

/// Wire code of `chain`, `Unknown` when nothing classifies it.
#[inline]
pub fn status_code(chain: &Chain) -> StatusCode {
    classify(chain).map_or(StatusCode::Unknown, |node| node.code())
}

/// Display-normalized view of a present chain.
pub fn special_of(chain: &Chain) -> Special {
    classify(chain).map_or_else(Special::unhandled, |node| node.special())
}

/// Display-normalized view of an optional chain.
///
/// `None` in means `None` out; "no error" is distinct from "unknown error".
/// Details are never consulted.
///
/// ```rust
/// use status_chain::{specialize, Chain, Special};
///
/// assert_eq!(specialize(None), None);
///
/// let chain = Chain::foreign(std::fmt::Error).context("render");
/// assert_eq!(specialize(Some(&chain)), Some(Special::unhandled()));
/// ```
#[inline]
pub fn specialize(chain: Option<&Chain>) -> Option<Special> {
    chain.map(special_of)
}

/// Render the (code, message, details) triple for the wire.
///
/// The message is the full outermost rendering, sanitized and bounded. The
/// details are the merged list as read through the outermost
/// detail-bearing node.
pub fn to_wire(chain: &Chain) -> WireStatus {
    WireStatus {
        code: status_code(chain).as_i32(),
        message: sanitize_message(&chain.message()),
        details: chain.details().into_iter().map(WireDetail::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Detail, ExternalError, HappyError, SpecialError, add_details};
    use std::io;

    #[test]
    fn unclassified_chain_falls_back() {
        let chain = Chain::foreign(io::Error::other("socket closed")).context("send");
        assert_eq!(
            specialize(Some(&chain)),
            Some(Special::new("unhandled error", "unhandled error", 2))
        );
        assert_eq!(status_code(&chain), StatusCode::Unknown);
    }

    #[test]
    fn absent_chain_specializes_to_none() {
        assert_eq!(specialize(None), None);
    }

    #[test]
    fn specialization_ignores_details() {
        let chain = Chain::foreign(io::Error::other("x"));
        let merged = add_details(chain, [Detail::new("tag", b"p".to_vec())]);
        assert_eq!(special_of(&merged), Special::unhandled());
    }

    #[test]
    fn happy_survives_any_depth() {
        let mut chain = Chain::from(HappyError);
        for depth in 0..32 {
            chain = chain.context(format!("layer {}", depth));
        }
        assert_eq!(specialize(Some(&chain)), Some(Special::happiness()));
        assert_eq!(status_code(&chain), StatusCode::Ok);
        assert_eq!(classify(&chain).unwrap().status().message, "happy");
    }

    #[test]
    fn outermost_classification_wins() {
        let inner = Chain::from(SpecialError::new(Special::new("inner", "inner", 404)));
        let outer = ExternalError::new(StatusCode::Aborted, "outer", []);
        // Two classified nodes only meet through a splice-style join.
        let joined = Chain::new(crate::Joined::new(Chain::from(outer), inner));
        assert_eq!(status_code(&joined), StatusCode::Aborted);
    }

    #[test]
    fn wire_triple_for_external_chain() {
        let chain = Chain::from(ExternalError::new(StatusCode::PermissionDenied, "root error", []))
            .context("I am some metadata")
            .add_details([Detail::new("https://dummy.com/bogus-text", b"I am bogus".to_vec())]);

        let wire = to_wire(&chain);
        assert_eq!(wire.code, 7);
        assert_eq!(wire.message, "I am some metadata: root error");
        assert_eq!(wire.details.len(), 2);
        assert_eq!(wire.details[1].payload, b"I am bogus");
    }

    #[test]
    fn wire_message_keeps_text_after_stray_escape() {
        let chain = Chain::foreign(io::Error::other("bad byte \x1b in input; disk full"));
        assert_eq!(to_wire(&chain).message, "bad byte ? in input; disk full");
    }

    #[test]
    fn wire_message_is_sanitized() {
        let chain = Chain::foreign(io::Error::other("line\nbreak"));
        let wire = to_wire(&chain);
        assert_eq!(wire.code, StatusCode::Unknown.as_i32());
        assert_eq!(wire.message, "line?break");
        assert!(wire.details.is_empty());
    }
}
