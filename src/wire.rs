//! Transport-neutral status triple.
//!
//! [`WireStatus`] is what crosses the process boundary: a numeric code, a
//! bounded message, and the ordered details. Outbound values come from
//! [`to_wire`](crate::to_wire); inbound values are adopted as a
//! [`RemoteError`] with `RemoteError::try_from`.
//!
//! With the `serde` feature both types derive `Serialize` and
//! `Deserialize`, so any serde format can carry them.

use crate::{Detail, RemoteError, Status, StatusCode, UnknownStatusCode};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One detail as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireDetail {
    /// Payload type tag.
    pub type_tag: String,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

/// (code, message, details) as rendered at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireStatus {
    /// Numeric status code.
    pub code: i32,
    /// Sanitized message.
    pub message: String,
    /// Ordered details.
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: Vec<WireDetail>,
}

impl WireStatus {
    /// The code as a [`StatusCode`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStatusCode`] when `code` is outside `0..=16`.
    #[inline]
    pub fn status_code(&self) -> Result<StatusCode, UnknownStatusCode> {
        StatusCode::try_from(self.code)
    }
}

impl From<Detail> for WireDetail {
    fn from(detail: Detail) -> Self {
        Self::from(&detail)
    }
}

impl From<&Detail> for WireDetail {
    fn from(detail: &Detail) -> Self {
        Self {
            type_tag: detail.type_tag().to_owned(),
            payload: detail.payload().to_vec(),
        }
    }
}

impl From<WireDetail> for Detail {
    fn from(wire: WireDetail) -> Self {
        Detail::new(wire.type_tag, wire.payload)
    }
}

/// Failure adopting an inbound [`WireStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// The numeric code names no known status.
    UnknownCode(UnknownStatusCode),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCode(inner) => write!(f, "wire status rejected: {}", inner),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownCode(inner) => Some(inner),
        }
    }
}

impl From<UnknownStatusCode> for WireError {
    fn from(inner: UnknownStatusCode) -> Self {
        Self::UnknownCode(inner)
    }
}

impl TryFrom<WireStatus> for Status {
    type Error = WireError;

    fn try_from(wire: WireStatus) -> Result<Self, Self::Error> {
        let code = wire.status_code()?;
        Ok(Status::new(code, wire.message).with_details(wire.details.into_iter().map(Detail::from)))
    }
}

impl TryFrom<WireStatus> for RemoteError {
    type Error = WireError;

    fn try_from(wire: WireStatus) -> Result<Self, Self::Error> {
        Status::try_from(wire).map(RemoteError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chain, ExternalError, add_details};

    fn sample() -> WireStatus {
        WireStatus {
            code: StatusCode::Unavailable.as_i32(),
            message: "upstream down".to_string(),
            details: vec![WireDetail {
                type_tag: "peer".to_string(),
                payload: b"p".to_vec(),
            }],
        }
    }

    #[test]
    fn inbound_status_becomes_remote_chain() {
        let remote = RemoteError::try_from(sample()).unwrap();
        let chain = Chain::from(remote).context("calling upstream");
        assert_eq!(chain.code(), StatusCode::Unavailable);
        assert_eq!(chain.details()[0].type_tag(), "peer");
    }

    #[test]
    fn unknown_code_is_rejected() {
        let mut wire = sample();
        wire.code = 99;
        let err = RemoteError::try_from(wire).unwrap_err();
        assert_eq!(err, WireError::UnknownCode(UnknownStatusCode { value: 99 }));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn relay_preserves_peer_details_and_appends_local_ones() {
        let remote = RemoteError::try_from(sample()).unwrap();
        let chain = add_details(Chain::from(remote), [Detail::new("local", b"l".to_vec())]);
        let outbound = chain.to_wire();

        assert_eq!(outbound.code, sample().code);
        let tags: Vec<&str> = outbound.details.iter().map(|d| d.type_tag.as_str()).collect();
        assert_eq!(tags, ["peer", "local"]);
    }

    #[test]
    fn detail_conversion_copies_bytes() {
        let detail = Detail::new("tag", b"bytes".to_vec());
        let wire = WireDetail::from(&detail);
        assert_eq!(Detail::from(wire), detail);
    }

    #[test]
    fn external_chain_reports_known_code() {
        let chain = Chain::from(ExternalError::new(StatusCode::NotFound, "missing", []));
        assert_eq!(chain.to_wire().status_code(), Ok(StatusCode::NotFound));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"message\":\"upstream down\""));
        let back: WireStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_details_default_to_empty() {
        let back: WireStatus = serde_json::from_str(r#"{"code":5,"message":"gone"}"#).unwrap();
        assert!(back.details.is_empty());
    }
}
