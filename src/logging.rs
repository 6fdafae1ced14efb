//! Structured log view of a chain for internal diagnostics.
//!
//! [`ChainLog`] borrows from the [`Chain`] that created it and cannot
//! outlive it. Take one, hand it to the logger, and let it drop:
//!
//! ```rust
//! # use status_chain::{Chain, ExternalError, StatusCode};
//! let chain = Chain::from(ExternalError::new(StatusCode::Aborted, "txn aborted", []))
//!     .context("commit");
//!
//! chain.with_internal_log(|log| {
//!     let mut line = String::new();
//!     log.write_to(&mut line).unwrap();
//!     assert!(line.starts_with("[Aborted] message='commit: txn aborted'"));
//! });
//! ```
//!
//! The rendered message and detail snapshot are owned by the view and are
//! zeroized when it drops. Payload bytes are never rendered outside the
//! `trusted_debug` feature.

use crate::{Chain, Detail, StatusCode};
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured log entry borrowed from a [`Chain`].
pub struct ChainLog<'a> {
    chain: &'a Chain,
    code: StatusCode,
    id: Option<&'a str>,
    message: String,
    details: Vec<Detail>,
}

impl<'a> ChainLog<'a> {
    /// Capture the loggable fields of `chain`.
    pub fn new(chain: &'a Chain) -> Self {
        Self {
            chain,
            code: chain.code(),
            id: chain.id(),
            message: chain.message(),
            details: chain.details(),
        }
    }

    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// WARNING: This renders payload bytes (lossily, as UTF-8). Only
    /// available with BOTH the `trusted_debug` feature AND debug assertions.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_header(&mut output);

        for detail in &self.details {
            let payload = String::from_utf8_lossy(detail.payload());
            output.push_str(&format!(
                " {}='{}'",
                truncate_with_indicator(detail.type_tag()),
                truncate_with_indicator(&payload)
            ));
        }

        output
    }

    /// Write the log line to a formatter.
    ///
    /// Shape: `[Code] message='…' id='…' details=[tag(len), …]`. Every
    /// field is truncated to a bounded length; payloads appear only as
    /// their byte length.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        self.write_header(f)?;

        f.write_str(" details=[")?;
        for (i, detail) in self.details.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}({})",
                truncate_with_indicator(detail.type_tag()),
                detail.payload().len()
            )?;
        }
        f.write_str("]")
    }

    fn write_header(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] message='{}' id='{}'",
            self.code,
            truncate_with_indicator(&self.message),
            truncate_with_indicator(self.id.unwrap_or("-"))
        )
    }

    /// The chain this view was taken from.
    #[inline]
    pub const fn chain(&self) -> &'a Chain {
        self.chain
    }

    /// Classified code, `Unknown` when unclassified.
    #[inline]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Id of the outermost id-bearing node.
    #[inline]
    pub const fn id(&self) -> Option<&'a str> {
        self.id
    }

    /// Full outermost message. Not truncated.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Detail snapshot taken when the view was created.
    #[inline]
    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    /// Detail type tags in order.
    pub fn detail_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.details.iter().map(Detail::type_tag)
    }
}

impl fmt::Debug for ChainLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLog")
            .field("code", &self.code)
            .field("id", &self.id)
            .field("message", &self.message)
            .field("details", &self.details)
            .finish()
    }
}

impl Drop for ChainLog<'_> {
    fn drop(&mut self) {
        self.message.zeroize();
    }
}

/// Truncate a string for display.
///
/// If the string exceeds MAX_FIELD_OUTPUT_LEN, it's truncated with an indicator
/// to make the truncation visible to operators.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    // Last char boundary at or before the limit
    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExternalError, HappyError, IdGenerator, Provenance, STACK_TRACE_TYPE_TAG, StackCapture};

    struct Fixed;

    impl IdGenerator for Fixed {
        fn next_id(&self) -> String {
            "err-1".to_string()
        }
    }

    impl StackCapture for Fixed {
        fn capture(&self) -> Vec<u8> {
            b"frames".to_vec()
        }
    }

    fn chain() -> Chain {
        let provenance = Provenance::new(Fixed, Fixed);
        Chain::from(ExternalError::with_provenance(
            &provenance,
            StatusCode::PermissionDenied,
            "root error",
            [],
        ))
        .context("outer")
        .add_details([Detail::new("note", b"secret payload".to_vec())])
    }

    #[test]
    fn write_to_renders_fields_and_hides_payloads() {
        let chain = chain();
        let mut line = String::new();
        chain.internal_log().write_to(&mut line).unwrap();

        assert_eq!(
            line,
            "[PermissionDenied] message='outer: root error' id='err-1' \
             details=[type.googleapis.com/status_chain.StackTrace(6), note(14)]"
        );
        assert!(!line.contains("secret"));
    }

    #[test]
    fn accessors_expose_structured_fields() {
        let chain = chain();
        chain.with_internal_log(|log| {
            assert_eq!(log.code(), StatusCode::PermissionDenied);
            assert_eq!(log.id(), Some("err-1"));
            assert_eq!(log.message(), "outer: root error");
            assert_eq!(log.detail_tags().last(), Some("note"));
            assert!(log.chain().ptr_eq(&chain));
        });
    }

    #[test]
    fn unclassified_chain_logs_unknown() {
        let chain = Chain::foreign(std::fmt::Error);
        let mut line = String::new();
        chain.internal_log().write_to(&mut line).unwrap();
        assert!(line.starts_with("[Unknown] message='"));
        assert!(line.contains("id='-'"));
        assert!(line.ends_with("details=[]"));
    }

    #[test]
    fn happy_chain_logs_sentinel_id() {
        let chain = Chain::from(HappyError);
        assert_eq!(chain.internal_log().id(), Some("∞"));
    }

    #[test]
    fn debug_output_redacts_payloads() {
        let chain = chain();
        let debug = format!("{:?}", chain.internal_log());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret payload"));
    }

    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    #[test]
    fn trusted_debug_renders_payloads() {
        let chain = chain();
        let output = chain.internal_log().format_for_trusted_debug();
        assert!(output.contains(" note='secret payload'"));
    }

    #[test]
    fn oversized_detail_tag_is_truncated() {
        let tag = format!("type.example.com/{}", "Nested".repeat(200));
        let chain = Chain::from(HappyError).add_details([Detail::new(tag.as_str(), b"p".to_vec())]);
        let mut line = String::new();
        chain.internal_log().write_to(&mut line).unwrap();

        let rendered = truncate_with_indicator(&tag);
        assert!(rendered.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(line.contains(&format!("{}(1)", rendered)));
    }

    #[test]
    fn ordinary_fields_are_borrowed() {
        let rendered = truncate_with_indicator(STACK_TRACE_TYPE_TAG);
        assert!(matches!(rendered, Cow::Borrowed(_)));
        assert_eq!(rendered, STACK_TRACE_TYPE_TAG);
    }

    #[test]
    fn multibyte_context_cut_on_char_boundary() {
        // Deep context layers in Cyrillic: two bytes per char.
        let mut chain = Chain::from(HappyError);
        for _ in 0..200 {
            chain = chain.context("ошибка");
        }
        let message = chain.message();
        let rendered = truncate_with_indicator(&message);

        assert!(rendered.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(rendered.ends_with(TRUNCATION_INDICATOR));
        assert!(message.starts_with(rendered.trim_end_matches(TRUNCATION_INDICATOR)));
    }

    #[test]
    fn message_exactly_at_limit_is_untouched() {
        let message = "m".repeat(MAX_FIELD_OUTPUT_LEN);
        let chain = Chain::foreign(std::io::Error::other(message.clone()));
        let log = chain.internal_log();
        let rendered = truncate_with_indicator(log.message());

        assert!(matches!(rendered, Cow::Borrowed(_)));
        assert_eq!(rendered, message);
    }

    #[test]
    fn long_message_is_truncated_in_log_line() {
        let chain = Chain::foreign(std::io::Error::other("x".repeat(4000)));
        let mut line = String::new();
        chain.internal_log().write_to(&mut line).unwrap();
        assert!(line.contains(TRUNCATION_INDICATOR));
        assert!(line.len() < 1200);
    }
}
