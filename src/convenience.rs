//! Message sanitization and chain-building macros.
//!
//! # Rules
//!
//! 1. **Format strings MUST be string literals**, so error text is never
//!    assembled from a runtime template
//! 2. **Outbound messages are bounded** via [`sanitize_message`]
//!
//! # Usage
//!
//! ```rust
//! # use status_chain::{external, wrap, StatusCode};
//! let user = 42;
//! let chain = external!(StatusCode::NotFound, "user {} not found", user);
//! let chain = wrap!(chain, "loading profile");
//! assert_eq!(chain.message(), "loading profile: user 42 not found");
//! ```
//!
//! ```rust,compile_fail
//! # use status_chain::{external, StatusCode};
//! let template = String::from("dynamic {}");
//! // ✗ COMPILE ERROR: the format must be a literal
//! let chain = external!(StatusCode::Internal, template, 1);
//! ```

/// Maximum byte length of a sanitized message.
pub const MAX_MESSAGE_LEN: usize = 256;

const TRUNCATED: &str = "...[TRUNCATED]";
const INVALID_INPUT: &str = "[INVALID_INPUT]";

/// Longest run of `?` a run of consecutive control characters renders as.
const MAX_CONTROL_RUN: usize = 8;

/// Parameter and intermediate bytes a CSI sequence may carry before the
/// sanitizer stops treating it as one.
const MAX_ESCAPE_PARAMS: usize = 16;

#[derive(Clone, Copy)]
enum Escape {
    Idle,
    // ESC seen; a following '[' opens a CSI sequence
    Introduced,
    // Inside `ESC [`, counting parameter bytes
    Csi(usize),
}

#[inline]
fn is_csi_param(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{3f}')
}

#[inline]
fn is_csi_final(c: char) -> bool {
    matches!(c, '\u{40}'..='\u{7e}')
}

/// Bound and neutralize a message before it crosses the boundary.
///
/// # Behavior
/// - Control characters become `?`. A run of consecutive control
///   characters renders as at most eight `?`.
/// - A CSI escape sequence (`ESC [`, parameter bytes, one final byte in
///   `0x40..=0x7E`) collapses to a single `?`. A bare ESC is an ordinary
///   control character, and a sequence with more than sixteen parameter
///   bytes or a byte outside the CSI ranges ends there; the text after it
///   is kept.
/// - Output longer than [`MAX_MESSAGE_LEN`] bytes is cut on a char
///   boundary and ends with `...[TRUNCATED]`; the whole result stays within
///   the limit.
/// - Empty or all-control input yields `[INVALID_INPUT]`.
///
/// # Example
///
/// ```rust
/// # use status_chain::{sanitize_message, MAX_MESSAGE_LEN};
/// let long = "A".repeat(300);
/// let clean = sanitize_message(&long);
/// assert!(clean.len() <= MAX_MESSAGE_LEN);
/// assert!(clean.ends_with("[TRUNCATED]"));
///
/// assert_eq!(sanitize_message("bad byte \x1b here"), "bad byte ? here");
/// ```
pub fn sanitize_message(original: &str) -> String {
    let mut s = String::with_capacity(MAX_MESSAGE_LEN.min(original.len()));
    let mut truncated = false;
    let mut saw_non_control = false;
    let mut escape = Escape::Idle;
    let mut control_run = 0usize;
    let mut chars = original.chars();

    for c in chars.by_ref() {
        match escape {
            Escape::Idle => {}
            Escape::Introduced => {
                escape = Escape::Idle;
                if c == '[' {
                    escape = Escape::Csi(0);
                    continue;
                }
            }
            Escape::Csi(params) => {
                if is_csi_final(c) {
                    escape = Escape::Idle;
                    continue;
                }
                if is_csi_param(c) && params < MAX_ESCAPE_PARAMS {
                    escape = Escape::Csi(params + 1);
                    continue;
                }
                escape = Escape::Idle;
            }
        }

        let replacement = if c.is_control() {
            if c == '\u{1b}' {
                escape = Escape::Introduced;
            }
            control_run += 1;
            if control_run > MAX_CONTROL_RUN {
                continue;
            }
            '?'
        } else {
            control_run = 0;
            saw_non_control = true;
            c
        };

        if s.len() + replacement.len_utf8() > MAX_MESSAGE_LEN {
            truncated = true;
            break;
        }
        s.push(replacement);
    }

    if !saw_non_control {
        saw_non_control = chars.any(|c| !c.is_control());
    }
    if !saw_non_control {
        return INVALID_INPUT.to_string();
    }

    if truncated {
        let mut new_len = MAX_MESSAGE_LEN - TRUNCATED.len();
        while new_len > 0 && !s.is_char_boundary(new_len) {
            new_len -= 1;
        }
        s.truncate(new_len);
        if s.is_empty() {
            return INVALID_INPUT.to_string();
        }
        s.push_str(TRUNCATED);
    }

    s
}

/// Sanitize any displayable value for inclusion in a message.
///
/// ```rust
/// # use status_chain::sanitized;
/// assert_eq!(sanitized!("tab\there"), "tab?here");
/// assert_eq!(sanitized!(42), "42");
/// ```
#[macro_export]
macro_rules! sanitized {
    ($expr:expr) => {
        $crate::convenience::sanitize_message(&$expr.to_string())
    };
}

/// Build an [`ExternalError`](crate::ExternalError) chain from a code and a
/// literal format string.
///
/// Uses the global provenance.
///
/// ```rust
/// # use status_chain::{external, StatusCode};
/// let chain = external!(StatusCode::Unavailable, "shard {} offline", 3);
/// assert_eq!(chain.code(), StatusCode::Unavailable);
/// assert_eq!(chain.details().len(), 1);
/// ```
#[macro_export]
macro_rules! external {
    ($code:expr, $msg:literal $(,)?) => {
        $crate::Chain::from($crate::ExternalError::new(
            $code,
            ::std::format!($msg),
            ::std::iter::empty(),
        ))
    };
    ($code:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {
        $crate::Chain::from($crate::ExternalError::new(
            $code,
            ::std::format!($fmt, $($arg),+),
            ::std::iter::empty(),
        ))
    };
}

/// Add a context layer to a chain with a literal format string.
///
/// ```rust
/// # use status_chain::{wrap, Chain, HappyError};
/// let chain = wrap!(Chain::from(HappyError), "attempt {}", 2);
/// assert_eq!(chain.message(), "attempt 2: Happy");
/// ```
#[macro_export]
macro_rules! wrap {
    ($chain:expr, $msg:literal $(,)?) => {
        $crate::Chain::context($chain, ::std::format!($msg))
    };
    ($chain:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {
        $crate::Chain::context($chain, ::std::format!($fmt, $($arg),+))
    };
}

// ============================================================================
// Tests
// ============================================================================
