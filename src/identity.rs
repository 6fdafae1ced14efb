//! Identity and stack-capture collaborators.
//!
//! Id-bearing error kinds draw a fresh id at construction and
//! `ExternalError` captures a stack snapshot. Both are injected through a
//! [`Provenance`] bundle instead of being hard-wired, so tests can supply
//! deterministic stubs.
//!
//! # Defaults
//!
//! - [`SequenceIds`]: an entropy-seeded 64-bit prefix followed by an atomic
//!   sequence number. The sequence never repeats within one generator and
//!   the prefix separates generators, so ids are unique for the process.
//! - [`BacktraceCapture`]: `std::backtrace::Backtrace::force_capture`,
//!   rendered as UTF-8 text.
//!
//! # Example
//!
//! ```rust
//! use status_chain::{IdGenerator, SequenceIds};
//!
//! let ids = SequenceIds::with_seed(7);
//! let a = ids.next_id();
//! let b = ids.next_id();
//! assert_ne!(a, b);
//! ```

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Counter mixed into generated prefixes so generators created in the same
/// nanosecond still diverge.
static PREFIX_COUNTER: AtomicU64 = AtomicU64::new(0x9E37_79B9_7F4A_7C15);

/// Source of process-unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Return an id never returned before in this process.
    fn next_id(&self) -> String;
}

/// Source of call-stack snapshots.
pub trait StackCapture: Send + Sync {
    /// Capture the current call stack as opaque bytes.
    fn capture(&self) -> Vec<u8>;
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn entropy_seed() -> u64 {
    let now_nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0_u64, |d| d.as_nanos() as u64);
    let counter = PREFIX_COUNTER.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed);
    let stack_hint = (&now_nanos as *const u64 as usize) as u64;

    now_nanos ^ counter.rotate_left(11) ^ stack_hint.rotate_left(17)
}

// ============================================================================
// Sequence Ids
// ============================================================================

/// Prefix + sequence id generator.
///
/// Ids render as 28 lowercase hex digits: a 16-digit generator prefix and a
/// 12-digit sequence number.
pub struct SequenceIds {
    prefix: u64,
    sequence: AtomicU64,
}

impl SequenceIds {
    /// Generator with an entropy-derived prefix.
    pub fn new() -> Self {
        Self::with_seed(entropy_seed())
    }

    /// Generator with a prefix derived from `seed`.
    ///
    /// Equal seeds produce equal id streams; use this only where
    /// reproducibility matters more than cross-generator uniqueness.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            prefix: splitmix64(seed),
            sequence: AtomicU64::new(0),
        }
    }

    /// This generator's prefix.
    #[inline]
    pub fn prefix(&self) -> u64 {
        self.prefix
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{:016x}{:012x}", self.prefix, seq & 0xFFFF_FFFF_FFFF)
    }
}

impl fmt::Debug for SequenceIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceIds")
            .field("prefix", &format_args!("{:016x}", self.prefix))
            .field("issued", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}

// ============================================================================
// Stack Capture
// ============================================================================

/// Captures a full backtrace regardless of `RUST_BACKTRACE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    fn capture(&self) -> Vec<u8> {
        Backtrace::force_capture().to_string().into_bytes()
    }
}

// ============================================================================
// Provenance
// ============================================================================

/// The collaborators id-bearing errors draw on at construction.
#[derive(Clone)]
pub struct Provenance {
    ids: Arc<dyn IdGenerator>,
    stacks: Arc<dyn StackCapture>,
}

impl Provenance {
    /// Bundle explicit collaborators.
    pub fn new(ids: impl IdGenerator + 'static, stacks: impl StackCapture + 'static) -> Self {
        Self {
            ids: Arc::new(ids),
            stacks: Arc::new(stacks),
        }
    }

    /// Process-wide default bundle, built on first use.
    pub fn global() -> &'static Provenance {
        static GLOBAL: OnceLock<Provenance> = OnceLock::new();
        GLOBAL.get_or_init(Provenance::default)
    }

    /// Draw a fresh id.
    #[inline]
    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    /// Capture the current stack.
    #[inline]
    pub fn capture_stack(&self) -> Vec<u8> {
        self.stacks.capture()
    }
}

impl Default for Provenance {
    fn default() -> Self {
        Self::new(SequenceIds::new(), BacktraceCapture)
    }
}

impl fmt::Debug for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provenance").finish_non_exhaustive()
    }
}
