//! Error kinds for the obfuscation core.
//!
//! Follows the tagged-error-enum shape used throughout the retrieval pack's
//! CLI-adjacent crates (`thiserror`-derived, one enum per failure domain)
//! rather than the teacher's hand-written `ErrorCode` — see `DESIGN.md`.

use thiserror::Error;

/// Raised when `mod_inverse(a, m)` has no solution.
///
/// Caught internally by [`crate::core::engine::Engine`]'s sampler, which
/// resamples rather than propagating this to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no modular inverse of {a} mod {m}")]
pub struct NoInverseError {
    pub a: u64,
    pub m: u64,
}

/// Raised by a [`crate::core::transform::Transform`]'s `apply` when the
/// result cannot be represented in `width` bits.
///
/// Caught internally by the engine's retry loop; never surfaces to a
/// caller of [`crate::core::engine::Engine::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transform result does not fit in {width} bits")]
pub struct OverflowError {
    pub width: u32,
}

/// Errors surfaced by [`crate::core::engine::Engine::transform`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The retry loop exhausted its budget without finding a chain that
    /// round-trips every code point of the input.
    #[error(
        "exhausted {attempts} chain-generation attempts without finding a reversible chain; \
         try reducing --max-ops or widening --max-bits"
    )]
    RetryBudgetExhausted { attempts: usize },
}

/// Errors from the emission framework.
///
/// [`EmitError::UnknownVariant`] is retained for API completeness (a future
/// dynamically-registered back-end could hit it) but is unreachable from the
/// in-tree back-ends, whose dispatch is an exhaustive compile-time `match`
/// over the closed `Transform` enum — see spec.md §9's preference for
/// compile-time completeness over a runtime dispatch table.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("back-end has no emission method for transform variant {0:?}")]
    UnknownVariant(&'static str),
}
