//! `strobf`: a polymorphic string obfuscator.
//!
//! Given plaintext and a target language, [`core::engine::Engine`] samples a
//! random chain of reversible integer transforms, and [`core::emit::emit`]
//! renders a standalone snippet in that language which reconstructs and
//! prints the original text. Every invocation randomizes both the transform
//! chain and the emitted identifiers, so no two runs produce the same
//! source even for identical input.

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::emit::{backend::Target, emit};
pub use crate::core::{Chain, Context, Engine, EngineConfig, Transform};
pub use error::{EmitError, EngineError, NoInverseError, OverflowError};
