//! The obfuscation core: arithmetic primitives, the transform IR, chains,
//! the sampling engine, and the emission framework.

pub mod arith;
pub mod chain;
pub mod context;
pub mod emit;
pub mod engine;
pub mod transform;

pub use chain::Chain;
pub use context::Context;
pub use engine::{Engine, EngineConfig};
pub use transform::Transform;
