//! The emission framework: a `Backend` per target language, driven by a
//! single double-dispatch walk over a [`Context`]'s reverse chain.

pub mod backend;
pub mod names;

use crate::core::context::Context;
use crate::core::transform::{mask, Transform};

/// One method per [`Transform`] variant plus a prologue/epilogue pair.
///
/// `emit` walks `ctx.reverse()` — the chain that turns obfuscated bytes back
/// into plaintext — calling exactly one `visit_*` per element, in order.
/// Implementors hold their generated identifier names as fields, set during
/// `initialise` and read by every `visit_*` and by `finalise`.
pub trait Backend {
    fn initialise(&mut self, ctx: &Context) -> String;
    fn finalise(&mut self) -> String;

    fn visit_add(&mut self, value: u64) -> String;
    fn visit_sub(&mut self, value: u64) -> String;
    fn visit_xor(&mut self, value: u64) -> String;
    fn visit_not(&mut self, mask: u64) -> String;
    fn visit_rot_l(&mut self, lhs: u32, rhs: u32, mask: u64) -> String;
    fn visit_rot_r(&mut self, lhs: u32, rhs: u32, mask: u64) -> String;
    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String;
    fn visit_mul_mod(&mut self, value: u64, modulus: u64) -> String;
    fn visit_mul_mod_inv(&mut self, value: u64, inverse: u64, modulus: u64) -> String;
}

/// Renders `ctx` through `backend`, producing a standalone decoder snippet.
pub fn emit(ctx: &Context, backend: &mut dyn Backend) -> String {
    let mut out = backend.initialise(ctx);
    for t in ctx.reverse() {
        out.push_str(&visit_one(backend, t));
    }
    out.push_str(&backend.finalise());
    out
}

fn visit_one(backend: &mut dyn Backend, t: &Transform) -> String {
    match *t {
        Transform::Add { value, .. } => backend.visit_add(value),
        Transform::Sub { value, .. } => backend.visit_sub(value),
        Transform::Xor { value, .. } => backend.visit_xor(value),
        Transform::Not { width } => backend.visit_not(mask(width)),
        Transform::RotL { amount, width } => {
            backend.visit_rot_l(width - amount, amount, mask(width))
        }
        Transform::RotR { amount, width } => {
            backend.visit_rot_r(width - amount, amount, mask(width))
        }
        Transform::Perm { pos1, pos2, bits, .. } => backend.visit_perm(pos1, pos2, bits),
        Transform::MulMod { value, modulus, .. } => backend.visit_mul_mod(value, modulus),
        Transform::MulModInv { value, inverse, modulus, .. } => {
            backend.visit_mul_mod_inv(value, inverse, modulus)
        }
    }
}

/// `0x` + four (or more, for `>16` bits) uppercase hex digits — the
/// `LanguageVisitor.hex()` convention shared by every high-level back-end.
pub fn hex(value: u64) -> String {
    format!("0x{value:04X}")
}
