//! Chain sampling and the retry loop that turns plaintext into a [`Context`].

use rand::rngs::ThreadRng;
use rand::{Rng, RngCore};

use crate::core::arith::mod_inverse;
use crate::core::chain::Chain;
use crate::core::context::Context;
use crate::core::transform::{additive_limit, mask, multiplicative_limit, Transform};
use crate::error::EngineError;

/// Default cap on chain-generation attempts before giving up — spec.md §4.4
/// suggests "a generous cap (e.g. 10,000 attempts)".
pub const DEFAULT_RETRY_BUDGET: usize = 10_000;

/// Sampling + retry parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub min_ops: usize,
    pub max_ops: usize,
    pub width: u32,
    pub retry_budget: usize,
}

impl EngineConfig {
    pub fn new(min_ops: usize, max_ops: usize, width: u32) -> Self {
        assert!(min_ops >= 1, "min_ops must be at least 1");
        assert!(min_ops <= max_ops, "min_ops ({min_ops}) must be <= max_ops ({max_ops})");
        assert!(width >= 4, "width must be at least 4 bits, got {width}");
        assert!(
            width < 64,
            "width must be below 64 bits (2^width must fit a u64 modulus), got {width}"
        );
        EngineConfig { min_ops, max_ops, width, retry_budget: DEFAULT_RETRY_BUDGET }
    }

    pub fn with_retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = retry_budget;
        self
    }
}

/// Randomly assembles transform chains and verifies end-to-end
/// invertibility over an input's code points.
///
/// Carries mutable RNG state, so — as spec.md §5 requires — it is not safe
/// to share across threads; a caller wanting parallel generation creates one
/// `Engine` per thread.
pub struct Engine<R: RngCore = ThreadRng> {
    config: EngineConfig,
    rng: R,
}

impl Engine<ThreadRng> {
    /// Uses a non-reproducible, cryptographically-strong RNG, per spec.md
    /// §9's default recommendation.
    pub fn new(min_ops: usize, max_ops: usize, width: u32) -> Self {
        Engine::with_rng(EngineConfig::new(min_ops, max_ops, width), rand::thread_rng())
    }
}

impl<R: RngCore> Engine<R> {
    /// Uses the given RNG — typically a seeded `rand_chacha::ChaCha8Rng` for
    /// reproducible tests, per spec.md §9.
    pub fn with_rng(config: EngineConfig, rng: R) -> Self {
        Engine { config, rng }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reads `text` as an ordered sequence of Unicode code points and
    /// produces a [`Context`] whose reverse chain exactly undoes the forward
    /// chain on every one of them.
    pub fn transform(&mut self, text: &str) -> Result<Context, EngineError> {
        let code_points: Vec<u64> = text.chars().map(|c| c as u64).collect();
        let max = 1u64 << self.config.width;
        let word_mask = mask(self.config.width);

        for attempt in 1..=self.config.retry_budget {
            let forward = self.generate_forward();
            let reverse = forward.invert();

            if let Some(bytes) = Self::try_round_trip(&forward, &reverse, &code_points, max) {
                tracing::debug!(attempt, ops = forward.len(), "found reversible chain");
                return Ok(Context::new(self.config.width, word_mask, bytes, forward, reverse));
            }
            tracing::trace!(attempt, "chain rejected by round-trip check, retrying");
        }

        tracing::warn!(attempts = self.config.retry_budget, "retry budget exhausted");
        Err(EngineError::RetryBudgetExhausted { attempts: self.config.retry_budget })
    }

    fn try_round_trip(
        forward: &Chain,
        reverse: &Chain,
        code_points: &[u64],
        max: u64,
    ) -> Option<Vec<u64>> {
        let mut bytes = Vec::with_capacity(code_points.len());
        for &c in code_points {
            let y = forward.apply(c).ok()?;
            if y >= max {
                return None;
            }
            let back = reverse.apply(y).ok()?;
            if back != c {
                return None;
            }
            bytes.push(y);
        }
        Some(bytes)
    }

    fn generate_forward(&mut self) -> Chain {
        let n = self.rng.gen_range(self.config.min_ops..=self.config.max_ops);
        Chain::new((0..n).map(|_| self.generate_transform()).collect())
    }

    fn generate_transform(&mut self) -> Transform {
        match self.rng.gen_range(0u8..9) {
            0 => self.sample_add(),
            1 => self.sample_sub(),
            2 => self.sample_xor(),
            3 => Transform::not(self.config.width),
            4 => self.sample_rot_l(),
            5 => self.sample_rot_r(),
            6 => self.sample_perm(),
            7 => self.sample_mul_mod(),
            8 => self.sample_mul_mod_inv(),
            _ => unreachable!("gen_range(0..9) is exhaustive over the nine variants"),
        }
    }

    fn random_max(&mut self) -> u64 {
        self.rng.gen_range(0..(1u64 << self.config.width))
    }

    fn sample_add(&mut self) -> Transform {
        let v = self.rng.gen_range(0..additive_limit(self.config.width));
        Transform::add(v, self.config.width)
    }

    fn sample_sub(&mut self) -> Transform {
        let v = self.rng.gen_range(0..additive_limit(self.config.width));
        Transform::sub(v, self.config.width)
    }

    fn sample_xor(&mut self) -> Transform {
        let v = self.random_max();
        Transform::xor(v, self.config.width)
    }

    fn sample_rot_l(&mut self) -> Transform {
        let k = self.rng.gen_range(0..self.config.width - 1) + 1;
        Transform::rot_l(k, self.config.width)
    }

    fn sample_rot_r(&mut self) -> Transform {
        let k = self.rng.gen_range(0..self.config.width - 1) + 1;
        Transform::rot_r(k, self.config.width)
    }

    fn sample_perm(&mut self) -> Transform {
        let width = self.config.width;
        loop {
            let pos1 = self.rng.gen_range(0..width);
            let pos2 = self.rng.gen_range(0..width);
            let bits = self.rng.gen_range(0..width - 2) + 2;
            if pos1 + bits < width && pos2 + bits < width {
                return Transform::perm(pos1, pos2, bits, width);
            }
        }
    }

    fn sample_mul_mod(&mut self) -> Transform {
        let width = self.config.width;
        let modulus = 1u64 << width;
        let limit = multiplicative_limit(width);
        loop {
            let v = self.random_max();
            if v == 1 {
                continue;
            }
            match mod_inverse(v, modulus) {
                Ok(inv) if inv <= limit => return Transform::mul_mod(v, modulus, width),
                _ => continue,
            }
        }
    }

    fn sample_mul_mod_inv(&mut self) -> Transform {
        let width = self.config.width;
        let modulus = 1u64 << width;
        let limit = multiplicative_limit(width);
        loop {
            let v = self.random_max();
            match mod_inverse(v, modulus) {
                Ok(inv) if inv != 1 && v <= limit => {
                    return Transform::mul_mod_inv(v, modulus, width)
                        .expect("mod_inverse was just computed successfully above")
                }
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn seeded_engine(min_ops: usize, max_ops: usize, width: u32, seed: u64) -> Engine<ChaCha8Rng> {
        Engine::with_rng(EngineConfig::new(min_ops, max_ops, width), ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn chain_length_within_bounds() {
        let mut engine = seeded_engine(3, 7, 16, 1);
        for _ in 0..50 {
            let chain = engine.generate_forward();
            assert!(chain.len() >= 3 && chain.len() <= 7);
        }
    }

    #[test]
    fn sampled_mul_mod_never_has_value_one_or_oversized_inverse() {
        let mut engine = seeded_engine(1, 1, 16, 2);
        let limit = multiplicative_limit(16);
        for _ in 0..500 {
            if let Transform::MulMod { value, modulus, .. } = engine.sample_mul_mod() {
                assert_ne!(value, 1);
                assert!(mod_inverse(value, modulus).unwrap() <= limit);
            }
        }
    }

    #[test]
    fn sampled_perm_always_fits_width() {
        let mut engine = seeded_engine(1, 1, 16, 3);
        for _ in 0..500 {
            if let Transform::Perm { pos1, pos2, bits, width } = engine.sample_perm() {
                assert!(pos1 + bits < width);
                assert!(pos2 + bits < width);
            }
        }
    }

    #[test]
    fn context_reverse_chain_recovers_every_code_point() {
        let mut engine = seeded_engine(10, 10, 16, 42);
        let text = "Hello World!";
        let ctx = engine.transform(text).unwrap();
        for (i, c) in text.chars().enumerate() {
            assert_eq!(ctx.reverse().apply(ctx.bytes()[i]).unwrap(), c as u64);
        }
    }

    #[test]
    fn retry_budget_exhaustion_is_reported_not_infinite_looped() {
        // width=4 leaves almost no headroom for any code point above 0x3,
        // every Add/Sub/Xor/MulMod sample is very likely to overflow or not
        // round-trip, so a tiny retry budget should exhaust deterministically
        // without hanging.
        let config = EngineConfig::new(8, 8, 4).with_retry_budget(5);
        let mut engine = Engine::with_rng(config, ChaCha8Rng::seed_from_u64(7));
        let text = "\u{1000}";
        let result = engine.transform(text);
        assert!(matches!(result, Err(EngineError::RetryBudgetExhausted { attempts: 5 })));
    }
}
