//! Bash back-end: `((...))` arithmetic expansions over an indexed array.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{hex, names::generate_identifier, Backend};

pub struct BashBackend {
    rng: Box<dyn RngCore>,
    variable_name: String,
    temp_name: String,
    i_name: String,
    result_name: String,
    has_permutations: bool,
}

impl BashBackend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        BashBackend {
            rng,
            variable_name: String::new(),
            temp_name: String::new(),
            i_name: String::new(),
            result_name: String::new(),
            has_permutations: false,
        }
    }

    /// Arithmetic expansion: wraps an already-formatted expression in `((...))`.
    fn ae(expr: &str) -> String {
        format!("(({expr}))")
    }
}

impl Backend for BashBackend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.variable_name = generate_identifier(&mut self.rng);
        self.temp_name = generate_identifier(&mut self.rng);
        self.i_name = generate_identifier(&mut self.rng);
        self.result_name = "string".to_string();
        self.has_permutations = ctx.reverse().contains_perm();

        let values = ctx.bytes().iter().map(|b| hex(*b)).collect::<Vec<_>>().join(" ");
        format!(
            "{result}=( {values} )\nfor {i} in ${{!{result}[@]}}; do\n\t{var}=${{{result}[${i}]}}\n",
            result = self.result_name,
            values = values,
            i = self.i_name,
            var = self.variable_name,
        )
    }

    fn finalise(&mut self) -> String {
        let mut out = format!(
            "\t{result}[${i}]=${var}\ndone\nunset {i}\nunset {var}\n",
            result = self.result_name,
            i = self.i_name,
            var = self.variable_name,
        );
        if self.has_permutations {
            out.push_str(&format!("unset {}\n", self.temp_name));
        }
        out.push_str(&format!(
            "{result}=$(printf %b \"$(printf '\\U%x' \"${{{result}[@]}}\")\")\necho ${result}",
            result = self.result_name
        ));
        out
    }

    fn visit_add(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}\n", Self::ae(&format!("{}++", self.variable_name)));
        }
        format!("\t{}\n", Self::ae(&format!("{} += {}", self.variable_name, hex(value))))
    }

    fn visit_sub(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}\n", Self::ae(&format!("{}--", self.variable_name)));
        }
        format!("\t{}\n", Self::ae(&format!("{} -= {}", self.variable_name, hex(value))))
    }

    fn visit_xor(&mut self, value: u64) -> String {
        format!("\t{}\n", Self::ae(&format!("{} ^= {}", self.variable_name, hex(value))))
    }

    fn visit_not(&mut self, mask: u64) -> String {
        format!("\t{}\n", Self::ae(&format!("{var} = ~{var} & {m}", var = self.variable_name, m = hex(mask))))
    }

    fn visit_rot_l(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{}\n",
            Self::ae(&format!(
                "{var} = ((({var} & {m}) >> {lhs}) | ({var} << {rhs})) & {m}",
                var = self.variable_name
            ))
        )
    }

    fn visit_rot_r(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{}\n",
            Self::ae(&format!(
                "{var} = ((({var} & {m}) << {lhs}) | ({var} >> {rhs})) & {m}",
                var = self.variable_name
            ))
        )
    }

    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String {
        let mut out = format!(
            "\t{}\n",
            Self::ae(&format!(
                "{tmp} = (({var} >> {p1}) ^ ({var} >> {p2})) & ((1 << {bits})-1)",
                tmp = self.temp_name,
                var = self.variable_name,
                p1 = hex(pos1 as u64),
                p2 = hex(pos2 as u64),
                bits = hex(bits as u64),
            ))
        );
        out.push_str(&format!(
            "\t{}\n",
            Self::ae(&format!(
                "{var} ^= ({tmp} << {p1}) | ({tmp} << {p2})",
                var = self.variable_name,
                tmp = self.temp_name,
                p1 = hex(pos1 as u64),
                p2 = hex(pos2 as u64),
            ))
        ));
        out
    }

    fn visit_mul_mod(&mut self, value: u64, modulus: u64) -> String {
        format!(
            "\t{}\n",
            Self::ae(&format!(
                "{var} = ({var} * {v}) % {m}",
                var = self.variable_name,
                v = hex(value),
                m = hex(modulus),
            ))
        )
    }

    fn visit_mul_mod_inv(&mut self, _value: u64, inverse: u64, modulus: u64) -> String {
        self.visit_mul_mod(inverse, modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::Chain;
    use crate::core::emit::emit;
    use crate::core::transform::{mask, Transform};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> Box<dyn RngCore> {
        Box::new(ChaCha8Rng::seed_from_u64(1))
    }

    fn ctx_with(forward: Chain) -> Context {
        let reverse = forward.invert();
        Context::new(16, mask(16), vec![0x48, 0x65], forward, reverse)
    }

    #[test]
    fn initialise_declares_the_byte_array_as_hex_literals() {
        let ctx = ctx_with(Chain::new(vec![Transform::xor(1, 16)]));
        let out = BashBackend::new(rng()).initialise(&ctx);
        assert!(out.contains("0x0048"));
        assert!(out.contains("0x0065"));
    }

    #[test]
    fn add_one_and_sub_one_render_as_increment_decrement() {
        let mut backend = BashBackend::new(rng());
        assert!(backend.visit_add(1).contains("++"));
        assert!(backend.visit_sub(1).contains("--"));
        assert!(!backend.visit_add(2).contains("++"));
        assert!(!backend.visit_sub(2).contains("--"));
    }

    #[test]
    fn temp_variable_is_unset_only_when_chain_contains_a_permutation() {
        let with_perm = ctx_with(Chain::new(vec![Transform::perm(0, 5, 2, 16)]));
        let mut backend = BashBackend::new(rng());
        let out = emit(&with_perm, &mut backend);
        assert!(out.contains(&format!("unset {}", backend.temp_name)));

        let without_perm = ctx_with(Chain::new(vec![Transform::xor(1, 16)]));
        let mut backend = BashBackend::new(rng());
        let out = emit(&without_perm, &mut backend);
        assert!(!out.contains(&format!("unset {}", backend.temp_name)));
    }
}
