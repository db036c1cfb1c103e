//! C# back-end: a `StringBuilder` walked with an in-place index loop.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{hex, names::generate_identifier, Backend};

pub struct CSharpBackend {
    rng: Box<dyn RngCore>,
    variable: String,
    temp: String,
    i: String,
    result: String,
}

impl CSharpBackend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        CSharpBackend { rng, variable: String::new(), temp: String::new(), i: String::new(), result: String::new() }
    }
}

impl Backend for CSharpBackend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.variable = generate_identifier(&mut self.rng);
        self.temp = generate_identifier(&mut self.rng);
        self.i = generate_identifier(&mut self.rng);
        self.result = "str".to_string();

        let escapes = ctx.bytes().iter().map(|b| format!("\\u{b:04x}")).collect::<Vec<_>>().join("");
        let permutation = if ctx.reverse().contains_perm() { format!(", {}", self.temp) } else { String::new() };
        format!(
            "var {result} = new System.Text.StringBuilder(\"{escapes}\");\n\
             for (int {i}=0, {var}{perm}; {i} < {result}.Length; {i}++) {{\n\t{var} = {result}[{i}];\n",
            result = self.result,
            escapes = escapes,
            i = self.i,
            var = self.variable,
            perm = permutation,
        )
    }

    fn finalise(&mut self) -> String {
        format!(
            "\t{result}[{i}] = (char) {var};\n}}\nConsole.WriteLine({result});",
            result = self.result,
            i = self.i,
            var = self.variable,
        )
    }

    fn visit_add(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}++;\n", self.variable);
        }
        format!("\t{} += {};\n", self.variable, hex(value))
    }

    fn visit_sub(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}--;\n", self.variable);
        }
        format!("\t{} -= {};\n", self.variable, hex(value))
    }

    fn visit_xor(&mut self, value: u64) -> String {
        format!("\t{} ^= {};\n", self.variable, hex(value))
    }

    fn visit_not(&mut self, mask: u64) -> String {
        format!("\t{var} = ~{var} & {m};\n", var = self.variable, m = hex(mask))
    }

    fn visit_rot_l(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} & {m}) >> {lhs}) | ({var} << {rhs})) & {m};\n",
            var = self.variable
        )
    }

    fn visit_rot_r(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} & {m}) << {lhs}) | ({var} >> {rhs})) & {m};\n",
            var = self.variable
        )
    }

    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String {
        let (p1, p2, b) = (hex(pos1 as u64), hex(pos2 as u64), hex(bits as u64));
        format!(
            "\t{tmp} = (({var} >> {p1}) ^ ({var} >> {p2})) & ((1 << {b}) - 1);\n\
             \t{var} ^= ({tmp} << {p1}) | ({tmp} << {p2});\n",
            tmp = self.temp,
            var = self.variable,
        )
    }

    fn visit_mul_mod(&mut self, value: u64, modulus: u64) -> String {
        format!("\t{var} = ({var} * {v}) % {m};\n", var = self.variable, v = hex(value), m = hex(modulus))
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
    fn initialise_declares_the_byte_array_as_unicode_escapes() {
        let ctx = ctx_with(Chain::new(vec![Transform::xor(1, 16)]));
        let out = CSharpBackend::new(rng()).initialise(&ctx);
        assert!(out.contains("\\u0048"));
        assert!(out.contains("\\u0065"));
    }

    #[test]
    fn add_one_and_sub_one_render_as_increment_decrement() {
        let mut backend = CSharpBackend::new(rng());
        assert!(backend.visit_add(1).contains("++"));
        assert!(backend.visit_sub(1).contains("--"));
        assert!(!backend.visit_add(2).contains("++"));
        assert!(!backend.visit_sub(2).contains("--"));
    }

    #[test]
    fn scratch_temporary_is_declared_only_when_chain_contains_a_permutation() {
        let with_perm = ctx_with(Chain::new(vec![Transform::perm(0, 5, 2, 16)]));
        let mut backend = CSharpBackend::new(rng());
        let out = emit(&with_perm, &mut backend);
        assert!(out.contains(&format!(", {}", backend.temp)));

        let without_perm = ctx_with(Chain::new(vec![Transform::xor(1, 16)]));
        let mut backend = CSharpBackend::new(rng());
        let out = emit(&without_perm, &mut backend);
        assert!(!out.contains(&format!(", {}", backend.temp)));
    }
}
