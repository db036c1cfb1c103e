//! Java back-end: a `StringBuilder` mutated in place via `charAt`/`setCharAt`.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{hex, names::generate_identifier, Backend};

pub struct JavaBackend {
    rng: Box<dyn RngCore>,
    variable: String,
    temp: String,
    i: String,
    result: String,
}

impl JavaBackend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        JavaBackend { rng, variable: String::new(), temp: String::new(), i: String::new(), result: String::new() }
    }
}

impl Backend for JavaBackend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.variable = generate_identifier(&mut self.rng);
        self.temp = generate_identifier(&mut self.rng);
        self.i = generate_identifier(&mut self.rng);
        self.result = "string".to_string();

        let escapes = ctx.bytes().iter().map(|b| format!("\\u{b:04x}")).collect::<Vec<_>>().join("");
        let permutation = if ctx.reverse().contains_perm() { format!(", {}", self.temp) } else { String::new() };
        format!(
            "StringBuilder {result} = new StringBuilder(\"{escapes}\");\n\
             for (int {i}=0, {var}{perm}; {i} < {result}.length(); {i}++) {{\n\t{var} = {result}.charAt({i});\n",
            result = self.result,
            escapes = escapes,
            i = self.i,
            var = self.variable,
            perm = permutation,
        )
    }

    fn finalise(&mut self) -> String {
        format!(
            "\t{result}.setCharAt({i}, (char) {var});\n}}\nSystem.out.println({result});",
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
