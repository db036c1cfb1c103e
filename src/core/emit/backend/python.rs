//! Python back-end: a list of code points folded back into a `str`.
//!
//! Unlike the other high-level back-ends, `Add(1)`/`Sub(1)` are not special-cased
//! to `+=`/`-=` shorthand — Python has no increment/decrement operator, so the
//! general form is already the idiomatic one.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{hex, names::generate_identifier, Backend};

pub struct PythonBackend {
    rng: Box<dyn RngCore>,
    variable: String,
    temp: String,
    i: String,
    result: String,
    mask: u64,
    has_permutation: bool,
}

impl PythonBackend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        PythonBackend {
            rng,
            variable: String::new(),
            temp: String::new(),
            i: String::new(),
            result: String::new(),
            mask: 0,
            has_permutation: false,
        }
    }
}

impl Backend for PythonBackend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.variable = generate_identifier(&mut self.rng);
        self.temp = generate_identifier(&mut self.rng);
        self.i = generate_identifier(&mut self.rng);
        self.mask = ctx.mask();
        self.result = "string".to_string();
        self.has_permutation = ctx.reverse().contains_perm();

        let values = ctx.bytes().iter().map(|b| hex(*b)).collect::<Vec<_>>().join(",");
        format!(
            "{result} = [{values}]\nfor {i} in range(len({result})):\n\t{var} = {result}[{i}]\n",
            result = self.result,
            values = values,
            i = self.i,
            var = self.variable,
        )
    }

    fn finalise(&mut self) -> String {
        let mut out = format!(
            "\t{result}[{i}] = chr({var} & {mask})\n",
            result = self.result,
            i = self.i,
            var = self.variable,
            mask = hex(self.mask),
        );
        if self.has_permutation {
            out.push_str(&format!("del {}, {}, {}\n", self.i, self.variable, self.temp));
        } else {
            out.push_str(&format!("del {}, {}\n", self.i, self.variable));
        }
        out.push_str(&format!("{result} = ''.join({result})\nprint({result})", result = self.result));
        out
    }

    fn visit_add(&mut self, value: u64) -> String {
        format!("\t{} += {}\n", self.variable, hex(value))
    }

    fn visit_sub(&mut self, value: u64) -> String {
        format!("\t{} -= {}\n", self.variable, hex(value))
    }

    fn visit_xor(&mut self, value: u64) -> String {
        format!("\t{} ^= {}\n", self.variable, hex(value))
    }

    fn visit_not(&mut self, mask: u64) -> String {
        format!("\t{var} = ~{var} & {m}\n", var = self.variable, m = hex(mask))
    }

    fn visit_rot_l(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} & {m}) >> {lhs}) | ({var} << {rhs})) & {m}\n",
            var = self.variable
        )
    }

    fn visit_rot_r(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} & {m}) << {lhs}) | ({var} >> {rhs})) & {m}\n",
            var = self.variable
        )
    }

    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String {
        let (p1, p2, b) = (hex(pos1 as u64), hex(pos2 as u64), hex(bits as u64));
        format!(
            "\t{tmp} = (({var} >> {p1}) ^ ({var} >> {p2})) & ((1 << {b}) - 1)\n\
             \t{var} ^= ({tmp} << {p1}) | ({tmp} << {p2})\n",
            tmp = self.temp,
            var = self.variable,
        )
    }

    fn visit_mul_mod(&mut self, value: u64, modulus: u64) -> String {
        format!("\t{var} = ({var} * {v}) % {m}\n", var = self.variable, v = hex(value), m = hex(modulus))
    }

    fn visit_mul_mod_inv(&mut self, _value: u64, inverse: u64, modulus: u64) -> String {
        self.visit_mul_mod(inverse, modulus)
    }
}
