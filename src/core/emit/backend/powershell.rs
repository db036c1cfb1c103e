//! PowerShell back-end: a `[uint64[]]` array folded into a `StringBuilder`.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{hex, names::generate_identifier, Backend};

pub struct PowerShellBackend {
    rng: Box<dyn RngCore>,
    variable: String,
    temp: String,
    i: String,
    array: String,
    result: String,
    mask: u64,
    has_permutation: bool,
}

impl PowerShellBackend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        PowerShellBackend {
            rng,
            variable: String::new(),
            temp: String::new(),
            i: String::new(),
            array: String::new(),
            result: String::new(),
            mask: 0,
            has_permutation: false,
        }
    }
}

impl Backend for PowerShellBackend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.variable = format!("${}", generate_identifier(&mut self.rng));
        self.temp = format!("${}", generate_identifier(&mut self.rng));
        self.i = format!("${}", generate_identifier(&mut self.rng));
        self.array = format!("${}", generate_identifier(&mut self.rng));
        self.result = "$string".to_string();
        self.mask = ctx.mask();
        self.has_permutation = ctx.reverse().contains_perm();

        let values = ctx.bytes().iter().map(|b| hex(*b)).collect::<Vec<_>>().join(",");
        format!(
            "[uint64[]]{array} = {values}\n{result} = [System.Text.StringBuilder]::new()\n\
             for ({i} = 0; {i} -lt {array}.Length; {i}++) {{\n\t{var} = {array}[{i}]\n",
            array = self.array,
            values = values,
            result = self.result,
            i = self.i,
            var = self.variable,
        )
    }

    fn finalise(&mut self) -> String {
        let delete = |name: &str| format!("{name} = [void]{name}\n");
        let mut out = format!(
            "\t[void]{result}.Append([char]({var} -band {mask}))\n}}\n",
            result = self.result,
            var = self.variable,
            mask = hex(self.mask),
        );
        out.push_str(&delete(&self.variable));
        out.push_str(&delete(&self.i));
        out.push_str(&delete(&self.array));
        if self.has_permutation {
            out.push_str(&delete(&self.temp));
        }
        out.push_str(&format!(
            "{result} = {result}.ToString()\nWrite-Host {result}",
            result = self.result,
        ));
        out
    }

    fn visit_add(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}++\n", self.variable);
        }
        format!("\t{} += {}\n", self.variable, hex(value))
    }

    fn visit_sub(&mut self, value: u64) -> String {
        if value == 1 {
            return format!("\t{}--\n", self.variable);
        }
        format!("\t{} -= {}\n", self.variable, hex(value))
    }

    fn visit_xor(&mut self, value: u64) -> String {
        format!("\t{var} = {var} -bxor {v}\n", var = self.variable, v = hex(value))
    }

    fn visit_not(&mut self, mask: u64) -> String {
        format!("\t{var} = -bnot {var} -band {m}\n", var = self.variable, m = hex(mask))
    }

    fn visit_rot_l(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} -band {m}) -shr {lhs} ) -bor ({var} -shl {rhs})) -band {m}\n",
            var = self.variable
        )
    }

    fn visit_rot_r(&mut self, lhs: u32, rhs: u32, mask: u64) -> String {
        let m = hex(mask);
        format!(
            "\t{var} = ((({var} -band {m}) -shl {lhs} ) -bor ({var} -shr {rhs})) -band {m}\n",
            var = self.variable
        )
    }

    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String {
        let (p1, p2, b) = (hex(pos1 as u64), hex(pos2 as u64), hex(bits as u64));
        format!(
            "\t{tmp} = (({var} -shr {p1} ) -bxor ({var} -shr {p2})) -band ((1 -shl {b}) - 1)\n\
             \t{var} = {var} -bxor (({tmp} -shl {p1}) -bor ({tmp} -shl {p2}))\n",
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
