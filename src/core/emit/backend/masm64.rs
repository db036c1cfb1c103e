//! MASM64 back-end: straight-line x86-64 assembly, no branches but the loop.
//!
//! The notable specialisation among the eight targets — everything else in
//! this module operates over one register-width "block" selected from
//! `width` up front (8/16/32/64-bit), picking matching register names, data
//! directives, and pointer sizes for the whole snippet.

use rand::RngCore;

use crate::core::context::Context;
use crate::core::emit::{names::generate_identifier, Backend};

const IMMEDIATE_HEX_DIGITS: [usize; 4] = [2, 4, 8, 16];
const DATA_TYPES: [&str; 4] = ["db", "dw", "dd", "dq"];
const DATA_TYPES_PTR: [&str; 4] = ["byte", "word", "dword", "qword"];

#[rustfmt::skip]
const REGISTERS: [[&str; 4]; 16] = [
    ["al", "ax", "eax", "rax"],
    ["bl", "bx", "ebx", "rbx"],
    ["cl", "cx", "ecx", "rcx"],
    ["dl", "dx", "edx", "rdx"],
    ["dil", "di", "edi", "rdi"],
    ["sil", "si", "esi", "rsi"],
    ["bpl", "bp", "ebp", "rbp"],
    ["spl", "sp", "esp", "rsp"],
    ["r8l", "r8w", "r8d", "r8"],
    ["r9l", "r9w", "r9d", "r9"],
    ["r10l", "r10w", "r10d", "r10"],
    ["r11l", "r11w", "r11d", "r11"],
    ["r12l", "r12w", "r12d", "r12"],
    ["r13l", "r13w", "r13d", "r13"],
    ["r14l", "r14w", "r14d", "r14"],
    ["r15l", "r15w", "r15d", "r15"],
];

const RAX: usize = 0;
const RDX: usize = 3;
const RCX: usize = 2;
const R8: usize = 8;
const R9: usize = 9;
const R10: usize = 10;

pub struct Masm64Backend {
    rng: Box<dyn RngCore>,
    block: usize,
    increment: usize,
    shadow_space: u32,
    result: String,
    loop_name: String,
    size: usize,
    i: String,
    variable: String,
}

impl Masm64Backend {
    pub fn new(rng: Box<dyn RngCore>) -> Self {
        Masm64Backend {
            rng,
            block: 0,
            increment: 0,
            shadow_space: 32,
            result: String::new(),
            loop_name: String::new(),
            size: 0,
            i: String::new(),
            variable: String::new(),
        }
    }

    fn reg(&self, id: usize) -> &'static str {
        REGISTERS[id][self.block]
    }

    /// MASM immediate literal syntax: a leading `0`, zero-padded hex digits
    /// sized for the selected block, and a trailing `h` — distinct from the
    /// `0xNNNN` convention the other seven back-ends share.
    fn masm_hex(&self, value: u64) -> String {
        format!("0{:0width$x}h", value, width = IMMEDIATE_HEX_DIGITS[self.block])
    }
}

impl Backend for Masm64Backend {
    fn initialise(&mut self, ctx: &Context) -> String {
        self.block = ((ctx.width() as usize).saturating_sub(1)) / 8;
        self.block = self.block.min(3);
        self.increment = IMMEDIATE_HEX_DIGITS[self.block] / 2;
        self.result = "string".to_string();
        self.loop_name = generate_identifier(&mut self.rng);
        self.shadow_space = 32;
        self.i = self.reg(RCX).to_string();
        self.variable = self.reg(RDX).to_string();
        self.size = ctx.bytes().len();

        let values = ctx.bytes().iter().map(|b| self.masm_hex(*b)).collect::<Vec<_>>().join(",");
        format!(
            "extern GetStdHandle: proc\n\
             extern WriteFile: proc\n\
             extern GetFileType: proc\n\
             extern WriteConsoleW: proc\n\n\
             .data?\n\tstdout\tdq ?\n\twritten\tdq ?\n\
             .data\n\t{result} {dtype} {values}\n\tlen\tequ $-{result}\n\
             .code\n\
             main proc\n\
             \tpush\trbp\n\
             \tmov\trbp, rsp\n\
             \tsub\trsp, {shadow}\n\
             \tand\trsp, -10h\n\n\
             \tmov\trbx, offset {result}\n\
             \txor\trcx, rcx\n\
             {loop_name}:\n\
             \txor\trax, rax\n\
             \txor\trdx, rdx\n\
             \txor\tr8, r8\n\
             \txor\tr9, r9\n\
             \txor\tr10, r10\n\
             \tmov\t{var}, {ptr} ptr [rbx + rcx*{inc}]\n",
            result = self.result,
            dtype = DATA_TYPES[self.block],
            values = values,
            shadow = self.shadow_space,
            loop_name = self.loop_name,
            var = self.variable,
            ptr = DATA_TYPES_PTR[self.block],
            inc = self.increment,
        )
    }

    fn finalise(&mut self) -> String {
        format!(
            "\tmov\t{ptr} ptr [rbx + rcx*{inc}], {var}\n\
             \tinc\t{i}\n\
             \tcmp\t{i}, {size}\n\
             \tjne\t{loop_name}\n\n\
             \t; Printing code\n\
             \txor\trax, rax\n\
             \txor\trcx, rcx\n\
             \txor\trdx, rdx\n\
             \txor\tr8, r8\n\
             \txor\tr9, r9\n\
             \tmov\trcx, -11\n\
             \tcall\tGetStdHandle\n\
             \tmov\t[stdout], rax\n\
             \tmov\trcx, rax\n\
             \tcall\tGetFileType\n\
             \tcmp\trax, 1\n\
             \tje\tfileWrite\n\
             \tmov\trcx, [stdout]\n\
             \tmov\trdx, rbx\n\
             \tmov\tr8, len\n\
             \tmov\tr9, written\n\
             \tcall\tWriteConsoleW\n\
             \tjmp\tepilog\n\
             fileWrite:\n\
             \tmov\trcx, [stdout]\n\
             \tmov\trdx, rbx\n\
             \tmov\tr8, len\n\
             \tmov\tr9, written\n\
             \tcall\tWriteFile\n\
             epilog:\n\
             \tadd\trsp, {shadow}\n\
             \tmov\trsp, rbp\n\
             \tpop\trbp\n\
             \tret\n\
             main endp\n\
             end",
            ptr = DATA_TYPES_PTR[self.block],
            inc = self.increment,
            var = self.variable,
            i = self.i,
            size = self.size,
            loop_name = self.loop_name,
            shadow = self.shadow_space,
        )
    }

    fn visit_add(&mut self, value: u64) -> String {
        format!("\tadd\t{}, {}\n", self.variable, value)
    }

    fn visit_sub(&mut self, value: u64) -> String {
        format!("\tsub\t{}, {}\n", self.variable, value)
    }

    fn visit_xor(&mut self, value: u64) -> String {
        format!("\txor\t{}, {}\n", self.variable, value)
    }

    fn visit_not(&mut self, _mask: u64) -> String {
        format!("\tnot\t{}\n", self.variable)
    }

    fn visit_rot_l(&mut self, _lhs: u32, rhs: u32, _mask: u64) -> String {
        format!("\trol\t{}, {}\n", self.variable, rhs)
    }

    fn visit_rot_r(&mut self, _lhs: u32, rhs: u32, _mask: u64) -> String {
        format!("\tror\t{}, {}\n", self.variable, rhs)
    }

    fn visit_perm(&mut self, pos1: u32, pos2: u32, bits: u32) -> String {
        let (r8, r9, r10) = (self.reg(R8), self.reg(R9), self.reg(R10));
        format!(
            "\tmov\t{r8}, {var}\n\
             \tshr\t{r8}, {pos1}\n\
             \tmov\t{r9}, {var}\n\
             \tshr\t{r9}, {pos2}\n\
             \txor\t{r8}, {r9}\n\
             \tmov\t{r9}, 1\n\
             \tshl\t{r9}, {bits}\n\
             \tsub\t{r9}, 1\n\
             \tand\t{r8}, {r9}\n\
             \tmov\t{r9}, {r8}\n\
             \tshl\t{r9}, {pos1}\n\
             \tmov\t{r10}, {r8}\n\
             \tshl\t{r10}, {pos2}\n\
             \tor\t{r9}, {r10}\n\
             \txor\t{var}, {r9}\n",
            var = self.variable,
        )
    }

    // rdx aliases `variable`. `mul` leaves the product split across rdx:rax;
    // since the engine only ever admits products below 2^width < 2^64, rdx
    // is already zero afterwards. `div` then leaves the quotient in rax and
    // the remainder — the result we want — directly in rdx, so no final
    // move back into the variable is needed (an earlier draft clobbered the
    // remainder with the quotient here).
    fn visit_mul_mod(&mut self, value: u64, modulus: u64) -> String {
        let (rax, rdx, r8) = (self.reg(RAX), self.reg(RDX), self.reg(R8));
        format!(
            "\tmov\t{rax}, {rdx}\n\
             \txor\t{rdx}, {rdx}\n\
             \tmov\t{r8}, {value}\n\
             \tmul\t{r8}\n\
             \tmov\t{r8}, {modulus}\n\
             \tdiv\t{r8}\n",
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
    use crate::core::transform::mask;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> Box<dyn RngCore> {
        Box::new(ChaCha8Rng::seed_from_u64(1))
    }

    fn ctx_with_width(width: u32, bytes: Vec<u64>) -> Context {
        let forward = Chain::new(vec![]);
        let reverse = forward.invert();
        Context::new(width, mask(width), bytes, forward, reverse)
    }

    #[test]
    fn register_block_and_data_directive_are_selected_from_the_bit_width() {
        let mut byte_backend = Masm64Backend::new(rng());
        let out = byte_backend.initialise(&ctx_with_width(8, vec![0x41]));
        assert!(out.contains("\tstring db 041h"));
        assert_eq!(byte_backend.reg(RDX), "dl");

        let mut word_backend = Masm64Backend::new(rng());
        let out = word_backend.initialise(&ctx_with_width(16, vec![0x41]));
        assert!(out.contains("\tstring dw 0041h"));
        assert_eq!(word_backend.reg(RDX), "dx");
    }

    #[test]
    fn add_and_sub_never_special_case_to_increment_decrement_mnemonics() {
        let mut backend = Masm64Backend::new(rng());
        let _ = backend.initialise(&ctx_with_width(16, vec![0x41]));
        let add = backend.visit_add(1);
        assert!(add.contains("\tadd\t"));
        assert!(!add.contains("inc\t"));
        let sub = backend.visit_sub(1);
        assert!(sub.contains("\tsub\t"));
        assert!(!sub.contains("dec\t"));
    }

    #[test]
    fn permutation_lowers_through_the_three_fixed_scratch_registers() {
        let mut backend = Masm64Backend::new(rng());
        let _ = backend.initialise(&ctx_with_width(16, vec![0x41]));
        let out = backend.visit_perm(0, 5, 2);
        assert!(out.contains(backend.reg(R8)));
        assert!(out.contains(backend.reg(R9)));
        assert!(out.contains(backend.reg(R10)));
    }

    #[test]
    fn mul_mod_lowers_to_mul_then_div_without_a_trailing_move() {
        let mut backend = Masm64Backend::new(rng());
        let _ = backend.initialise(&ctx_with_width(16, vec![0x41]));
        let out = backend.visit_mul_mod(3, 1 << 16);
        assert!(out.contains("\tmul\t"));
        let div_pos = out.find("\tdiv\t").expect("div instruction present");
        assert!(
            !out[div_pos..].contains("mov"),
            "nothing should overwrite the remainder div leaves behind: {out}"
        );
    }

    #[test]
    fn mul_mod_inv_reuses_mul_mod_with_the_precomputed_inverse() {
        let mut backend = Masm64Backend::new(rng());
        let _ = backend.initialise(&ctx_with_width(16, vec![0x41]));
        assert_eq!(backend.visit_mul_mod_inv(3, 11, 17), backend.visit_mul_mod(11, 17));
    }
}
