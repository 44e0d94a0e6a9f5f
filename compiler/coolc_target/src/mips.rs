// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use std::fmt::{Display, Write};

use crate::layout::WORD_SIZE;
use crate::reg::{Register, SP};

/// Longest run of characters emitted inside a single `.ascii` directive.
const MAX_ASCII_RUN: usize = 64;

/// Accumulates SPIM assembly text.
///
/// Memory offsets taken by the `emit_*` helpers are in words; the writer
/// scales them to bytes.
#[derive(Debug, Default)]
pub struct AsmWriter {
    code: String,
    next_label: usize
}

impl AsmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn into_code(self) -> String {
        self.code
    }

    /// Reserves a fresh numeric label.
    pub fn new_label(&mut self) -> usize {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    fn emit_inst(&mut self, op: &str, operands: &str) {
        let _ = writeln!(self.code, "\t{op}\t{operands}");
    }

    pub fn emit_comment(&mut self, text: &str) {
        let _ = writeln!(self.code, "# {text}");
    }

    pub fn emit_data(&mut self) {
        self.code.push_str("\t.data\n");
    }

    pub fn emit_text(&mut self) {
        self.code.push_str("\t.text\n");
    }

    pub fn emit_align(&mut self, log2: usize) {
        let _ = writeln!(self.code, "\t.align\t{log2}");
    }

    pub fn emit_globl(&mut self, symbol: &str) {
        let _ = writeln!(self.code, "\t.globl\t{symbol}");
    }

    pub fn emit_label_def(&mut self, symbol: &str) {
        let _ = writeln!(self.code, "{symbol}:");
    }

    /// Defines numeric label `label`.
    pub fn emit_label(&mut self, label: usize) {
        let _ = writeln!(self.code, "label{label}:");
    }

    pub fn emit_word(&mut self, value: impl Display) {
        let _ = writeln!(self.code, "\t.word\t{value}");
    }

    pub fn emit_byte(&mut self, value: u8) {
        let _ = writeln!(self.code, "\t.byte\t{value}");
    }

    /// Emits `value` as `.ascii` runs. Quotes, backslashes, newlines and
    /// tabs are escaped; any other non-printable byte gets its own `.byte`.
    pub fn emit_ascii(&mut self, value: &str) {
        let mut run = String::new();
        let mut run_len = 0;
        for byte in value.bytes() {
            match byte {
                b'\n' => run.push_str("\\n"),
                b'\t' => run.push_str("\\t"),
                b'\\' => run.push_str("\\\\"),
                b'"' => run.push_str("\\\""),
                0x20..=0x7e => run.push(byte as char),
                _ => {
                    self.flush_ascii(&mut run);
                    run_len = 0;
                    self.emit_byte(byte);
                    continue;
                }
            }
            run_len += 1;
            if run_len == MAX_ASCII_RUN {
                self.flush_ascii(&mut run);
                run_len = 0;
            }
        }
        self.flush_ascii(&mut run);
    }

    fn flush_ascii(&mut self, run: &mut String) {
        if !run.is_empty() {
            let _ = writeln!(self.code, "\t.ascii\t\"{run}\"");
            run.clear();
        }
    }

    pub fn emit_lw(&mut self, dest: Register, offset: usize, base: Register) {
        self.emit_inst("lw", &format!("{dest} {}({base})", offset * WORD_SIZE));
    }

    pub fn emit_sw(&mut self, src: Register, offset: usize, base: Register) {
        self.emit_inst("sw", &format!("{src} {}({base})", offset * WORD_SIZE));
    }

    pub fn emit_li(&mut self, dest: Register, value: i64) {
        self.emit_inst("li", &format!("{dest} {value}"));
    }

    pub fn emit_la(&mut self, dest: Register, address: &str) {
        self.emit_inst("la", &format!("{dest} {address}"));
    }

    pub fn emit_move(&mut self, dest: Register, src: Register) {
        self.emit_inst("move", &format!("{dest} {src}"));
    }

    pub fn emit_neg(&mut self, dest: Register, src: Register) {
        self.emit_inst("neg", &format!("{dest} {src}"));
    }

    pub fn emit_add(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit_inst("add", &format!("{dest} {lhs} {rhs}"));
    }

    pub fn emit_addu(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit_inst("addu", &format!("{dest} {lhs} {rhs}"));
    }

    pub fn emit_addiu(&mut self, dest: Register, src: Register, imm: i64) {
        self.emit_inst("addiu", &format!("{dest} {src} {imm}"));
    }

    pub fn emit_sub(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit_inst("sub", &format!("{dest} {lhs} {rhs}"));
    }

    pub fn emit_mul(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit_inst("mul", &format!("{dest} {lhs} {rhs}"));
    }

    pub fn emit_div(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit_inst("div", &format!("{dest} {lhs} {rhs}"));
    }

    pub fn emit_sll(&mut self, dest: Register, src: Register, shift: usize) {
        self.emit_inst("sll", &format!("{dest} {src} {shift}"));
    }

    pub fn emit_jal(&mut self, target: &str) {
        self.emit_inst("jal", target);
    }

    pub fn emit_jalr(&mut self, target: Register) {
        self.emit_inst("jalr", target.name);
    }

    pub fn emit_return(&mut self, ra: Register) {
        self.emit_inst("jr", ra.name);
    }

    pub fn emit_branch(&mut self, label: usize) {
        self.emit_inst("b", &format!("label{label}"));
    }

    pub fn emit_beqz(&mut self, src: Register, label: usize) {
        self.emit_inst("beqz", &format!("{src} label{label}"));
    }

    pub fn emit_beq(&mut self, lhs: Register, rhs: Register, label: usize) {
        self.emit_inst("beq", &format!("{lhs} {rhs} label{label}"));
    }

    pub fn emit_bne(&mut self, lhs: Register, rhs: Register, label: usize) {
        self.emit_inst("bne", &format!("{lhs} {rhs} label{label}"));
    }

    pub fn emit_blt(&mut self, lhs: Register, rhs: Register, label: usize) {
        self.emit_inst("blt", &format!("{lhs} {rhs} label{label}"));
    }

    pub fn emit_bleq(&mut self, lhs: Register, rhs: Register, label: usize) {
        self.emit_inst("ble", &format!("{lhs} {rhs} label{label}"));
    }

    pub fn emit_blti(&mut self, src: Register, imm: i64, label: usize) {
        self.emit_inst("blt", &format!("{src} {imm} label{label}"));
    }

    pub fn emit_bgti(&mut self, src: Register, imm: i64, label: usize) {
        self.emit_inst("bgt", &format!("{src} {imm} label{label}"));
    }

    /// Pushes `reg` on the stack.
    pub fn emit_push(&mut self, reg: Register) {
        self.emit_sw(reg, 0, SP);
        self.emit_addiu(SP, SP, -(WORD_SIZE as i64));
    }

    /// Pops the stack top into `reg`.
    pub fn emit_pop(&mut self, reg: Register) {
        self.emit_lw(reg, 1, SP);
        self.emit_addiu(SP, SP, WORD_SIZE as i64);
    }

    /// Drops `words` words off the stack.
    pub fn emit_pop_words(&mut self, words: usize) {
        if words > 0 {
            self.emit_addiu(SP, SP, (words * WORD_SIZE) as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::{ACC, SELF, T1};

    #[test]
    fn test_offsets_are_scaled_to_bytes() {
        let mut w = AsmWriter::new();
        w.emit_lw(ACC, 3, SELF);
        w.emit_sw(T1, 0, SP);
        assert_eq!(w.code(), "\tlw\t$a0 12($s0)\n\tsw\t$t1 0($sp)\n");
    }

    #[test]
    fn test_push_and_pop() {
        let mut w = AsmWriter::new();
        w.emit_push(ACC);
        w.emit_pop(T1);
        assert_eq!(
            w.code(),
            "\tsw\t$a0 0($sp)\n\taddiu\t$sp $sp -4\n\tlw\t$t1 4($sp)\n\taddiu\t$sp $sp 4\n"
        );
    }

    #[test]
    fn test_ascii_escapes() {
        let mut w = AsmWriter::new();
        w.emit_ascii("a\"b\\c\n\u{1}");
        assert_eq!(w.code(), "\t.ascii\t\"a\\\"b\\\\c\\n\"\n\t.byte\t1\n");
    }

    #[test]
    fn test_long_strings_are_split() {
        let mut w = AsmWriter::new();
        w.emit_ascii(&"x".repeat(MAX_ASCII_RUN + 1));
        assert_eq!(w.code().matches(".ascii").count(), 2);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut w = AsmWriter::new();
        let a = w.new_label();
        let b = w.new_label();
        assert_ne!(a, b);
        w.emit_branch(b);
        w.emit_label(b);
        assert_eq!(w.code(), "\tb\tlabel1\nlabel1:\n");
    }
}
