// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use coolc_ast::{Expr, ExprKind};
use coolc_const::ConstPool;
use coolc_errors::CodegenResult;
use coolc_target::layout::*;
use coolc_target::runtime::*;
use log::debug;

use crate::basic::BASIC_FILENAME;
use crate::cgen::CodeGenerator;
use crate::class_table::ClassTable;

/// Interns every literal the generated code can refer to: class names
/// (for `class_nameTab`), file names (for the abort handlers), the
/// default values of the primitives and every literal in the program.
pub fn collect_constants(table: &ClassTable, pool: &mut ConstPool) {
    pool.insert_str("");
    pool.insert_int(0);
    pool.insert_str(BASIC_FILENAME);

    for node in table.class_nodes() {
        pool.insert_str(node.name());
        pool.insert_str(node.filename());

        let decl = node.decl();
        for attr in decl.attribs() {
            collect_expr(&attr.init, pool);
        }
        for method in decl.methods() {
            collect_expr(&method.body, pool);
        }
    }

    debug!("constant pool: {} entries", pool.len());
}

fn collect_expr(expr: &Expr, pool: &mut ConstPool) {
    match &expr.kind {
        ExprKind::IntConst { value } => {
            pool.insert_int(*value);
        },
        ExprKind::StringConst { value } => {
            pool.insert_str(value);
        },
        _ => expr.for_each_child(|child| collect_expr(child, pool))
    }
}

impl CodeGenerator<'_> {
    /// Emits every pooled literal as a preallocated object.
    pub(crate) fn code_constants(&mut self) -> CodegenResult<()> {
        let pool = self.pool;
        let string_tag = self.table.string_tag();
        for (entry, value) in pool.strings() {
            let len_label = pool.int_label(value.len() as i32)?;
            self.asm.emit_word(EYE_CATCHER);
            self.asm.emit_label_def(&entry.label());
            self.asm.emit_word(string_tag);
            self.asm.emit_word(string_object_words(value.len()));
            self.asm.emit_word(disptab(coolc_ast::names::STRING));
            self.asm.emit_word(len_label);
            self.asm.emit_ascii(value);
            self.asm.emit_byte(0);
            self.asm.emit_align(LOG_WORD_SIZE);
        }

        let int_tag = self.table.int_tag();
        for (entry, value) in pool.ints() {
            self.asm.emit_word(EYE_CATCHER);
            self.asm.emit_label_def(&entry.label());
            self.asm.emit_word(int_tag);
            self.asm.emit_word(DEFAULT_OBJFIELDS + INT_SLOTS);
            self.asm.emit_word(disptab(coolc_ast::names::INT));
            self.asm.emit_word(value);
        }

        let bool_tag = self.table.bool_tag();
        for value in [false, true] {
            self.asm.emit_word(EYE_CATCHER);
            self.asm.emit_label_def(&pool.bool_label(value));
            self.asm.emit_word(bool_tag);
            self.asm.emit_word(DEFAULT_OBJFIELDS + BOOL_SLOTS);
            self.asm.emit_word(disptab(coolc_ast::names::BOOL));
            self.asm.emit_word(value as u8);
        }
        Ok(())
    }
}
