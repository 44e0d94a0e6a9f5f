// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Stack machine code for expressions. The result of every expression
//! ends up in `$a0`; temporaries are pushed on the stack and recorded
//! in the environment as obstacles so local offsets stay right.

use std::cmp::Reverse;

use coolc_ast::names;
use coolc_ast::{Branch, Expr, ExprKind};
use coolc_errors::{CodegenError, CodegenResult};
use coolc_target::layout::*;
use coolc_target::reg::*;
use coolc_target::runtime::{self, *};
use coolc_target::{AsmWriter, Register};
use itertools::Itertools;

use crate::cgen::{CodeGenerator, Env};

type ArithOp = fn(&mut AsmWriter, Register, Register, Register);
type CompareOp = fn(&mut AsmWriter, Register, Register, usize);

impl<'a> CodeGenerator<'a> {
    pub(crate) fn code_expr(&mut self, expr: &'a Expr, env: &mut Env<'a>) -> CodegenResult<()> {
        match &expr.kind {
            ExprKind::Assign { name, expr: value } => {
                self.code_expr(value, env)?;
                let location = env.resolve(name)?;
                self.emit_store(location);
            },

            ExprKind::StaticDispatch { expr: receiver, type_name, name, actuals } => {
                self.code_dispatch(expr, receiver, Some(type_name.as_str()), name, actuals, env)?;
            },

            ExprKind::Dispatch { expr: receiver, name, actuals } => {
                self.code_dispatch(expr, receiver, None, name, actuals, env)?;
            },

            ExprKind::Cond { pred, then_exp, else_exp } => {
                let else_label = self.asm.new_label();
                let end_label = self.asm.new_label();
                self.code_expr(pred, env)?;
                self.asm.emit_lw(T1, ATTR_OFFSET, ACC);
                self.asm.emit_beqz(T1, else_label);
                self.code_expr(then_exp, env)?;
                self.asm.emit_branch(end_label);
                self.asm.emit_label(else_label);
                self.code_expr(else_exp, env)?;
                self.asm.emit_label(end_label);
            },

            ExprKind::Loop { pred, body } => {
                let start_label = self.asm.new_label();
                let end_label = self.asm.new_label();
                self.asm.emit_label(start_label);
                self.code_expr(pred, env)?;
                self.asm.emit_lw(T1, ATTR_OFFSET, ACC);
                self.asm.emit_beqz(T1, end_label);
                self.code_expr(body, env)?;
                self.asm.emit_branch(start_label);
                self.asm.emit_label(end_label);
                // a loop evaluates to void
                self.asm.emit_move(ACC, ZERO);
            },

            ExprKind::TypCase { expr: scrutinee, cases } => self.code_case(expr, scrutinee, cases, env)?,

            ExprKind::Block { body } => {
                for e in body {
                    self.code_expr(e, env)?;
                }
            },

            ExprKind::Let { identifier, type_decl, init, body } => {
                if init.is_no_expr() {
                    self.emit_default(type_decl)?;
                }
                else {
                    self.code_expr(init, env)?;
                }
                self.asm.emit_push(ACC);
                env.enter_scope();
                env.add_var(identifier)?;
                self.code_expr(body, env)?;
                env.exit_scope()?;
                self.asm.emit_pop_words(1);
            },

            ExprKind::Plus { lhs, rhs } => self.code_arith(lhs, rhs, AsmWriter::emit_add, env)?,
            ExprKind::Sub { lhs, rhs } => self.code_arith(lhs, rhs, AsmWriter::emit_sub, env)?,
            ExprKind::Mul { lhs, rhs } => self.code_arith(lhs, rhs, AsmWriter::emit_mul, env)?,
            ExprKind::Divide { lhs, rhs } => self.code_arith(lhs, rhs, AsmWriter::emit_div, env)?,

            ExprKind::Neg { expr: operand } => {
                self.code_expr(operand, env)?;
                self.asm.emit_jal(OBJECT_COPY);
                self.asm.emit_lw(T1, ATTR_OFFSET, ACC);
                self.asm.emit_neg(T1, T1);
                self.asm.emit_sw(T1, ATTR_OFFSET, ACC);
            },

            ExprKind::Lt { lhs, rhs } => self.code_compare(lhs, rhs, AsmWriter::emit_blt, env)?,
            ExprKind::Leq { lhs, rhs } => self.code_compare(lhs, rhs, AsmWriter::emit_bleq, env)?,

            ExprKind::Eq { lhs, rhs } => {
                self.code_operands(lhs, rhs, env)?;
                let done = self.asm.new_label();
                self.asm.emit_move(T2, ACC);
                self.asm.emit_la(ACC, &self.pool.bool_label(true));
                // identical objects are equal without asking the runtime
                self.asm.emit_beq(T1, T2, done);
                self.asm.emit_la(A1, &self.pool.bool_label(false));
                self.asm.emit_jal(EQUALITY_TEST);
                self.asm.emit_label(done);
            },

            ExprKind::Comp { expr: operand } => {
                self.code_expr(operand, env)?;
                self.asm.emit_lw(T1, ATTR_OFFSET, ACC);
                self.emit_bool_if_zero(T1);
            },

            ExprKind::IntConst { value } => {
                let label = self.pool.int_label(*value)?;
                self.asm.emit_la(ACC, &label);
            },

            ExprKind::BoolConst { value } => {
                let label = self.pool.bool_label(*value);
                self.asm.emit_la(ACC, &label);
            },

            ExprKind::StringConst { value } => {
                let label = self.pool.str_label(value)?;
                self.asm.emit_la(ACC, &label);
            },

            ExprKind::New { type_name } => self.code_new(type_name, env)?,

            ExprKind::IsVoid { expr: operand } => {
                self.code_expr(operand, env)?;
                self.asm.emit_move(T1, ACC);
                self.emit_bool_if_zero(T1);
            },

            ExprKind::NoExpr => {},

            ExprKind::Object { name } if name == names::SELF => self.asm.emit_move(ACC, SELF),

            ExprKind::Object { name } => {
                let location = env.resolve(name)?;
                self.emit_load(location);
            }
        }
        Ok(())
    }

    /// Pushes `$a0` as an anonymous temporary of the innermost scope.
    fn push_temp(&mut self, env: &mut Env<'a>) -> CodegenResult<()> {
        self.asm.emit_push(ACC);
        env.add_obstacle()?;
        Ok(())
    }

    /// Leaves `lhs` in `$t1` and `rhs` in `$a0`.
    fn code_operands(&mut self, lhs: &'a Expr, rhs: &'a Expr, env: &mut Env<'a>) -> CodegenResult<()> {
        self.code_expr(lhs, env)?;
        env.enter_scope();
        self.push_temp(env)?;
        self.code_expr(rhs, env)?;
        self.asm.emit_pop(T1);
        env.exit_scope()
    }

    /// The result is a fresh copy of the right operand holding the sum,
    /// difference, product or quotient.
    fn code_arith(&mut self, lhs: &'a Expr, rhs: &'a Expr, op: ArithOp, env: &mut Env<'a>) -> CodegenResult<()> {
        self.code_expr(lhs, env)?;
        env.enter_scope();
        self.push_temp(env)?;
        self.code_expr(rhs, env)?;
        self.asm.emit_jal(OBJECT_COPY);
        self.asm.emit_pop(T1);
        env.exit_scope()?;

        self.asm.emit_lw(T1, ATTR_OFFSET, T1);
        self.asm.emit_lw(T2, ATTR_OFFSET, ACC);
        op(&mut self.asm, T1, T1, T2);
        self.asm.emit_sw(T1, ATTR_OFFSET, ACC);
        Ok(())
    }

    fn code_compare(&mut self, lhs: &'a Expr, rhs: &'a Expr, branch: CompareOp, env: &mut Env<'a>) -> CodegenResult<()> {
        self.code_operands(lhs, rhs, env)?;
        let done = self.asm.new_label();
        self.asm.emit_lw(T1, ATTR_OFFSET, T1);
        self.asm.emit_lw(T2, ATTR_OFFSET, ACC);
        self.asm.emit_la(ACC, &self.pool.bool_label(true));
        branch(&mut self.asm, T1, T2, done);
        self.asm.emit_la(ACC, &self.pool.bool_label(false));
        self.asm.emit_label(done);
        Ok(())
    }

    /// `$a0` becomes true when `reg` is zero, false otherwise.
    fn emit_bool_if_zero(&mut self, reg: Register) {
        let done = self.asm.new_label();
        self.asm.emit_la(ACC, &self.pool.bool_label(true));
        self.asm.emit_beqz(reg, done);
        self.asm.emit_la(ACC, &self.pool.bool_label(false));
        self.asm.emit_label(done);
    }

    fn emit_default(&mut self, ty: &str) -> CodegenResult<()> {
        let value = self.default_value(ty)?;
        if value == "0" {
            self.asm.emit_move(ACC, ZERO);
        }
        else {
            self.asm.emit_la(ACC, &value);
        }
        Ok(())
    }

    /// Calls the runtime abort routine `handler` when `$a0` is void,
    /// passing the file name and line of `at`.
    fn emit_void_check(&mut self, at: &Expr, handler: &str, env: &Env<'a>) -> CodegenResult<()> {
        let ok = self.asm.new_label();
        let filename = self.pool.str_label(env.class().filename())?;
        self.asm.emit_bne(ACC, ZERO, ok);
        self.asm.emit_la(ACC, &filename);
        self.asm.emit_li(T1, at.line as i64);
        self.asm.emit_jal(handler);
        self.asm.emit_label(ok);
        Ok(())
    }

    /// Arguments are pushed left to right; the callee pops them.
    fn code_dispatch(
        &mut self,
        call: &'a Expr,
        receiver: &'a Expr,
        static_class: Option<&'a str>,
        name: &'a str,
        actuals: &'a [Expr],
        env: &mut Env<'a>
    ) -> CodegenResult<()> {
        env.enter_scope();
        for actual in actuals {
            self.code_expr(actual, env)?;
            self.push_temp(env)?;
        }
        self.code_expr(receiver, env)?;
        self.emit_void_check(call, DISPATCH_ABORT, env)?;

        match static_class {
            Some(class) => {
                let definer = self.table.resolve_static(class, name)?;
                self.asm.emit_jal(&runtime::method(definer.name(), name));
            },
            None => {
                let class = self.class_of(receiver.static_type(), env);
                let slot = self
                    .table
                    .class_node(class)?
                    .dispatch_slot(name)
                    .ok_or_else(|| CodegenError::UnknownMethod {
                        class: class.to_string(),
                        method: name.to_string()
                    })?;
                self.asm.emit_lw(T1, DISPTABLE_OFFSET, ACC);
                self.asm.emit_lw(T1, slot, T1);
                self.asm.emit_jalr(T1);
            }
        }
        env.exit_scope()
    }

    /// Branches are tried from the highest tag down, so a class is
    /// always tested before any of its ancestors.
    fn code_case(&mut self, case: &'a Expr, scrutinee: &'a Expr, branches: &'a [Branch], env: &mut Env<'a>) -> CodegenResult<()> {
        let table = self.table;
        self.code_expr(scrutinee, env)?;
        self.emit_void_check(case, CASE_ABORT2, env)?;

        let end_label = self.asm.new_label();
        self.asm.emit_lw(T2, TAG_OFFSET, ACC);

        let branches: Vec<_> = branches
            .iter()
            .map(|branch| Ok((table.class_node(&branch.type_decl)?, branch)))
            .collect::<CodegenResult<Vec<_>>>()?
            .into_iter()
            .sorted_by_key(|(node, _)| Reverse(node.tag()))
            .collect();

        for (node, branch) in branches {
            let next_label = self.asm.new_label();
            self.asm.emit_blti(T2, node.tag() as i64, next_label);
            self.asm.emit_bgti(T2, node.max_child_tag() as i64, next_label);

            self.asm.emit_push(ACC);
            env.enter_scope();
            env.add_var(&branch.name)?;
            self.code_expr(&branch.expr, env)?;
            env.exit_scope()?;
            self.asm.emit_pop_words(1);

            self.asm.emit_branch(end_label);
            self.asm.emit_label(next_label);
        }

        // no branch matched; the object is still in $a0
        self.asm.emit_jal(CASE_ABORT);
        self.asm.emit_label(end_label);
        Ok(())
    }

    fn code_new(&mut self, type_name: &str, env: &mut Env<'a>) -> CodegenResult<()> {
        if type_name != names::SELF_TYPE {
            self.asm.emit_la(ACC, &protobj(type_name));
            self.asm.emit_jal(OBJECT_COPY);
            self.asm.emit_jal(&init(type_name));
            return Ok(());
        }

        self.asm.emit_la(T1, CLASSOBJTAB);
        self.asm.emit_lw(T2, TAG_OFFSET, SELF);
        self.asm.emit_sll(T2, T2, LOG_WORD_SIZE + OBJTAB_ENTRY_WORDS.trailing_zeros() as usize);
        self.asm.emit_addu(T1, T1, T2);

        env.enter_scope();
        self.asm.emit_push(T1);
        env.add_obstacle()?;
        self.asm.emit_lw(ACC, 0, T1);
        self.asm.emit_jal(OBJECT_COPY);
        self.asm.emit_pop(T1);
        env.exit_scope()?;

        self.asm.emit_lw(T1, 1, T1);
        self.asm.emit_jalr(T1);
        Ok(())
    }

    fn class_of(&self, ty: &'a str, env: &Env<'a>) -> &'a str {
        if ty == names::SELF_TYPE {
            env.class().name()
        }
        else {
            ty
        }
    }
}
