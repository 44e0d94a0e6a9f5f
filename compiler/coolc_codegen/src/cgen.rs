// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use coolc_ast::names::{BOOL, INT, MAIN, MAIN_METH, STRING};
use coolc_ast::Method;
use coolc_const::ConstPool;
use coolc_errors::CodegenResult;
use coolc_scope::{Environment, Location};
use coolc_target::layout::*;
use coolc_target::reg::*;
use coolc_target::runtime::{self, *};
use coolc_target::AsmWriter;
use log::debug;

use crate::class_node::ClassNode;
use crate::class_table::ClassTable;
use crate::config::{CodegenConfig, GcMode};

pub(crate) type Env<'a> = Environment<'a, ClassNode<'a>>;

/// Emits the whole assembly file for a laid out class table.
///
/// The constant pool must already hold every literal the program uses;
/// it is only read from here on.
pub struct CodeGenerator<'a> {
    pub(crate) table: &'a ClassTable<'a>,
    pub(crate) pool: &'a ConstPool,
    pub(crate) config: &'a CodegenConfig,
    pub(crate) asm: AsmWriter
}

impl<'a> CodeGenerator<'a> {
    pub fn new(table: &'a ClassTable<'a>, pool: &'a ConstPool, config: &'a CodegenConfig) -> Self {
        Self {
            table,
            pool,
            config,
            asm: AsmWriter::new()
        }
    }

    pub fn into_code(self) -> String {
        self.asm.into_code()
    }

    pub fn code(&mut self) -> CodegenResult<()> {
        debug!("coding global data");
        self.code_global_data()?;

        debug!("coding class tables");
        self.code_class_name_tab()?;
        self.code_class_obj_tab();
        self.code_dispatch_tabs();
        self.code_prot_objs()?;

        debug!("coding global text");
        self.code_global_text();

        debug!("coding init routines and methods");
        self.code_class_inits()?;
        self.code_class_methods()
    }

    fn comment(&mut self, text: &str) {
        if self.config.debug {
            self.asm.emit_comment(text);
        }
    }

    fn code_global_data(&mut self) -> CodegenResult<()> {
        self.asm.emit_data();
        self.asm.emit_align(LOG_WORD_SIZE);

        for symbol in [
            CLASSNAMETAB.to_string(),
            protobj(MAIN),
            protobj(INT),
            protobj(STRING),
            self.pool.bool_label(false),
            self.pool.bool_label(true)
        ] {
            self.asm.emit_globl(&symbol);
        }

        for (symbol, tag) in [
            (INTTAG, self.table.int_tag()),
            (BOOLTAG, self.table.bool_tag()),
            (STRINGTAG, self.table.string_tag())
        ] {
            self.asm.emit_globl(symbol);
            self.asm.emit_label_def(symbol);
            self.asm.emit_word(tag);
        }

        self.code_select_gc();
        self.code_constants()
    }

    /// Tells the runtime which memory manager to start.
    fn code_select_gc(&mut self) {
        let (init, collect) = match self.config.gc {
            GcMode::NoGc => (NO_GC_INIT, NO_GC_COLLECT),
            GcMode::Generational => (GC_INIT, GC_COLLECT)
        };
        for (symbol, value) in [
            (MEMMGR_INITIALIZER, init.to_string()),
            (MEMMGR_COLLECTOR, collect.to_string()),
            (MEMMGR_TEST, (self.config.gc_test as u8).to_string())
        ] {
            self.asm.emit_globl(symbol);
            self.asm.emit_label_def(symbol);
            self.asm.emit_word(value);
        }
    }

    /// Class names indexed by tag, for `type_name` and the abort
    /// messages of the runtime.
    fn code_class_name_tab(&mut self) -> CodegenResult<()> {
        let table = self.table;
        self.asm.emit_label_def(CLASSNAMETAB);
        for node in table.class_nodes() {
            let label = self.pool.str_label(node.name())?;
            self.asm.emit_word(label);
        }
        Ok(())
    }

    /// (prototype, init) pairs indexed by tag, for `new SELF_TYPE`.
    fn code_class_obj_tab(&mut self) {
        let table = self.table;
        self.asm.emit_label_def(CLASSOBJTAB);
        for node in table.class_nodes() {
            self.asm.emit_word(protobj(node.name()));
            self.asm.emit_word(init(node.name()));
        }
    }

    fn code_dispatch_tabs(&mut self) {
        let table = self.table;
        for node in table.class_nodes() {
            self.asm.emit_label_def(&disptab(node.name()));
            for slot in node.full_methods() {
                let owner = table.get(slot.owner);
                self.asm.emit_word(runtime::method(owner.name(), &slot.method.name));
            }
        }
    }

    fn code_prot_objs(&mut self) -> CodegenResult<()> {
        let table = self.table;
        for node in table.class_nodes() {
            self.code_prot_obj(node)?;
        }
        Ok(())
    }

    fn code_prot_obj(&mut self, node: &'a ClassNode<'a>) -> CodegenResult<()> {
        self.asm.emit_word(EYE_CATCHER);
        self.asm.emit_label_def(&protobj(node.name()));
        self.asm.emit_word(node.tag());
        self.asm.emit_word(node.object_words());
        self.asm.emit_word(disptab(node.name()));
        for attr in node.full_attribs() {
            let value = self.default_value(&attr.type_decl)?;
            self.asm.emit_word(value);
        }
        Ok(())
    }

    /// Initial contents of a slot of the given declared type: the boxed
    /// zero, empty string or false for the primitives, void otherwise.
    pub(crate) fn default_value(&self, ty: &str) -> CodegenResult<String> {
        Ok(match ty {
            INT => self.pool.int_label(0)?,
            STRING => self.pool.str_label("")?,
            BOOL => self.pool.bool_label(false),
            _ => "0".to_string()
        })
    }

    fn code_global_text(&mut self) {
        self.asm.emit_globl(HEAP_START);
        self.asm.emit_label_def(HEAP_START);
        self.asm.emit_word(0);
        self.asm.emit_text();
        for symbol in [init(MAIN), init(INT), init(STRING), init(BOOL), runtime::method(MAIN, MAIN_METH)] {
            self.asm.emit_globl(&symbol);
        }
    }

    fn code_class_inits(&mut self) -> CodegenResult<()> {
        let table = self.table;
        for node in table.class_nodes() {
            self.code_init(node)?;
        }
        Ok(())
    }

    /// `X_init` receives the fresh copy of the prototype in `$a0`, runs
    /// the parent's init and then this class's own initializers.
    fn code_init(&mut self, node: &'a ClassNode<'a>) -> CodegenResult<()> {
        let table = self.table;
        self.asm.emit_label_def(&init(node.name()));
        self.emit_prologue();

        if let Some(parent) = table.parent_of(node) {
            self.asm.emit_jal(&init(parent.name()));
        }

        let mut env = Env::new(node);
        for &attr in node.attribs() {
            if attr.init.is_no_expr() {
                continue;
            }
            self.comment(&format!("init {}.{}", node.name(), attr.name));
            self.code_expr(&attr.init, &mut env)?;
            let location = env.resolve(&attr.name)?;
            self.emit_store(location);
        }

        self.asm.emit_move(ACC, SELF);
        self.emit_epilogue(0);
        Ok(())
    }

    fn code_class_methods(&mut self) -> CodegenResult<()> {
        let table = self.table;
        for node in table.class_nodes().filter(|node| !node.basic()) {
            for &method in node.methods() {
                self.code_method(node, method)?;
            }
        }
        Ok(())
    }

    fn code_method(&mut self, node: &'a ClassNode<'a>, method: &'a Method) -> CodegenResult<()> {
        let label = runtime::method(node.name(), &method.name);
        self.comment(&label);
        self.asm.emit_label_def(&label);
        self.emit_prologue();

        let mut env = Env::with_params(node, method.formals.iter().map(|formal| formal.name.as_str()));
        self.code_expr(&method.body, &mut env)?;

        self.emit_epilogue(method.arg_count());
        Ok(())
    }

    /// Saves `$fp`, `$s0` and `$ra`, points `$fp` at the frame and moves
    /// the receiver into `$s0`.
    fn emit_prologue(&mut self) {
        self.asm.emit_addiu(SP, SP, -((FRAME_SAVED_WORDS * WORD_SIZE) as i64));
        self.asm.emit_sw(FP, 3, SP);
        self.asm.emit_sw(SELF, 2, SP);
        self.asm.emit_sw(RA, 1, SP);
        self.asm.emit_addiu(FP, SP, WORD_SIZE as i64);
        self.asm.emit_move(SELF, ACC);
    }

    /// Restores the saved registers and pops the frame together with the
    /// caller's `args` arguments.
    fn emit_epilogue(&mut self, args: usize) {
        self.asm.emit_lw(FP, 3, SP);
        self.asm.emit_lw(SELF, 2, SP);
        self.asm.emit_lw(RA, 1, SP);
        self.asm.emit_addiu(SP, SP, ((FRAME_SAVED_WORDS + args) * WORD_SIZE) as i64);
        self.asm.emit_return(RA);
    }

    pub(crate) fn emit_load(&mut self, location: Location) {
        match location {
            Location::Local(off) => self.asm.emit_lw(ACC, off + 1, SP),
            Location::Param(off) => self.asm.emit_lw(ACC, FRAME_ARG_OFFSET + off, FP),
            Location::Attrib(slot) => self.asm.emit_lw(ACC, ATTR_OFFSET + slot, SELF)
        }
    }

    /// Stores `$a0`. Attribute stores go through the collector's write
    /// barrier when the generational collector is on.
    pub(crate) fn emit_store(&mut self, location: Location) {
        match location {
            Location::Local(off) => self.asm.emit_sw(ACC, off + 1, SP),
            Location::Param(off) => self.asm.emit_sw(ACC, FRAME_ARG_OFFSET + off, FP),
            Location::Attrib(slot) => {
                self.asm.emit_sw(ACC, ATTR_OFFSET + slot, SELF);
                if self.config.gc == GcMode::Generational {
                    self.asm.emit_addiu(A1, SELF, attr_byte_offset(slot) as i64);
                    self.asm.emit_jal(GC_ASSIGN);
                }
            }
        }
    }
}
