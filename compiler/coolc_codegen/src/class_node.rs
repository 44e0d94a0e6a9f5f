// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use coolc_ast::{Attr, Class, Method};
use coolc_errors::{CodegenError, CodegenResult};
use coolc_scope::AttribTable;
use indexmap::IndexMap;

/// Index of a class node inside the class table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub usize);

/// Tag of a class the tree walk has not reached yet.
pub const INVALID_CLASS_TAG: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basicness {
    /// Supplied by the runtime.
    Basic,
    NotBasic
}

/// One dispatch table entry: the method body that runs and the class
/// that defines it.
#[derive(Debug, Clone, Copy)]
pub struct MethodSlot<'a> {
    pub owner: ClassId,
    pub method: &'a Method
}

/// Tables derived from a class and all of its ancestors.
#[derive(Debug, Default)]
struct Layout<'a> {
    full_attribs: Vec<&'a Attr>,
    attrib_idx_tab: IndexMap<&'a str, usize>,
    full_methods: Vec<MethodSlot<'a>>,
    dispatch_idx_tab: IndexMap<&'a str, usize>,
    dispatch_class_tab: IndexMap<&'a str, ClassId>,

    /// Root first, this class last.
    inheritance: Vec<ClassId>
}

#[derive(Debug)]
pub struct ClassNode<'a> {
    pub id: ClassId,
    decl: &'a Class,
    basic_status: Basicness,
    pub(crate) parent: Option<ClassId>,
    pub(crate) children: Vec<ClassId>,
    pub(crate) class_tag: usize,
    pub(crate) max_child_tag: usize,
    attribs: Vec<&'a Attr>,
    methods: Vec<&'a Method>,
    layout: Layout<'a>
}

impl<'a> ClassNode<'a> {
    pub fn new(id: ClassId, decl: &'a Class, basic_status: Basicness) -> Self {
        Self {
            id,
            decl,
            basic_status,
            parent: None,
            children: vec![],
            class_tag: INVALID_CLASS_TAG,
            max_child_tag: INVALID_CLASS_TAG,
            attribs: decl.attribs().collect(),
            methods: decl.methods().collect(),
            layout: Layout::default()
        }
    }

    /// Builds the inherited tables on top of the parent's, which must
    /// already be laid out. Attributes keep their parent's slots; an
    /// overriding method keeps its parent's dispatch slot.
    pub(crate) fn derive_layout(&mut self, parent: Option<&ClassNode<'a>>) -> CodegenResult<()> {
        let mut layout = match parent {
            Some(parent) => Layout {
                full_attribs: parent.layout.full_attribs.clone(),
                attrib_idx_tab: parent.layout.attrib_idx_tab.clone(),
                full_methods: parent.layout.full_methods.clone(),
                dispatch_idx_tab: parent.layout.dispatch_idx_tab.clone(),
                dispatch_class_tab: parent.layout.dispatch_class_tab.clone(),
                inheritance: parent.layout.inheritance.clone()
            },
            None => Layout::default()
        };

        for &attr in &self.attribs {
            if layout.attrib_idx_tab.contains_key(attr.name.as_str()) {
                return Err(CodegenError::DuplicateAttribute {
                    class: self.name().to_string(),
                    attr: attr.name.clone()
                });
            }
            layout.attrib_idx_tab.insert(attr.name.as_str(), layout.full_attribs.len());
            layout.full_attribs.push(attr);
        }

        for &method in &self.methods {
            let slot = MethodSlot { owner: self.id, method };
            match layout.dispatch_idx_tab.get(method.name.as_str()) {
                Some(&idx) => layout.full_methods[idx] = slot,
                None => {
                    layout.dispatch_idx_tab.insert(method.name.as_str(), layout.full_methods.len());
                    layout.full_methods.push(slot);
                }
            }
            layout.dispatch_class_tab.insert(method.name.as_str(), self.id);
        }

        layout.inheritance.push(self.id);
        self.layout = layout;
        Ok(())
    }

    pub fn name(&self) -> &'a str {
        &self.decl.name
    }

    pub fn decl(&self) -> &'a Class {
        self.decl
    }

    pub fn filename(&self) -> &'a str {
        &self.decl.filename
    }

    pub fn basic(&self) -> bool {
        self.basic_status == Basicness::Basic
    }

    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Children in the order they were installed.
    pub fn children(&self) -> &[ClassId] {
        &self.children
    }

    pub fn tag(&self) -> usize {
        self.class_tag
    }

    /// Largest tag in this class's subtree.
    pub fn max_child_tag(&self) -> usize {
        self.max_child_tag
    }

    /// Tags of this class and all of its descendants.
    pub fn tag_range(&self) -> std::ops::RangeInclusive<usize> {
        self.class_tag..=self.max_child_tag
    }

    /// Attributes declared directly in this class.
    pub fn attribs(&self) -> &[&'a Attr] {
        &self.attribs
    }

    /// Methods declared directly in this class.
    pub fn methods(&self) -> &[&'a Method] {
        &self.methods
    }

    /// Inherited attributes first, in slot order.
    pub fn full_attribs(&self) -> &[&'a Attr] {
        &self.layout.full_attribs
    }

    pub fn attrib_idx_tab(&self) -> &IndexMap<&'a str, usize> {
        &self.layout.attrib_idx_tab
    }

    /// The dispatch table, in slot order.
    pub fn full_methods(&self) -> &[MethodSlot<'a>] {
        &self.layout.full_methods
    }

    pub fn dispatch_idx_tab(&self) -> &IndexMap<&'a str, usize> {
        &self.layout.dispatch_idx_tab
    }

    pub fn dispatch_class_tab(&self) -> &IndexMap<&'a str, ClassId> {
        &self.layout.dispatch_class_tab
    }

    pub fn dispatch_slot(&self, method: &str) -> Option<usize> {
        self.layout.dispatch_idx_tab.get(method).copied()
    }

    /// Class whose body runs when `method` is dispatched on this class.
    pub fn defining_class(&self, method: &str) -> Option<ClassId> {
        self.layout.dispatch_class_tab.get(method).copied()
    }

    pub fn inheritance(&self) -> &[ClassId] {
        &self.layout.inheritance
    }

    /// Object size in words, header included.
    pub fn object_words(&self) -> usize {
        coolc_target::layout::DEFAULT_OBJFIELDS + self.layout.full_attribs.len()
    }

    pub fn defines_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.name == method)
    }
}

impl AttribTable for ClassNode<'_> {
    fn class_name(&self) -> &str {
        self.name()
    }

    fn attrib_slot(&self, name: &str) -> Option<usize> {
        self.layout.attrib_idx_tab.get(name).copied()
    }
}
