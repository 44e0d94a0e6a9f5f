// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use std::collections::HashMap;

use coolc_ast::names::{self, BOOL, INT, MAIN, MAIN_METH, OBJECT, STRING};
use coolc_ast::{Class, Program};
use coolc_errors::{CodegenError, CodegenResult};
use log::{debug, trace};

use crate::basic::{is_basic_class, BASIC_CLASSES};
use crate::class_node::*;

/// Every class of a program, built-ins included, laid out and tagged.
///
/// Nodes live in an arena indexed by `ClassId` in installation order;
/// `tag_order` lists them again sorted by type tag, which is the order
/// every global table is emitted in.
#[derive(Debug)]
pub struct ClassTable<'a> {
    nodes: Vec<ClassNode<'a>>,
    name_to_id: HashMap<&'a str, ClassId>,
    root: ClassId,
    tag_order: Vec<ClassId>,
    int_tag: usize,
    bool_tag: usize,
    string_tag: usize
}

impl<'a> ClassTable<'a> {
    pub fn new(program: &'a Program) -> CodegenResult<Self> {
        let mut table = Self {
            nodes: vec![],
            name_to_id: HashMap::new(),
            root: ClassId(0),
            tag_order: vec![],
            int_tag: INVALID_CLASS_TAG,
            bool_tag: INVALID_CLASS_TAG,
            string_tag: INVALID_CLASS_TAG
        };

        table.install_basic_classes();
        table.install_classes(&program.classes)?;
        table.build_inheritance_tree()?;
        table.assign_tags()?;
        table.derive_layouts()?;
        table.check_entry_point()?;

        debug!("class table built: {} classes", table.nodes.len());
        Ok(table)
    }

    fn install(&mut self, decl: &'a Class, basic_status: Basicness) -> ClassId {
        let id = ClassId(self.nodes.len());
        self.nodes.push(ClassNode::new(id, decl, basic_status));
        self.name_to_id.insert(&decl.name, id);
        id
    }

    fn install_basic_classes(&mut self) {
        for decl in BASIC_CLASSES.iter() {
            let id = self.install(decl, Basicness::Basic);
            if decl.name == OBJECT {
                self.root = id;
            }
        }
    }

    fn install_classes(&mut self, classes: &'a [Class]) -> CodegenResult<()> {
        for decl in classes {
            if is_basic_class(&decl.name) {
                return Err(CodegenError::RedefinedBasicClass { class: decl.name.clone() });
            }
            if self.name_to_id.contains_key(decl.name.as_str()) {
                return Err(CodegenError::DuplicateClass { class: decl.name.clone() });
            }
            self.install(decl, Basicness::NotBasic);
        }
        Ok(())
    }

    fn build_inheritance_tree(&mut self) -> CodegenResult<()> {
        for idx in 0..self.nodes.len() {
            let id = ClassId(idx);
            if id == self.root {
                continue;
            }

            let decl = self.nodes[idx].decl();
            // a parentless user class hangs off the root
            let parent_name = decl.parent.as_deref().unwrap_or(OBJECT);
            if names::is_primitive(parent_name) {
                return Err(CodegenError::InheritsFromPrimitive {
                    class: decl.name.clone(),
                    parent: parent_name.to_string()
                });
            }

            let parent = self.name_to_id.get(parent_name).copied().ok_or_else(|| {
                CodegenError::UndefinedParent {
                    class: decl.name.clone(),
                    parent: parent_name.to_string()
                }
            })?;

            self.nodes[idx].parent = Some(parent);
            self.nodes[parent.0].children.push(id);
        }
        Ok(())
    }

    /// Numbers the tree in depth-first pre-order so that every subtree
    /// owns one contiguous tag interval.
    fn assign_tags(&mut self) -> CodegenResult<()> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let tag = self.tag_order.len();
            self.nodes[id.0].class_tag = tag;
            self.tag_order.push(id);
            trace!("tag {} -> {}", tag, self.nodes[id.0].name());
            stack.extend(self.nodes[id.0].children.iter().rev());
        }

        if let Some(orphan) = self.nodes.iter().find(|node| node.class_tag == INVALID_CLASS_TAG) {
            return Err(CodegenError::InheritanceCycle { class: orphan.name().to_string() });
        }

        // children come after their parent in pre-order
        for &id in self.tag_order.iter().rev() {
            let node = &self.nodes[id.0];
            let max_tag = node
                .children
                .iter()
                .map(|child| self.nodes[child.0].max_child_tag)
                .max()
                .unwrap_or(node.class_tag);
            self.nodes[id.0].max_child_tag = max_tag;
        }

        self.int_tag = self.tag_of(INT)?;
        self.bool_tag = self.tag_of(BOOL)?;
        self.string_tag = self.tag_of(STRING)?;
        Ok(())
    }

    /// Lays classes out in tag order, so a parent is always complete
    /// before any of its children.
    fn derive_layouts(&mut self) -> CodegenResult<()> {
        for idx in 0..self.tag_order.len() {
            let id = self.tag_order[idx];
            match self.nodes[id.0].parent {
                Some(parent) => {
                    let (node, parent) = node_and_parent(&mut self.nodes, id, parent);
                    node.derive_layout(Some(parent))?;
                },
                None => self.nodes[id.0].derive_layout(None)?
            }
        }
        Ok(())
    }

    fn check_entry_point(&self) -> CodegenResult<()> {
        let main = self.lookup(MAIN).ok_or(CodegenError::MissingMainClass)?;
        if !main.defines_method(MAIN_METH) {
            return Err(CodegenError::MissingMainMethod);
        }
        Ok(())
    }

    pub fn get(&self, id: ClassId) -> &ClassNode<'a> {
        &self.nodes[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<&ClassNode<'a>> {
        self.name_to_id.get(name).map(|id| &self.nodes[id.0])
    }

    pub fn class_node(&self, name: &str) -> CodegenResult<&ClassNode<'a>> {
        self.lookup(name).ok_or_else(|| CodegenError::UnknownClass { name: name.to_string() })
    }

    pub fn root(&self) -> &ClassNode<'a> {
        self.get(self.root)
    }

    pub fn parent_of(&self, node: &ClassNode<'a>) -> Option<&ClassNode<'a>> {
        node.parent().map(|id| self.get(id))
    }

    /// All classes in tag order.
    pub fn class_nodes(&self) -> impl Iterator<Item = &ClassNode<'a>> + '_ {
        self.tag_order.iter().map(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag_of(&self, name: &str) -> CodegenResult<usize> {
        self.class_node(name).map(|node| node.tag())
    }

    pub fn int_tag(&self) -> usize {
        self.int_tag
    }

    pub fn bool_tag(&self) -> usize {
        self.bool_tag
    }

    pub fn string_tag(&self) -> usize {
        self.string_tag
    }

    /// Range test on tags; a class is a subclass of itself.
    pub fn is_subclass_of(&self, class: &ClassNode<'a>, ancestor: &ClassNode<'a>) -> bool {
        ancestor.tag_range().contains(&class.tag())
    }

    /// Finds the body a static dispatch `expr@class.method(...)` runs:
    /// the nearest class on the root-to-`class` chain that declares it.
    pub fn resolve_static(&self, class: &str, method: &str) -> CodegenResult<&ClassNode<'a>> {
        let node = self.class_node(class)?;
        node.inheritance()
            .iter()
            .rev()
            .map(|id| self.get(*id))
            .find(|ancestor| ancestor.defines_method(method))
            .ok_or_else(|| CodegenError::UnknownMethod {
                class: class.to_string(),
                method: method.to_string()
            })
    }
}

fn node_and_parent<'n, 'a>(
    nodes: &'n mut [ClassNode<'a>],
    id: ClassId,
    parent: ClassId
) -> (&'n mut ClassNode<'a>, &'n ClassNode<'a>) {
    if parent.0 < id.0 {
        let (lo, hi) = nodes.split_at_mut(id.0);
        (&mut hi[0], &lo[parent.0])
    }
    else {
        let (lo, hi) = nodes.split_at_mut(parent.0);
        (&mut lo[id.0], &hi[0])
    }
}
