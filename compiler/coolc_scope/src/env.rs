// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use coolc_errors::{CodegenError, CodegenResult};

/// Attribute layout of the class whose code is being generated.
pub trait AttribTable {
    fn class_name(&self) -> &str;

    /// Slot index of the attribute in the object layout.
    fn attrib_slot(&self, name: &str) -> Option<usize>;
}

/// Where an identifier lives at run time.
///
/// Offsets are in words and relative to their own storage: a local is
/// counted from the current stack top (0 is the most recent push), a
/// parameter from the last pushed argument, an attribute is its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Local(usize),
    Param(usize),
    Attrib(usize)
}

/// Per-method symbol resolver.
///
/// Every word pushed on the stack after the frame is set up has an entry
/// in `vars`: named entries are `let`/`case` bindings, anonymous ones
/// ("obstacles") are evaluation temporaries. Each open scope counts the
/// entries it added so `exit_scope` drops exactly those.
#[derive(Debug)]
pub struct Environment<'a, C: AttribTable> {
    scope_lengths: Vec<usize>,
    vars: Vec<Option<&'a str>>,
    params: Vec<&'a str>,
    class: &'a C
}

impl<'a, C: AttribTable> Environment<'a, C> {
    pub fn new(class: &'a C) -> Self {
        Self {
            scope_lengths: vec![],
            vars: vec![],
            params: vec![],
            class
        }
    }

    pub fn with_params(class: &'a C, params: impl IntoIterator<Item = &'a str>) -> Self {
        let mut env = Self::new(class);
        for param in params {
            env.add_param(param);
        }
        env
    }

    pub fn class(&self) -> &'a C {
        self.class
    }

    pub fn enter_scope(&mut self) {
        self.scope_lengths.push(0);
    }

    /// Closes the innermost scope, forgetting every entry added while it
    /// was open.
    pub fn exit_scope(&mut self) -> CodegenResult<()> {
        let added = self.scope_lengths.pop().ok_or(CodegenError::ScopeUnderflow)?;
        let keep = self.vars.len() - added;
        self.vars.truncate(keep);
        Ok(())
    }

    /// Binds `name` to the word just pushed. Returns its position.
    pub fn add_var(&mut self, name: &'a str) -> CodegenResult<usize> {
        self.push_entry(Some(name))
    }

    /// Accounts for an anonymous temporary pushed on the stack.
    pub fn add_obstacle(&mut self) -> CodegenResult<usize> {
        self.push_entry(None)
    }

    fn push_entry(&mut self, entry: Option<&'a str>) -> CodegenResult<usize> {
        let counter = self.scope_lengths.last_mut().ok_or(CodegenError::ScopeUnderflow)?;
        *counter += 1;
        self.vars.push(entry);
        Ok(self.vars.len() - 1)
    }

    pub fn add_param(&mut self, name: &'a str) -> usize {
        self.params.push(name);
        self.params.len() - 1
    }

    /// Distance of the most recent binding of `name` from the stack top.
    pub fn lookup_var(&self, name: &str) -> Option<usize> {
        self.vars
            .iter()
            .rposition(|entry| *entry == Some(name))
            .map(|pos| self.vars.len() - 1 - pos)
    }

    /// Distance of the parameter from the last pushed argument. The first
    /// parameter is pushed first, so it is the farthest away.
    pub fn lookup_param(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|param| *param == name)
            .map(|idx| self.params.len() - 1 - idx)
    }

    pub fn lookup_attrib(&self, name: &str) -> Option<usize> {
        self.class.attrib_slot(name)
    }

    /// Locals shadow parameters, parameters shadow attributes.
    pub fn resolve(&self, name: &str) -> CodegenResult<Location> {
        if let Some(off) = self.lookup_var(name) {
            Ok(Location::Local(off))
        }
        else if let Some(off) = self.lookup_param(name) {
            Ok(Location::Param(off))
        }
        else if let Some(slot) = self.lookup_attrib(name) {
            Ok(Location::Attrib(slot))
        }
        else {
            Err(CodegenError::UnboundIdentifier {
                name: name.to_string(),
                class: self.class.class_name().to_string()
            })
        }
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scope_lengths.len()
    }

    /// Number of words pushed since the frame was set up.
    pub fn stack_len(&self) -> usize {
        self.vars.len()
    }

    pub fn locals(&self) -> &[Option<&'a str>] {
        &self.vars
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Layout {
        slots: HashMap<&'static str, usize>
    }

    impl AttribTable for Layout {
        fn class_name(&self) -> &str {
            "Main"
        }

        fn attrib_slot(&self, name: &str) -> Option<usize> {
            self.slots.get(name).copied()
        }
    }

    fn layout(names: &[&'static str]) -> Layout {
        Layout {
            slots: names.iter().enumerate().map(|(i, n)| (*n, i)).collect()
        }
    }

    #[test]
    fn test_nested_scopes_with_params() {
        let class = layout(&[]);
        let mut env = Environment::with_params(&class, ["a", "b"]);

        env.enter_scope();
        env.add_var("c").unwrap();
        env.enter_scope();
        env.add_var("d").unwrap();

        assert_eq!(env.lookup_var("d"), Some(0));
        assert_eq!(env.lookup_var("c"), Some(1));

        env.exit_scope().unwrap();
        env.exit_scope().unwrap();

        assert_eq!(env.lookup_var("c"), None);
        assert_eq!(env.lookup_var("d"), None);
        assert_eq!(env.resolve("a"), Ok(Location::Param(1)));
        assert_eq!(env.resolve("b"), Ok(Location::Param(0)));
    }

    #[test]
    fn test_scope_round_trip_restores_locals() {
        let class = layout(&[]);
        let mut env = Environment::new(&class);

        env.enter_scope();
        env.add_var("x").unwrap();
        env.add_obstacle().unwrap();
        let before: Vec<_> = env.locals().to_vec();

        env.enter_scope();
        env.add_var("y").unwrap();
        env.add_var("x").unwrap();
        env.enter_scope();
        env.add_obstacle().unwrap();
        env.add_var("z").unwrap();
        env.exit_scope().unwrap();
        env.add_var("w").unwrap();
        env.exit_scope().unwrap();

        assert_eq!(env.locals(), &before[..]);
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_lookup_precedence() {
        let class = layout(&["x", "y"]);
        let mut env = Environment::with_params(&class, ["x"]);

        assert_eq!(env.resolve("x"), Ok(Location::Param(0)));
        assert_eq!(env.resolve("y"), Ok(Location::Attrib(1)));

        env.enter_scope();
        env.add_var("x").unwrap();
        assert_eq!(env.resolve("x"), Ok(Location::Local(0)));

        env.exit_scope().unwrap();
        assert_eq!(env.resolve("x"), Ok(Location::Param(0)));
    }

    #[test]
    fn test_shadowing_prefers_latest_binding() {
        let class = layout(&[]);
        let mut env = Environment::new(&class);

        env.enter_scope();
        env.add_var("x").unwrap();
        env.add_var("x").unwrap();
        env.add_obstacle().unwrap();

        assert_eq!(env.lookup_var("x"), Some(1));
        assert_eq!(env.stack_len(), 3);
    }

    #[test]
    fn test_obstacles_shift_local_offsets() {
        let class = layout(&[]);
        let mut env = Environment::new(&class);

        env.enter_scope();
        env.add_var("t").unwrap();
        assert_eq!(env.lookup_var("t"), Some(0));

        env.enter_scope();
        env.add_obstacle().unwrap();
        env.add_obstacle().unwrap();
        assert_eq!(env.lookup_var("t"), Some(2));

        env.exit_scope().unwrap();
        assert_eq!(env.lookup_var("t"), Some(0));
    }

    #[test]
    fn test_unbound_identifier_is_reported() {
        let class = layout(&["a"]);
        let env = Environment::new(&class);
        assert_eq!(
            env.resolve("nope"),
            Err(CodegenError::UnboundIdentifier { name: "nope".into(), class: "Main".into() })
        );
    }

    #[test]
    fn test_scope_underflow() {
        let class = layout(&[]);
        let mut env = Environment::new(&class);
        assert_eq!(env.exit_scope(), Err(CodegenError::ScopeUnderflow));
        assert_eq!(env.add_var("x"), Err(CodegenError::ScopeUnderflow));
    }
}
