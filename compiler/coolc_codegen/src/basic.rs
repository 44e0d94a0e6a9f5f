// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Declarations of the classes every program starts with. Their method
//! bodies live in the runtime; only their layouts are generated.

use coolc_ast::names::*;
use coolc_ast::{Attr, Class, Expr, Feature, Formal, Method};

use lazy_static::lazy_static;

/// File name recorded for the built-in classes.
pub const BASIC_FILENAME: &str = "<basic class>";

fn method(name: &str, formals: &[(&str, &str)], return_type: &str) -> Feature {
    Feature::Method(Method::new(
        name,
        formals.iter().map(|(n, t)| Formal::new(n, t)).collect(),
        return_type,
        Expr::no_expr()
    ))
}

fn attr(name: &str, type_decl: &str) -> Feature {
    Feature::Attr(Attr::new(name, type_decl, Expr::no_expr()))
}

lazy_static! {
    /// Object, IO, Int, Bool and String, root first.
    pub static ref BASIC_CLASSES: Vec<Class> = vec![
        Class::new(
            OBJECT,
            None,
            vec![
                method(ABORT, &[], OBJECT),
                method(TYPE_NAME, &[], STRING),
                method(COPY, &[], SELF_TYPE)
            ],
            BASIC_FILENAME
        ),
        Class::new(
            IO,
            Some(OBJECT),
            vec![
                method(OUT_STRING, &[("arg", STRING)], SELF_TYPE),
                method(OUT_INT, &[("arg", INT)], SELF_TYPE),
                method(IN_STRING, &[], STRING),
                method(IN_INT, &[], INT)
            ],
            BASIC_FILENAME
        ),
        // the raw machine integer lives in `val`
        Class::new(INT, Some(OBJECT), vec![attr(VAL, PRIM_SLOT)], BASIC_FILENAME),
        Class::new(BOOL, Some(OBJECT), vec![attr(VAL, PRIM_SLOT)], BASIC_FILENAME),
        // `val` points at the Int length, `str_field` starts the bytes
        Class::new(
            STRING,
            Some(OBJECT),
            vec![
                attr(VAL, INT),
                attr(STR_FIELD, PRIM_SLOT),
                method(LENGTH, &[], INT),
                method(CONCAT, &[("arg", STRING)], STRING),
                method(SUBSTR, &[("arg", INT), ("arg2", INT)], STRING)
            ],
            BASIC_FILENAME
        )
    ];
}

pub fn is_basic_class(name: &str) -> bool {
    BASIC_CLASSES.iter().any(|class| class.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_the_only_parentless_basic_class() {
        let roots: Vec<_> = BASIC_CLASSES.iter().filter(|c| c.parent.is_none()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, OBJECT);
    }

    #[test]
    fn test_string_layout_fields() {
        let string = BASIC_CLASSES.iter().find(|c| c.name == STRING).unwrap();
        let attrs: Vec<_> = string.attribs().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec![VAL, STR_FIELD]);
        assert_eq!(string.methods().count(), 3);
    }

    #[test]
    fn test_is_basic_class() {
        assert!(is_basic_class("IO"));
        assert!(!is_basic_class("Main"));
    }
}
