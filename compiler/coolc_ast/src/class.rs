// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use serde::{Deserialize, Serialize};

use crate::Expr;

/// The whole compilation unit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<Class>
}

/// A class declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Class {
    pub name: String,

    /// Declared parent. Only the root class has none; a class written
    /// without `inherits` gets `Object` from the front end.
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub features: Vec<Feature>,

    /// Source file the class was declared in.
    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub line: usize
}

impl Class {
    pub fn new(name: &str, parent: Option<&str>, features: Vec<Feature>, filename: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            features,
            filename: filename.to_string(),
            line: 0
        }
    }

    /// Attributes declared directly in this class, in source order.
    pub fn attribs(&self) -> impl Iterator<Item = &Attr> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Attr(attr) => Some(attr),
            Feature::Method(_) => None
        })
    }

    /// Methods declared directly in this class, in source order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Method(method) => Some(method),
            Feature::Attr(_) => None
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum Feature {
    Method(Method),
    Attr(Attr)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Method {
    pub name: String,

    #[serde(default)]
    pub formals: Vec<Formal>,

    pub return_type: String,

    pub body: Expr
}

impl Method {
    pub fn new(name: &str, formals: Vec<Formal>, return_type: &str, body: Expr) -> Self {
        Self {
            name: name.to_string(),
            formals,
            return_type: return_type.to_string(),
            body
        }
    }

    pub fn arg_count(&self) -> usize {
        self.formals.len()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,

    pub type_decl: String,

    /// `NoExpr` when the attribute has no initializer.
    #[serde(default)]
    pub init: Expr
}

impl Attr {
    pub fn new(name: &str, type_decl: &str, init: Expr) -> Self {
        Self {
            name: name.to_string(),
            type_decl: type_decl.to_string(),
            init
        }
    }
}

/// A formal parameter of a method.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Formal {
    pub name: String,
    pub type_decl: String
}

impl Formal {
    pub fn new(name: &str, type_decl: &str) -> Self {
        Self {
            name: name.to_string(),
            type_decl: type_decl.to_string()
        }
    }
}
