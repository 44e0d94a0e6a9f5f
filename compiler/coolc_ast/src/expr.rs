// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use serde::{Deserialize, Serialize};

/// An expression together with the static type the checker gave it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,

    /// Static type. `None` only for `NoExpr`.
    #[serde(default)]
    pub ty: Option<String>,

    #[serde(default)]
    pub line: usize
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExprKind {
    Assign {
        name: String,
        expr: Box<Expr>
    },

    /// `expr@type_name.name(actuals)`
    StaticDispatch {
        expr: Box<Expr>,
        type_name: String,
        name: String,
        #[serde(default)]
        actuals: Vec<Expr>
    },

    /// `expr.name(actuals)`
    Dispatch {
        expr: Box<Expr>,
        name: String,
        #[serde(default)]
        actuals: Vec<Expr>
    },

    Cond {
        pred: Box<Expr>,
        then_exp: Box<Expr>,
        else_exp: Box<Expr>
    },

    Loop {
        pred: Box<Expr>,
        body: Box<Expr>
    },

    TypCase {
        expr: Box<Expr>,
        cases: Vec<Branch>
    },

    Block {
        body: Vec<Expr>
    },

    /// A single binding; multi-binding lets arrive already nested.
    Let {
        identifier: String,
        type_decl: String,
        init: Box<Expr>,
        body: Box<Expr>
    },

    Plus { lhs: Box<Expr>, rhs: Box<Expr> },
    Sub { lhs: Box<Expr>, rhs: Box<Expr> },
    Mul { lhs: Box<Expr>, rhs: Box<Expr> },
    Divide { lhs: Box<Expr>, rhs: Box<Expr> },
    Neg { expr: Box<Expr> },
    Lt { lhs: Box<Expr>, rhs: Box<Expr> },
    Eq { lhs: Box<Expr>, rhs: Box<Expr> },
    Leq { lhs: Box<Expr>, rhs: Box<Expr> },

    /// Boolean complement (`not`).
    Comp { expr: Box<Expr> },

    IntConst { value: i32 },
    BoolConst { value: bool },
    StringConst { value: String },

    New { type_name: String },
    IsVoid { expr: Box<Expr> },

    #[default]
    NoExpr,

    /// An identifier reference, `self` included.
    Object { name: String }
}

/// One arm of a `case` expression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub type_decl: String,
    pub expr: Expr
}

impl Branch {
    pub fn new(name: &str, type_decl: &str, expr: Expr) -> Self {
        Self {
            name: name.to_string(),
            type_decl: type_decl.to_string(),
            expr
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: &str) -> Self {
        Self {
            kind,
            ty: Some(ty.to_string()),
            line: 0
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn is_no_expr(&self) -> bool {
        matches!(self.kind, ExprKind::NoExpr)
    }

    /// Static type, with `Object` standing in for an untyped node.
    pub fn static_type(&self) -> &str {
        self.ty.as_deref().unwrap_or(crate::names::OBJECT)
    }

    pub fn no_expr() -> Self {
        Self::default()
    }

    pub fn int(value: i32) -> Self {
        Self::new(ExprKind::IntConst { value }, crate::names::INT)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::BoolConst { value }, crate::names::BOOL)
    }

    pub fn string(value: &str) -> Self {
        Self::new(ExprKind::StringConst { value: value.to_string() }, crate::names::STRING)
    }

    pub fn object(name: &str, ty: &str) -> Self {
        Self::new(ExprKind::Object { name: name.to_string() }, ty)
    }

    pub fn self_ref() -> Self {
        Self::object(crate::names::SELF, crate::names::SELF_TYPE)
    }

    pub fn assign(name: &str, expr: Expr) -> Self {
        let ty = expr.static_type().to_string();
        Self::new(ExprKind::Assign { name: name.to_string(), expr: Box::new(expr) }, &ty)
    }

    pub fn dispatch(receiver: Expr, name: &str, actuals: Vec<Expr>, ty: &str) -> Self {
        Self::new(
            ExprKind::Dispatch {
                expr: Box::new(receiver),
                name: name.to_string(),
                actuals
            },
            ty
        )
    }

    pub fn static_dispatch(receiver: Expr, type_name: &str, name: &str, actuals: Vec<Expr>, ty: &str) -> Self {
        Self::new(
            ExprKind::StaticDispatch {
                expr: Box::new(receiver),
                type_name: type_name.to_string(),
                name: name.to_string(),
                actuals
            },
            ty
        )
    }

    pub fn block(body: Vec<Expr>) -> Self {
        let ty = body.last().map(|e| e.static_type().to_string()).unwrap_or_else(|| crate::names::OBJECT.to_string());
        Self::new(ExprKind::Block { body }, &ty)
    }

    pub fn let_in(identifier: &str, type_decl: &str, init: Expr, body: Expr) -> Self {
        let ty = body.static_type().to_string();
        Self::new(
            ExprKind::Let {
                identifier: identifier.to_string(),
                type_decl: type_decl.to_string(),
                init: Box::new(init),
                body: Box::new(body)
            },
            &ty
        )
    }

    pub fn cond(pred: Expr, then_exp: Expr, else_exp: Expr, ty: &str) -> Self {
        Self::new(
            ExprKind::Cond {
                pred: Box::new(pred),
                then_exp: Box::new(then_exp),
                else_exp: Box::new(else_exp)
            },
            ty
        )
    }

    pub fn while_loop(pred: Expr, body: Expr) -> Self {
        Self::new(ExprKind::Loop { pred: Box::new(pred), body: Box::new(body) }, crate::names::OBJECT)
    }

    pub fn case(expr: Expr, cases: Vec<Branch>, ty: &str) -> Self {
        Self::new(ExprKind::TypCase { expr: Box::new(expr), cases }, ty)
    }

    pub fn plus(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Plus { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::INT)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Sub { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::INT)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Mul { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::INT)
    }

    pub fn divide(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Divide { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::INT)
    }

    pub fn neg(expr: Expr) -> Self {
        Self::new(ExprKind::Neg { expr: Box::new(expr) }, crate::names::INT)
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Lt { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::BOOL)
    }

    pub fn leq(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Leq { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::BOOL)
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Eq { lhs: Box::new(lhs), rhs: Box::new(rhs) }, crate::names::BOOL)
    }

    pub fn not(expr: Expr) -> Self {
        Self::new(ExprKind::Comp { expr: Box::new(expr) }, crate::names::BOOL)
    }

    pub fn new_object(type_name: &str) -> Self {
        Self::new(ExprKind::New { type_name: type_name.to_string() }, type_name)
    }

    pub fn is_void(expr: Expr) -> Self {
        Self::new(ExprKind::IsVoid { expr: Box::new(expr) }, crate::names::BOOL)
    }

    /// Calls `f` on every direct subexpression, in evaluation order.
    pub fn for_each_child(&self, mut f: impl FnMut(&Expr)) {
        match &self.kind {
            ExprKind::Assign { expr, .. } |
            ExprKind::Neg { expr } |
            ExprKind::Comp { expr } |
            ExprKind::IsVoid { expr } => f(expr),

            ExprKind::StaticDispatch { expr, actuals, .. } |
            ExprKind::Dispatch { expr, actuals, .. } => {
                actuals.iter().for_each(&mut f);
                f(expr);
            },

            ExprKind::Cond { pred, then_exp, else_exp } => {
                f(pred);
                f(then_exp);
                f(else_exp);
            },

            ExprKind::Loop { pred, body } => {
                f(pred);
                f(body);
            },

            ExprKind::TypCase { expr, cases } => {
                f(expr);
                cases.iter().for_each(|branch| f(&branch.expr));
            },

            ExprKind::Block { body } => body.iter().for_each(f),

            ExprKind::Let { init, body, .. } => {
                f(init);
                f(body);
            },

            ExprKind::Plus { lhs, rhs } |
            ExprKind::Sub { lhs, rhs } |
            ExprKind::Mul { lhs, rhs } |
            ExprKind::Divide { lhs, rhs } |
            ExprKind::Lt { lhs, rhs } |
            ExprKind::Eq { lhs, rhs } |
            ExprKind::Leq { lhs, rhs } => {
                f(lhs);
                f(rhs);
            },

            ExprKind::IntConst { .. } |
            ExprKind::BoolConst { .. } |
            ExprKind::StringConst { .. } |
            ExprKind::New { .. } |
            ExprKind::NoExpr |
            ExprKind::Object { .. } => ()
        }
    }
}
