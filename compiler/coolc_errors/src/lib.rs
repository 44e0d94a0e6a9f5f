// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

pub mod code;

use thiserror::Error;

use crate::code::ErrCode;

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Everything that can stop code generation.
///
/// Structural errors describe a malformed class hierarchy and are found
/// while the class table is built. Internal errors mean the front end let
/// through something it should have rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("class `{class}` is defined more than once")]
    DuplicateClass { class: String },

    #[error("class `{class}` redefines a basic class")]
    RedefinedBasicClass { class: String },

    #[error("class `{class}` inherits from undefined class `{parent}`")]
    UndefinedParent { class: String, parent: String },

    #[error("class `{class}` cannot inherit from `{parent}`")]
    InheritsFromPrimitive { class: String, parent: String },

    #[error("class `{class}` is part of an inheritance cycle")]
    InheritanceCycle { class: String },

    #[error("attribute `{attr}` of class `{class}` is already defined in an ancestor")]
    DuplicateAttribute { class: String, attr: String },

    #[error("class `Main` is not defined")]
    MissingMainClass,

    #[error("class `Main` does not define method `main`")]
    MissingMainMethod,

    #[error("internal error: unbound identifier `{name}` in class `{class}`")]
    UnboundIdentifier { name: String, class: String },

    #[error("internal error: unknown class `{name}`")]
    UnknownClass { name: String },

    #[error("internal error: class `{class}` has no method `{method}`")]
    UnknownMethod { class: String, method: String },

    #[error("internal error: constant {value} is not in the constant pool")]
    MissingConstant { value: String },

    #[error("internal error: scope exited without a matching enter")]
    ScopeUnderflow
}

impl CodegenError {
    pub fn code(&self) -> ErrCode {
        match self {
            Self::DuplicateClass { .. }         => ErrCode::CLS5000,
            Self::RedefinedBasicClass { .. }    => ErrCode::CLS5001,
            Self::UndefinedParent { .. }        => ErrCode::CLS5002,
            Self::InheritsFromPrimitive { .. }  => ErrCode::CLS5003,
            Self::InheritanceCycle { .. }       => ErrCode::CLS5004,
            Self::DuplicateAttribute { .. }     => ErrCode::CLS5005,
            Self::MissingMainClass              => ErrCode::CLS5006,
            Self::MissingMainMethod             => ErrCode::CLS5007,
            Self::UnboundIdentifier { .. }      => ErrCode::INT6000,
            Self::UnknownClass { .. }           => ErrCode::INT6001,
            Self::UnknownMethod { .. }          => ErrCode::INT6002,
            Self::MissingConstant { .. }        => ErrCode::INT6003,
            Self::ScopeUnderflow                => ErrCode::INT6004
        }
    }

    /// Internal errors are invariant violations, not user diagnostics.
    pub fn is_internal(&self) -> bool {
        (self.code() as u32) >= ErrCode::INT6000 as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors_are_not_internal() {
        let err = CodegenError::UndefinedParent { class: "A".into(), parent: "B".into() };
        assert!(!err.is_internal());
        assert_eq!(err.code(), ErrCode::CLS5002);
        assert_eq!(err.to_string(), "class `A` inherits from undefined class `B`");
    }

    #[test]
    fn test_lookup_miss_is_internal() {
        let err = CodegenError::UnboundIdentifier { name: "x".into(), class: "Main".into() };
        assert!(err.is_internal());
        assert_eq!(err.code(), ErrCode::INT6000);
    }
}
