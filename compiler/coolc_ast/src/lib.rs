// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Type-checked COOL syntax tree consumed by the code generator.
//!
//! The tree is produced (and validated) by the front end; nothing in
//! this crate checks it again.

mod class;
mod expr;
pub mod names;

pub use class::*;
pub use expr::*;
