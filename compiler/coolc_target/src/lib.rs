// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! SPIM/MIPS target description for the COOL runtime.

pub mod layout;
pub mod mips;
pub mod reg;
pub mod runtime;

pub use mips::AsmWriter;
pub use reg::Register;
