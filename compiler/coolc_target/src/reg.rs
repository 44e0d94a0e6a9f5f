// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Register {
    pub id: u8,
    pub name: &'static str
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const ZERO: Register = Register { id: 0, name: "$zero" };

/// Accumulator: expression results and the receiver of a call.
pub const ACC: Register = Register { id: 4, name: "$a0" };
pub const A1: Register = Register { id: 5, name: "$a1" };

pub const T1: Register = Register { id: 9, name: "$t1" };
pub const T2: Register = Register { id: 10, name: "$t2" };

/// Holds `self` for the whole method body.
pub const SELF: Register = Register { id: 16, name: "$s0" };

pub const SP: Register = Register { id: 29, name: "$sp" };
pub const FP: Register = Register { id: 30, name: "$fp" };
pub const RA: Register = Register { id: 31, name: "$ra" };
