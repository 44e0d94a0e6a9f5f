// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Object and frame layout shared with the runtime.

pub const WORD_SIZE: usize = 4;
pub const LOG_WORD_SIZE: usize = 2;

/// Header words of every object: tag, size, dispatch table.
pub const DEFAULT_OBJFIELDS: usize = 3;
pub const TAG_OFFSET: usize = 0;
pub const DISPTABLE_OFFSET: usize = 2;

/// Word offset of the first attribute slot.
pub const ATTR_OFFSET: usize = DEFAULT_OBJFIELDS;

pub const STRING_SLOTS: usize = 1;
pub const INT_SLOTS: usize = 1;
pub const BOOL_SLOTS: usize = 1;

/// Garbage collector tag placed in the word before every object.
pub const EYE_CATCHER: i32 = -1;

/// Saved `$fp`, `$s0` and `$ra`.
pub const FRAME_SAVED_WORDS: usize = 3;

/// Word offset from `$fp` of the last pushed argument.
pub const FRAME_ARG_OFFSET: usize = FRAME_SAVED_WORDS;

/// Each `class_objTab` entry is a (prototype, init) pair.
pub const OBJTAB_ENTRY_WORDS: usize = 2;

/// Words taken by a string object holding `len` bytes.
pub fn string_object_words(len: usize) -> usize {
    DEFAULT_OBJFIELDS + STRING_SLOTS + (len + 4) / 4
}

/// Byte offset of attribute `slot`.
pub fn attr_byte_offset(slot: usize) -> usize {
    (ATTR_OFFSET + slot) * WORD_SIZE
}
