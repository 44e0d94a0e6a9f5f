// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Well-known class, method and identifier names.

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const BOOL: &str = "Bool";
pub const STRING: &str = "String";
pub const MAIN: &str = "Main";

pub const SELF_TYPE: &str = "SELF_TYPE";
pub const SELF: &str = "self";

/// Type of the raw machine word slots inside the boxed primitives.
pub const PRIM_SLOT: &str = "prim_slot";

pub const MAIN_METH: &str = "main";

// Object
pub const ABORT: &str = "abort";
pub const TYPE_NAME: &str = "type_name";
pub const COPY: &str = "copy";

// IO
pub const OUT_STRING: &str = "out_string";
pub const OUT_INT: &str = "out_int";
pub const IN_STRING: &str = "in_string";
pub const IN_INT: &str = "in_int";

// String
pub const LENGTH: &str = "length";
pub const CONCAT: &str = "concat";
pub const SUBSTR: &str = "substr";

// Attributes of the boxed primitives
pub const VAL: &str = "val";
pub const STR_FIELD: &str = "str_field";

/// Names of the classes whose objects are boxed machine values.
/// Nothing may inherit from them.
pub const PRIMITIVE_CLASSES: [&str; 3] = [INT, BOOL, STRING];

pub fn is_primitive(class_name: &str) -> bool {
    PRIMITIVE_CLASSES.contains(&class_name)
}
