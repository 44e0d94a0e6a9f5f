// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

//! Symbols defined by, or expected by, the COOL runtime.

pub const CLASSNAMETAB: &str = "class_nameTab";
pub const CLASSOBJTAB: &str = "class_objTab";
pub const INTTAG: &str = "_int_tag";
pub const BOOLTAG: &str = "_bool_tag";
pub const STRINGTAG: &str = "_string_tag";
pub const HEAP_START: &str = "heap_start";

pub const DISPTAB_SUFFIX: &str = "_dispTab";
pub const METHOD_SEP: &str = ".";
pub const CLASSINIT_SUFFIX: &str = "_init";
pub const PROTOBJ_SUFFIX: &str = "_protObj";

pub const OBJECT_COPY: &str = "Object.copy";
pub const DISPATCH_ABORT: &str = "_dispatch_abort";
pub const CASE_ABORT: &str = "_case_abort";
pub const CASE_ABORT2: &str = "_case_abort2";
pub const EQUALITY_TEST: &str = "equality_test";

pub const GC_ASSIGN: &str = "_GenGC_Assign";
pub const GC_INIT: &str = "_GenGC_Init";
pub const GC_COLLECT: &str = "_GenGC_Collect";
pub const NO_GC_INIT: &str = "_NoGC_Init";
pub const NO_GC_COLLECT: &str = "_NoGC_Collect";

pub const MEMMGR_INITIALIZER: &str = "_MemMgr_INITIALIZER";
pub const MEMMGR_COLLECTOR: &str = "_MemMgr_COLLECTOR";
pub const MEMMGR_TEST: &str = "_MemMgr_TEST";

pub fn disptab(class: &str) -> String {
    format!("{class}{DISPTAB_SUFFIX}")
}

pub fn protobj(class: &str) -> String {
    format!("{class}{PROTOBJ_SUFFIX}")
}

pub fn init(class: &str) -> String {
    format!("{class}{CLASSINIT_SUFFIX}")
}

pub fn method(class: &str, method: &str) -> String {
    format!("{class}{METHOD_SEP}{method}")
}
