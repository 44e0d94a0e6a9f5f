// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

/// Memory manager linked in by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GcMode {
    /// No collection; the heap only grows.
    #[default]
    NoGc,

    /// Generational collector. Attribute stores go through the write
    /// barrier.
    Generational
}

#[derive(Debug, Clone, Default)]
pub struct CodegenConfig {
    pub gc: GcMode,

    /// Ask the collector to run on every allocation.
    pub gc_test: bool,

    /// Annotate the output with comments.
    pub debug: bool
}

impl CodegenConfig {
    pub fn builder() -> CodegenConfigBuilder {
        CodegenConfigBuilder::new()
    }
}

pub struct CodegenConfigBuilder {
    gc: Option<GcMode>,
    gc_test: Option<bool>,
    debug: Option<bool>
}

impl CodegenConfigBuilder {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            gc: None,
            gc_test: None,
            debug: None
        }
    }

    pub fn gc(mut self, gc: GcMode) -> Self {
        self.gc = Some(gc);
        self
    }

    pub fn gc_test(mut self, gc_test: bool) -> Self {
        self.gc_test = Some(gc_test);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn build(self) -> CodegenConfig {
        CodegenConfig {
            gc: self.gc.unwrap_or_default(),
            gc_test: self.gc_test.unwrap_or_default(),
            debug: self.debug.unwrap_or_default()
        }
    }
}
