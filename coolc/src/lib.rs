// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

pub mod compiler;

use std::io::Error;
use std::path::{Path, PathBuf};

use coolc_codegen::CodegenConfig;
use compiler::CompilerPipeline;

/// Compiles the JSON AST in `file_name` and returns the path of the
/// assembly file written.
pub fn compile_file(file_name: &Path, output: Option<&Path>, config: CodegenConfig) -> Result<PathBuf, Error> {
    let comp = CompilerPipeline::new(config);
    comp.compile(file_name, output)
}
