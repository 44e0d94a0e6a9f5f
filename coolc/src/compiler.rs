// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use coolc_ast::Program;
use coolc_codegen::CodegenConfig;
use coolc_errors::CodegenError;
use log::{debug, info};

#[derive(Debug, Clone)]
pub struct CompilerPipeline {
    config: CodegenConfig
}

impl CompilerPipeline {
    pub fn new(config: CodegenConfig) -> Self {
        Self { config }
    }

    pub fn compile(&self, entry_file: &Path, output: Option<&Path>) -> Result<PathBuf, Error> {
        let program = Self::load_program(entry_file)?;
        debug!("loaded {} classes from {}", program.classes.len(), entry_file.display());

        let asm = self.compile_program(&program)?;

        let out_path = output.map(Path::to_path_buf).unwrap_or_else(|| Self::output_path(entry_file));
        fs::write(&out_path, asm)?;
        info!("wrote {}", out_path.display());
        Ok(out_path)
    }

    /// Generates the assembly text for an already loaded program.
    pub fn compile_program(&self, program: &Program) -> Result<String, Error> {
        coolc_codegen::cgen(program, &self.config).map_err(into_io_error)
    }

    pub fn load_program(path: &Path) -> Result<Program, Error> {
        let source = fs::read_to_string(path)?;
        serde_json::from_str(&source).map_err(|err| Error::new(ErrorKind::InvalidData, err))
    }

    /// `foo/bar.json` becomes `foo/bar.s`.
    pub fn output_path(input: &Path) -> PathBuf {
        input.with_extension("s")
    }
}

fn into_io_error(err: CodegenError) -> Error {
    let kind = if err.is_internal() { ErrorKind::Other } else { ErrorKind::InvalidInput };
    Error::new(kind, format!("error[{:?}]: {}", err.code(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(CompilerPipeline::output_path(Path::new("dir/hello.json")), PathBuf::from("dir/hello.s"));
        assert_eq!(CompilerPipeline::output_path(Path::new("hello")), PathBuf::from("hello.s"));
    }

    #[test]
    fn test_structural_error_carries_code() {
        let err = into_io_error(CodegenError::MissingMainClass);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "error[CLS5006]: class `Main` is not defined");
    }
}
