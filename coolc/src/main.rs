// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, ValueEnum};
use coolc_codegen::{CodegenConfig, GcMode};
use log::LevelFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GcArg {
    None,
    Generational
}

#[derive(ClapParser, Debug)]
#[command(author, version, about = "COOL code generator for SPIM", long_about = None)]
struct Cli {
    /// Type-checked program as JSON
    input: PathBuf,

    /// Assembly output (defaults to the input with a `.s` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Garbage collector linked in by the runtime
    #[arg(long, value_enum, default_value = "none")]
    gc: GcArg,

    /// Collect on every allocation
    #[arg(long)]
    gc_test: bool,

    /// Annotate the assembly with comments
    #[arg(long)]
    debug: bool,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = CodegenConfig::builder()
        .gc(match cli.gc {
            GcArg::None => GcMode::NoGc,
            GcArg::Generational => GcMode::Generational
        })
        .gc_test(cli.gc_test)
        .debug(cli.debug)
        .build();

    if let Err(err) = coolc::compile_file(&cli.input, cli.output.as_deref(), config) {
        eprintln!("{}: {}", cli.input.display(), err);
        process::exit(1);
    }
}
