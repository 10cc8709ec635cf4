//! Command-line driver: assembles a Super32 source file, writes the image in one of the two
//! textual formats, and optionally loads and runs the result for a quick terminal smoke test.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::info;
use thiserror::Error;

use super32_asm::{format, AssembleError, OutputMode, ProgramKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliOutputMode {
    Lines,
    Stream,
}

impl From<CliOutputMode> for OutputMode {
    fn from(mode: CliOutputMode) -> Self {
        match mode {
            CliOutputMode::Lines => OutputMode::Lines,
            CliOutputMode::Stream => OutputMode::Stream,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliProgramKind {
    /// Single, whole-program image: row 0 gets a start vector and the last row a halt vector.
    Single,
    /// Multi-module fragment: the image is left exactly as preprocessed, with no injected vectors.
    Multi,
}

impl From<CliProgramKind> for ProgramKind {
    fn from(kind: CliProgramKind) -> Self {
        match kind {
            CliProgramKind::Single => ProgramKind::WholeProgram,
            CliProgramKind::Multi => ProgramKind::Fragment,
        }
    }
}

/// Assembles Super32 source into a binary-text image.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the assembly source file.
    pub input: PathBuf,

    /// Path to write the assembled image to. Defaults to the input path with a `.m32` extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How each image word is rendered.
    #[arg(short = 'f', long, value_enum, default_value = "lines")]
    pub format: CliOutputMode,

    /// Architecture mode: whether start/halt vectors are injected into the image.
    #[arg(short, long, value_enum, default_value = "single")]
    pub kind: CliProgramKind,

    /// Load the assembled image into the emulator and run it to completion, printing the
    /// final register file and zero flag. Intended for quick manual checks, not automation.
    #[arg(long)]
    pub run: bool,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("reading \"{path}\": {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("assembling \"{path}\": {source}")]
    Assemble {
        path: PathBuf,
        #[source]
        source: AssembleError,
    },
    #[error("running \"{path}\": {source}")]
    Run {
        path: PathBuf,
        #[source]
        source: super32::ExecutionError,
    },
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let source = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;

    let kind: ProgramKind = cli.kind.into();
    let assembly = super32_asm::assemble(&source, kind).map_err(|source| CliError::Assemble {
        path: cli.input.clone(),
        source,
    })?;
    info!(
        "assembled {} word(s) from {}",
        assembly.image.len(),
        cli.input.display()
    );

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    let rendered = format::format_image(&assembly.image, cli.format.into());
    fs::write(&output_path, rendered).map_err(|source| CliError::Write {
        path: output_path.clone(),
        source,
    })?;
    println!("wrote {}", output_path.display());

    if cli.run {
        let mut emulator = super32_asm::assemble_and_load(&source, kind).map_err(|source| CliError::Assemble {
            path: cli.input.clone(),
            source,
        })?;
        emulator.run().map_err(|source| CliError::Run {
            path: cli.input.clone(),
            source,
        })?;
        print_final_state(&emulator);
    }

    Ok(())
}

pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("m32")
}

fn print_final_state(emulator: &super32::Emulator) {
    println!("run_state: {:?}", emulator.run_state);
    println!("pc: {:#x}", emulator.state.pc());
    println!("z: {}", emulator.state.z);
    for (i, value) in emulator.state.registers.iter().enumerate() {
        if *value != 0 {
            println!("R{}: {:#x}", i, value);
        }
    }
}
