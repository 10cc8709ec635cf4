//! Two-pass assembler for Super32 source text: tokenisation and directive handling in
//! [`preprocessor`], per-instruction encoding in [`encoder`], image assembly and vector
//! injection in [`image`], and textual rendering in [`format`].

pub mod encoder;
pub mod error;
pub mod format;
pub mod image;
pub mod preprocessor;

use log::info;
use super32::{Emulator, InstructionSetConfig, MemoryImage};

pub use error::{AssembleError, DirectiveError, LabelError, RangeError, SourceError};
pub use format::OutputMode;
pub use image::{ImageError, ProgramKind};
pub use preprocessor::SymbolTable;

/// The fully assembled result: the image, the source line each code word came from (for
/// breakpoint/debugger mapping), the word address execution should start at, and the
/// symbol table built along the way.
pub struct Assembly {
    pub image: MemoryImage,
    pub editor_line_numbers: Vec<u32>,
    pub code_address: u32,
    pub symbols: SymbolTable,
}

/// Runs both preprocessing passes, encodes every code line, and assembles the final image.
pub fn assemble(source: &str, kind: ProgramKind) -> Result<Assembly, AssembleError> {
    let isa = InstructionSetConfig::standard();
    let result = preprocessor::preprocess(source)?;
    let code_address = result.code_address;
    let symbols = result.symbols.clone();
    let editor_line_numbers = result.code_lines.iter().map(|(_, line)| *line).collect();
    let image = image::build_image(&isa, result, kind)?;
    info!(
        "assembled {} word(s), code_address={:#x}, {} symbol(s)",
        image.len(),
        code_address,
        symbols.len()
    );
    Ok(Assembly {
        image,
        editor_line_numbers,
        code_address,
        symbols,
    })
}

/// Assembles `source` and loads the result straight into a fresh [`Emulator`]. In
/// [`ProgramKind::WholeProgram`] mode execution begins at row 0 (the injected start vector),
/// regardless of where the code region itself was laid out; in [`ProgramKind::Fragment`] mode
/// it begins directly at the code region's first row.
pub fn assemble_and_load(source: &str, kind: ProgramKind) -> Result<Emulator, AssembleError> {
    let assembly = assemble(source, kind)?;
    let mut emulator = Emulator::new(
        InstructionSetConfig::standard(),
        assembly.image,
        assembly.code_address,
        assembly.editor_line_numbers,
    );
    if let ProgramKind::WholeProgram = kind {
        emulator.state.row = 0;
    }
    Ok(emulator)
}
