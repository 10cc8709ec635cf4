//! Merges encoded instruction words into the preprocessed image and, in whole-program mode,
//! injects the start and halt vectors.

use log::debug;
use super32::MemoryImage;
use thiserror::Error;

use crate::encoder::encode_line;
use crate::error::AssembleError;
use crate::preprocessor::PreprocessResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image has only {image_words} word(s); the start/halt vectors need at least 2")]
    TooSmallForVectors { image_words: u32 },
}

/// Whether the assembled image is a standalone program (gets injected start/halt vectors
/// at word 0 and the last word) or a code fragment meant to be embedded into a larger image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    WholeProgram,
    Fragment,
}

/// Encodes every code line and writes the resulting words into `result.image` starting at
/// `result.code_address / 4`. In [`ProgramKind::WholeProgram`] mode, also overwrites word 0
/// with a branch that jumps to the code's first instruction and overwrites the last word
/// with a self-looping halt, per the design note on image bracketing: the original always
/// wrote these vectors in place rather than resizing the image to make room for them.
pub fn build_image(
    isa: &super32::InstructionSetConfig,
    mut result: PreprocessResult,
    kind: ProgramKind,
) -> Result<MemoryImage, AssembleError> {
    let code_start_word = result.code_address / 4;

    for (offset, (text, line)) in result.code_lines.iter().enumerate() {
        let current_address = result.code_address + (offset as u32) * 4;
        let word = encode_line(isa, text, &result.symbols, current_address, *line)?;
        result
            .image
            .write(code_start_word + offset as u32, word)
            .expect("pass1's high-water mark already accounts for the code region");
    }

    if let ProgramKind::WholeProgram = kind {
        inject_vectors(isa, &mut result.image, code_start_word)?;
    }

    Ok(result.image)
}

fn inject_vectors(
    isa: &super32::InstructionSetConfig,
    image: &mut MemoryImage,
    code_start_word: u32,
) -> Result<(), AssembleError> {
    let image_words = image.len() as u32;
    if image_words < 2 {
        return Err(ImageError::TooSmallForVectors { image_words }.into());
    }

    let beq = isa
        .branch_code("BEQ")
        .expect("the standard instruction set always defines BEQ");
    let last_word = image_words - 1;

    // Start vector at row 0: unconditionally taken (R30 == R30), landing on
    // `code_start_word` under the `row = (row + 1) + offset` branch semantics.
    let start_offset = code_start_word as i64 - 0 - 1;
    let start_imm = i16::try_from(start_offset).expect("program images are well within 16-bit offset range");
    let start_vector = super32::bitfield::pack_i(beq, 30, 30, start_imm);
    image
        .write(0, start_vector)
        .expect("checked image_words >= 2 above");

    // Halt vector at the last row: self-loops forever (offset -1).
    let halt_vector = super32::bitfield::pack_i(beq, 30, 30, -1);
    image
        .write(last_word, halt_vector)
        .expect("checked image_words >= 2 above");

    debug!(
        "injected start vector at word 0 (-> word {}) and halt vector at word {}",
        code_start_word, last_word
    );
    Ok(())
}
