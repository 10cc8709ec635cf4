//! Run-time error kinds raised by the memory image and the emulator tick loop.
//!
//! Assembly-time error kinds (`SourceError`, `LabelError`, `RangeError`, `DirectiveError`)
//! live in the `super32-asm` crate, since only the preprocessor and encoder raise them.

use thiserror::Error;

/// `LW`/`SW` resolved to an address outside the image, or the image was asked to read/write
/// past its bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address {address:#010x} is out of range for an image of {image_words} words")]
    OutOfRange { address: u32, image_words: u32 },
}

/// Fatal decode/execute failure. Unlike assembly-time errors this carries the row index
/// (`i` in the design's emulator state), not a source line number — the emulator has no
/// access to the original source once a program has been loaded as an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("row {row}: opcode {opcode:#08b} does not name a known instruction family")]
    UnknownOpcode { row: u32, opcode: u8 },

    #[error("row {row}: funct code {funct:#08b} is not a known arithmetic operation")]
    UnknownFunct { row: u32, funct: u8 },

    #[error("row {row}: {source}")]
    Address {
        row: u32,
        #[source]
        source: AddressError,
    },
}
