//! Assembly-time error taxonomy. Every raised variant carries the originating 1-based
//! editor line number, per the error handling policy: preprocessor and encoder errors are
//! fatal for the translation unit and reported with that line number.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("line {line}: expected 4 tokens, found {found}")]
    WrongTokenCount { line: u32, found: usize },

    #[error("line {line}: command not found: {mnemonic}")]
    UnknownMnemonic { line: u32, mnemonic: String },

    #[error("line {line}: '{text}' is not a valid numeric literal")]
    BadNumericLiteral { line: u32, text: String },

    #[error("line {line}: '{text}' is not a valid register")]
    BadRegister { line: u32, text: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("line {line}: undefined label '{label}'")]
    Undefined { line: u32, label: String },

    #[error("line {line}: label '{label}' is already defined")]
    Collision { line: u32, label: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("line {line}: immediate {value} does not fit in a signed 16-bit field")]
    ImmediateOutOfRange { line: u32, value: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("no ORG directive found before the first address-advancing line")]
    MissingOrg,

    #[error("missing START or END directive")]
    MissingStartOrEnd,

    #[error("line {line}: DEFINE without an active ORG")]
    DefineWithoutOrg { line: u32 },

    #[error("line {line}: START without an active ORG")]
    StartWithoutOrg { line: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error(transparent)]
    Image(#[from] crate::image::ImageError),
}
