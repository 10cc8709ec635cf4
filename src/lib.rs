pub mod bitfield;
pub mod constants;
pub mod emulator;
pub mod error;
pub mod isa;
pub mod memory;

pub type Word = u32;
pub type Immediate = i16;

pub use emulator::{Emulator, EmulatorState, RunState};
pub use error::{AddressError, ExecutionError};
pub use isa::{ArithmeticOp, BranchOp, InstructionSetConfig, ParseRegisterError, RegisterId, StorageOp};
pub use memory::MemoryImage;
