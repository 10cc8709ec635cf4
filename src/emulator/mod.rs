//! Plain emulator state plus the step/run/stop control surface. Deliberately holds no
//! reference to any UI: the design note on emulator/UI coupling asks for a plain state
//! structure that an embedding observer reads, rather than widgets the core writes into.

mod decode;

use std::collections::HashSet;

use log::{debug, info};

use crate::constants::REGISTER_COUNT;
use crate::error::ExecutionError;
use crate::isa::InstructionSetConfig;
use crate::memory::MemoryImage;
use crate::Word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    PausedAtBreakpoint(u32),
    Halted,
}

/// `{register file, PC, Z flag, row index, image, breakpoints, running}` from the design.
///
/// The two `last_written_*` fields are pure observation state: useful to an embedding
/// observer (a GUI, a test harness), never read back by the emulator itself.
#[derive(Debug)]
pub struct EmulatorState {
    pub registers: [Word; REGISTER_COUNT],
    pub z: bool,
    pub row: u32,
    pub image: MemoryImage,
    pub editor_line_numbers: Vec<u32>,
    pub code_address: u32,
    pub last_written_register: Option<u8>,
    pub last_written_memory: Option<u32>,
}

impl EmulatorState {
    pub fn pc(&self) -> Word {
        self.row.wrapping_mul(4)
    }

    fn halt_row(&self) -> u32 {
        self.image.len() as u32 - 1
    }

    /// The 1-based source line the current row corresponds to, if the row falls within the
    /// code region (mirrors the original's mapping from `row_counter` back to an editor line).
    pub fn current_source_line(&self) -> Option<u32> {
        let code_row = self.code_address / 4;
        let offset = self.row.checked_sub(code_row)? as usize;
        self.editor_line_numbers.get(offset).copied()
    }
}

pub struct Emulator {
    pub isa: InstructionSetConfig,
    pub breakpoints: HashSet<u32>,
    pub state: EmulatorState,
    pub run_state: RunState,
    stop_requested: bool,
}

impl Emulator {
    /// Wraps an already-assembled image. `row` starts at `code_address / 4` per the design's
    /// `load()` contract ("sets i=0" for whole-program images whose code address is 0; for a
    /// non-zero code address the row starts at the entry point itself).
    pub fn new(
        isa: InstructionSetConfig,
        image: MemoryImage,
        code_address: u32,
        editor_line_numbers: Vec<u32>,
    ) -> Self {
        info!(
            "loaded image of {} words, code_address={:#x}",
            image.len(),
            code_address
        );
        Emulator {
            isa,
            breakpoints: HashSet::new(),
            state: EmulatorState {
                registers: [0; REGISTER_COUNT],
                z: false,
                row: code_address / 4,
                image,
                editor_line_numbers,
                code_address,
                last_written_register: None,
                last_written_memory: None,
            },
            run_state: RunState::Idle,
            stop_requested: false,
        }
    }

    fn at_halt_row(&self) -> bool {
        self.state.row >= self.state.halt_row()
    }

    /// Executes a single instruction. A no-op once the halt row has been reached.
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        if self.at_halt_row() {
            self.run_state = RunState::Halted;
            return Ok(());
        }
        decode::tick(&mut self.state, &self.isa)?;
        self.run_state = if self.at_halt_row() {
            RunState::Halted
        } else {
            RunState::Running
        };
        Ok(())
    }

    /// Repeats `step()` until halt, a breakpoint line is reached, or `stop()` is called.
    /// Breakpoints are cooperative suspension points at source-line granularity: when the
    /// *next* instruction would land on a breakpointed line, `run()` returns without
    /// executing it.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        self.stop_requested = false;
        self.run_state = RunState::Running;
        loop {
            if self.stop_requested {
                self.run_state = RunState::Idle;
                return Ok(());
            }
            if self.at_halt_row() {
                self.run_state = RunState::Halted;
                debug!("halted at row {}", self.state.row);
                return Ok(());
            }
            if let Some(line) = self.state.current_source_line() {
                if self.breakpoints.contains(&line) {
                    self.run_state = RunState::PausedAtBreakpoint(line);
                    debug!("paused at breakpoint, line {}", line);
                    return Ok(());
                }
            }
            self.step()?;
        }
    }

    /// Cooperative cancellation: consulted between instructions inside `run()`.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        self.run_state = RunState::Idle;
    }
}
