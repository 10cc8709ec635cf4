//! Fetch/decode/execute for a single instruction. Shares `crate::bitfield` with the encoder
//! so the two are mechanically guaranteed to agree bit-for-bit.

use log::trace;

use crate::bitfield::{self, unpack_i, unpack_r};
use crate::constants::ARITHMETIC_OPCODE;
use crate::error::{AddressError, ExecutionError};
use crate::isa::{ArithmeticOp, BranchOp, InstructionSetConfig, StorageOp};
use crate::Word;

use super::EmulatorState;

fn sign_extend(imm: i16) -> u32 {
    imm as i32 as u32
}

fn shl(rs: Word, rt: Word) -> Word {
    if rt >= 32 {
        0
    } else {
        rs << rt
    }
}

fn slr(rs: Word, rt: Word) -> Word {
    if rt >= 32 {
        0
    } else {
        rs >> rt
    }
}

fn sar(rs: Word, rt: Word) -> Word {
    if rt >= 32 {
        if (rs as i32) < 0 {
            0xFFFF_FFFF
        } else {
            0
        }
    } else {
        ((rs as i32) >> rt) as u32
    }
}

fn apply_arithmetic(op: ArithmeticOp, rs: Word, rt: Word) -> Word {
    match op {
        ArithmeticOp::Add => rs.wrapping_add(rt),
        ArithmeticOp::Sub => rs.wrapping_sub(rt),
        ArithmeticOp::And => rs & rt,
        ArithmeticOp::Or => rs | rt,
        ArithmeticOp::Nor => !(rs | rt),
        ArithmeticOp::Nand => !(rs & rt),
        ArithmeticOp::Shl => shl(rs, rt),
        ArithmeticOp::Slr => slr(rs, rt),
        ArithmeticOp::Sar => sar(rs, rt),
    }
}

/// Executes the instruction at the current row, updating registers, the zero flag, and the
/// row index in place. Callers are responsible for checking whether the current row is the
/// halt row before calling this (see [`super::Emulator::step`]).
pub fn tick(state: &mut EmulatorState, isa: &InstructionSetConfig) -> Result<(), ExecutionError> {
    let row = state.row;
    let word = state
        .image
        .read(row)
        .map_err(|source| address_fault(row, source))?;
    let opcode = bitfield::opcode_of(word);

    state.last_written_register = None;
    state.last_written_memory = None;

    if opcode as u32 == ARITHMETIC_OPCODE {
        let (rs, rt, rd, funct) = unpack_r(word);
        let op = isa
            .arithmetic_op(funct)
            .ok_or(ExecutionError::UnknownFunct { row, funct })?;
        let rs_val = state.registers[rs as usize];
        let rt_val = state.registers[rt as usize];
        trace!("row {}: {:?} R{} <- R{} R{}", row, op, rd, rs, rt);
        let result = apply_arithmetic(op, rs_val, rt_val);
        state.registers[rd as usize] = result;
        state.last_written_register = Some(rd);
        state.z = rs_val == rt_val;
        state.row += 1;
        return Ok(());
    }

    let (_, rs, rt, imm) = unpack_i(word);

    if let Some(storage) = isa.storage_op(opcode) {
        let base = state.registers[rs as usize];
        match storage {
            StorageOp::Li => {
                trace!("row {}: LI R{} <- R{} + {}", row, rt, rs, imm);
                let value = base.wrapping_add(sign_extend(imm));
                state.registers[rt as usize] = value;
                state.last_written_register = Some(rt);
                state.z = base == sign_extend(imm);
            }
            StorageOp::Lw => {
                let addr = (base as i32).wrapping_add(imm as i32);
                let index = state
                    .image
                    .resolve_byte_address(addr)
                    .map_err(|source| address_fault(row, source))?;
                let loaded = state
                    .image
                    .read(index)
                    .map_err(|source| address_fault(row, source))?;
                trace!("row {}: LW R{} <- [R{}+{}]", row, rt, rs, imm);
                state.registers[rt as usize] = loaded;
                state.last_written_register = Some(rt);
                state.z = base == sign_extend(imm);
            }
            StorageOp::Sw => {
                let addr = (base as i32).wrapping_add(imm as i32);
                let index = state
                    .image
                    .resolve_byte_address(addr)
                    .map_err(|source| address_fault(row, source))?;
                let value = state.registers[rt as usize];
                trace!("row {}: SW [R{}+{}] <- R{}", row, rs, imm, rt);
                state
                    .image
                    .write(index, value)
                    .map_err(|source| address_fault(row, source))?;
                state.last_written_memory = Some(index);
                state.z = base == sign_extend(imm);
            }
        }
        state.row += 1;
        return Ok(());
    }

    if let Some(BranchOp::Beq) = isa.branch_op(opcode) {
        let rs_val = state.registers[rs as usize];
        let rt_val = state.registers[rt as usize];
        state.z = rs_val == rt_val;
        let fallthrough = row as i64 + 1;
        trace!("row {}: BEQ R{} R{} {} (taken={})", row, rs, rt, imm, state.z);
        state.row = if state.z {
            (fallthrough + imm as i64) as u32
        } else {
            fallthrough as u32
        };
        return Ok(());
    }

    Err(ExecutionError::UnknownOpcode { row, opcode })
}

fn address_fault(row: Word, source: AddressError) -> ExecutionError {
    ExecutionError::Address { row, source }
}
