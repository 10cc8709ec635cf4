//! Per-line encoding: tokenisation, classification, and dispatch to the three instruction
//! families. Shares `super32::bitfield` with the emulator's decoder.

use log::debug;
use super32::bitfield::{pack_i, pack_r};
use super32::{InstructionSetConfig, RegisterId, Word};

use crate::error::{AssembleError, RangeError, SourceError};
use crate::preprocessor::{parse_number, SymbolTable};

/// Splits on whitespace and on any of `(`, `)`, `,`.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' || c == ',' {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    tokens
}

fn parse_register(token: &str, line: u32) -> Result<RegisterId, SourceError> {
    token.parse().map_err(|_| SourceError::BadRegister {
        line,
        text: token.to_string(),
    })
}

fn fits_i16(value: i64, line: u32) -> Result<i16, RangeError> {
    i16::try_from(value).map_err(|_| RangeError::ImmediateOutOfRange { line, value })
}

/// Resolves the last operand of a storage instruction to an absolute value: `$`-prefixed
/// hex, a signed decimal literal, or a label looked up in the symbol table.
fn resolve_storage_operand(
    token: &str,
    symbols: &SymbolTable,
    line: u32,
) -> Result<i64, AssembleError> {
    if token.starts_with('$') || token.starts_with('-') || token.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        Ok(super::preprocessor::parse_number(token, line)?)
    } else {
        symbols
            .get(token)
            .map(|&addr| addr as i64)
            .ok_or_else(|| {
                crate::error::LabelError::Undefined {
                    line,
                    label: token.to_string(),
                }
                .into()
            })
    }
}

/// Resolves a branch target to a signed word-offset: a numeric literal is used directly;
/// a label is resolved PC-relative to the instruction *after* the branch.
fn resolve_branch_target(
    token: &str,
    symbols: &SymbolTable,
    current_address: u32,
    line: u32,
) -> Result<i64, AssembleError> {
    if token.starts_with('$') || token.starts_with('-') || token.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        Ok(parse_number(token, line)?)
    } else {
        let label_address = *symbols.get(token).ok_or_else(|| crate::error::LabelError::Undefined {
            line,
            label: token.to_string(),
        })?;
        Ok((label_address as i64 - current_address as i64 - 4) / 4)
    }
}

pub fn encode_arithmetic(
    isa: &InstructionSetConfig,
    tokens: &[&str],
    line: u32,
) -> Result<Word, AssembleError> {
    let funct = isa
        .arithmetic_code(tokens[0])
        .expect("caller already classified token[0] as an arithmetic mnemonic");
    let rd = parse_register(tokens[1], line)?;
    let rs = parse_register(tokens[2], line)?;
    let rt = parse_register(tokens[3], line)?;
    debug!("line {}: {} {},{},{}", line, tokens[0], tokens[1], tokens[2], tokens[3]);
    Ok(pack_r(rs.code(), rt.code(), rd.code(), funct))
}

pub fn encode_storage(
    isa: &InstructionSetConfig,
    tokens: &[&str],
    symbols: &SymbolTable,
    line: u32,
) -> Result<Word, AssembleError> {
    let opcode = isa
        .storage_code(tokens[0])
        .expect("caller already classified token[0] as a storage mnemonic");
    // Tokens are `OP Rd Rs imm`; the bit layout's Rs field is always the base register
    // (token[2]) and the Rt field is the dest/src register (token[1]), for both loads and
    // stores alike.
    let dest_or_src = parse_register(tokens[1], line)?;
    let base = parse_register(tokens[2], line)?;
    let value = resolve_storage_operand(tokens[3], symbols, line)?;
    let imm = fits_i16(value, line)?;
    debug!("line {}: {} {},{},{}", line, tokens[0], tokens[1], tokens[2], tokens[3]);
    Ok(pack_i(opcode, base.code(), dest_or_src.code(), imm))
}

pub fn encode_branch(
    isa: &InstructionSetConfig,
    tokens: &[&str],
    symbols: &SymbolTable,
    current_address: u32,
    line: u32,
) -> Result<Word, AssembleError> {
    let opcode = isa
        .branch_code(tokens[0])
        .expect("caller already classified token[0] as a branch mnemonic");
    let rs = parse_register(tokens[1], line)?;
    let rt = parse_register(tokens[2], line)?;
    let offset = resolve_branch_target(tokens[3], symbols, current_address, line)?;
    let imm = fits_i16(offset, line)?;
    debug!("line {}: {} {},{},{}", line, tokens[0], tokens[1], tokens[2], tokens[3]);
    Ok(pack_i(opcode, rs.code(), rt.code(), imm))
}

/// Tokenises, classifies, and encodes a single assembly line into one instruction word.
pub fn encode_line(
    isa: &InstructionSetConfig,
    text: &str,
    symbols: &SymbolTable,
    current_address: u32,
    line: u32,
) -> Result<Word, AssembleError> {
    let tokens = tokenize(text);
    if tokens.len() != 4 {
        return Err(SourceError::WrongTokenCount {
            line,
            found: tokens.len(),
        }
        .into());
    }

    if isa.is_arithmetic_mnemonic(tokens[0]) {
        encode_arithmetic(isa, &tokens, line)
    } else if isa.is_storage_mnemonic(tokens[0]) {
        encode_storage(isa, &tokens, symbols, line)
    } else if isa.is_branch_mnemonic(tokens[0]) {
        encode_branch(isa, &tokens, symbols, current_address, line)
    } else {
        Err(SourceError::UnknownMnemonic {
            line,
            mnemonic: tokens[0].to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn tokenizes_parenthesised_operands() {
        assert_eq!(tokenize("LW R1, R2($10)"), vec!["LW", "R1", "R2", "$10"]);
    }

    #[test]
    fn wrong_token_count_is_rejected() {
        let isa = InstructionSetConfig::standard();
        let symbols = SymbolTable::new();
        let result = encode_line(&isa, "ADD R1,R2", &symbols, 0, 1);
        assert!(matches!(
            result,
            Err(AssembleError::Source(SourceError::WrongTokenCount { .. }))
        ));
    }

    #[test]
    fn arithmetic_round_trips_through_decode() {
        let isa = InstructionSetConfig::standard();
        let symbols = SymbolTable::new();
        let word = encode_line(&isa, "ADD R3,R1,R2", &symbols, 0, 1).unwrap();
        let (rs, rt, rd, funct) = super32::bitfield::unpack_r(word);
        assert_eq!((rs, rt, rd), (1, 2, 3));
        assert_eq!(isa.arithmetic_op(funct), Some(super32::ArithmeticOp::Add));
    }

    #[test]
    fn branch_resolves_forward_label_pc_relative() {
        let isa = InstructionSetConfig::standard();
        let mut symbols = SymbolTable::new();
        symbols.insert("LOOP".to_string(), 20);
        // current_address=0 means this instruction's own address is 0 (row 0).
        let word = encode_line(&isa, "BEQ R1,R2,LOOP", &symbols, 0, 1).unwrap();
        let (_, _, _, imm) = super32::bitfield::unpack_i(word);
        assert_eq!(imm, (20 - 0 - 4) / 4);
    }

    #[test]
    fn undefined_label_is_an_error() {
        let isa = InstructionSetConfig::standard();
        let symbols = SymbolTable::new();
        let result = encode_line(&isa, "LW R1,R2,MISSING", &symbols, 0, 1);
        assert!(matches!(
            result,
            Err(AssembleError::Label(crate::error::LabelError::Undefined { .. }))
        ));
    }

    #[test]
    fn out_of_range_immediate_is_an_error() {
        let isa = InstructionSetConfig::standard();
        let symbols = SymbolTable::new();
        let result = encode_line(&isa, "LI R1,R2,100000", &symbols, 0, 1);
        assert!(matches!(
            result,
            Err(AssembleError::Range(RangeError::ImmediateOutOfRange { .. }))
        ));
    }
}
