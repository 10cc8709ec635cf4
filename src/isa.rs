//! The instruction set configuration: mnemonic <-> bit-pattern tables, built once and
//! treated as immutable for the lifetime of a toolchain invocation (see design note on
//! config lookup: a reverse table is built once at startup instead of scanned per-instruction).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{ALWAYS_EQUAL_A, ALWAYS_EQUAL_B, REGISTER_COUNT};

/// A general-purpose register `R0..R31`. Plain data, `Copy`, used as a `HashMap` key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RegisterId(u8);

impl RegisterId {
    pub const ALWAYS_EQUAL_A: RegisterId = RegisterId(ALWAYS_EQUAL_A);
    pub const ALWAYS_EQUAL_B: RegisterId = RegisterId(ALWAYS_EQUAL_B);

    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(RegisterId(index))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn code(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegisterError(pub String);

impl fmt::Display for ParseRegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid register name", self.0)
    }
}

impl std::error::Error for ParseRegisterError {}

impl FromStr for RegisterId {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('R')
            .or_else(|| s.strip_prefix('r'))
            .ok_or_else(|| ParseRegisterError(s.to_string()))?;
        let index: u8 = digits.parse().map_err(|_| ParseRegisterError(s.to_string()))?;
        RegisterId::new(index).ok_or_else(|| ParseRegisterError(s.to_string()))
    }
}

/// The R-type arithmetic family, dispatched on the 6-bit `funct` field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArithmeticOp {
    Add,
    Sub,
    And,
    Or,
    Nor,
    Nand,
    Shl,
    Slr,
    Sar,
}

/// The I-type storage family, dispatched on the 6-bit `opcode` field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StorageOp {
    Li,
    Lw,
    Sw,
}

/// The I-type branch family, dispatched on the 6-bit `opcode` field.
///
/// Only one mnemonic exists today; it is still modeled as a table entry rather than a
/// special case, since the opcode namespace it shares with `StorageOp` is built to hold more.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BranchOp {
    Beq,
}

const ARITHMETIC_TABLE: &[(&str, ArithmeticOp)] = &[
    ("ADD", ArithmeticOp::Add),
    ("SUB", ArithmeticOp::Sub),
    ("AND", ArithmeticOp::And),
    ("OR", ArithmeticOp::Or),
    ("NOR", ArithmeticOp::Nor),
    ("NAND", ArithmeticOp::Nand),
    ("SHL", ArithmeticOp::Shl),
    ("SLR", ArithmeticOp::Slr),
    ("SAR", ArithmeticOp::Sar),
];

// Opcode 0 is reserved for the R-type arithmetic family; storage and branch opcodes share
// the remaining non-zero codes of the same 6-bit namespace.
const STORAGE_TABLE: &[(&str, StorageOp)] = &[
    ("LI", StorageOp::Li),
    ("LW", StorageOp::Lw),
    ("SW", StorageOp::Sw),
];

const BRANCH_TABLE: &[(&str, BranchOp)] = &[("BEQ", BranchOp::Beq)];

#[derive(Debug)]
pub struct InstructionSetConfig {
    arithmetic_by_name: HashMap<&'static str, (u8, ArithmeticOp)>,
    arithmetic_by_code: HashMap<u8, (&'static str, ArithmeticOp)>,
    storage_by_name: HashMap<&'static str, (u8, StorageOp)>,
    storage_by_code: HashMap<u8, (&'static str, StorageOp)>,
    branch_by_name: HashMap<&'static str, (u8, BranchOp)>,
    branch_by_code: HashMap<u8, (&'static str, BranchOp)>,
}

impl InstructionSetConfig {
    /// Builds the standard Super32 table. There is exactly one such configuration today
    /// (unlike the original `instructionset.json`, nothing currently varies it per target),
    /// but it is still loaded once into an owned, immutable value rather than inlined as
    /// match arms, so a future alternate datapath can swap in a different table.
    pub fn standard() -> Self {
        let mut arithmetic_by_name = HashMap::new();
        let mut arithmetic_by_code = HashMap::new();
        for (code, (name, op)) in ARITHMETIC_TABLE.iter().enumerate() {
            let code = code as u8;
            arithmetic_by_name.insert(*name, (code, *op));
            arithmetic_by_code.insert(code, (*name, *op));
        }

        let mut storage_by_name = HashMap::new();
        let mut storage_by_code = HashMap::new();
        let mut branch_by_name = HashMap::new();
        let mut branch_by_code = HashMap::new();

        let mut next_opcode: u8 = 1;
        for (name, op) in STORAGE_TABLE.iter() {
            storage_by_name.insert(*name, (next_opcode, *op));
            storage_by_code.insert(next_opcode, (*name, *op));
            next_opcode += 1;
        }
        for (name, op) in BRANCH_TABLE.iter() {
            branch_by_name.insert(*name, (next_opcode, *op));
            branch_by_code.insert(next_opcode, (*name, *op));
            next_opcode += 1;
        }

        InstructionSetConfig {
            arithmetic_by_name,
            arithmetic_by_code,
            storage_by_name,
            storage_by_code,
            branch_by_name,
            branch_by_code,
        }
    }

    pub fn arithmetic_code(&self, mnemonic: &str) -> Option<u8> {
        self.arithmetic_by_name.get(mnemonic).map(|(code, _)| *code)
    }

    pub fn arithmetic_op(&self, funct: u8) -> Option<ArithmeticOp> {
        self.arithmetic_by_code.get(&funct).map(|(_, op)| *op)
    }

    pub fn storage_code(&self, mnemonic: &str) -> Option<u8> {
        self.storage_by_name.get(mnemonic).map(|(code, _)| *code)
    }

    pub fn storage_op(&self, opcode: u8) -> Option<StorageOp> {
        self.storage_by_code.get(&opcode).map(|(_, op)| *op)
    }

    pub fn branch_code(&self, mnemonic: &str) -> Option<u8> {
        self.branch_by_name.get(mnemonic).map(|(code, _)| *code)
    }

    pub fn branch_op(&self, opcode: u8) -> Option<BranchOp> {
        self.branch_by_code.get(&opcode).map(|(_, op)| *op)
    }

    pub fn is_arithmetic_mnemonic(&self, mnemonic: &str) -> bool {
        self.arithmetic_by_name.contains_key(mnemonic)
    }

    pub fn is_storage_mnemonic(&self, mnemonic: &str) -> bool {
        self.storage_by_name.contains_key(mnemonic)
    }

    pub fn is_branch_mnemonic(&self, mnemonic: &str) -> bool {
        self.branch_by_name.contains_key(mnemonic)
    }
}

impl Default for InstructionSetConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_display_and_parse_round_trip() {
        let r = RegisterId::new(17).unwrap();
        assert_eq!(r.to_string(), "R17");
        assert_eq!("R17".parse::<RegisterId>().unwrap(), r);
    }

    #[test]
    fn register_out_of_range_rejected() {
        assert!(RegisterId::new(32).is_none());
        assert!("R32".parse::<RegisterId>().is_err());
        assert!("ZERO".parse::<RegisterId>().is_err());
    }

    #[test]
    fn arithmetic_forward_and_reverse_agree() {
        let cfg = InstructionSetConfig::standard();
        let code = cfg.arithmetic_code("ADD").unwrap();
        assert_eq!(cfg.arithmetic_op(code), Some(ArithmeticOp::Add));
    }

    #[test]
    fn storage_and_branch_opcodes_are_disjoint_and_nonzero() {
        let cfg = InstructionSetConfig::standard();
        let li = cfg.storage_code("LI").unwrap();
        let lw = cfg.storage_code("LW").unwrap();
        let sw = cfg.storage_code("SW").unwrap();
        let beq = cfg.branch_code("BEQ").unwrap();
        let codes = [li, lw, sw, beq];
        assert!(codes.iter().all(|c| *c != 0));
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn always_equal_registers_are_30_and_31() {
        assert_eq!(RegisterId::ALWAYS_EQUAL_A.index(), 30);
        assert_eq!(RegisterId::ALWAYS_EQUAL_B.index(), 31);
    }
}
