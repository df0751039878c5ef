use serde::{Deserialize, Serialize};

use crate::decoder::Op;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandKind {
    /// No operand; the low nibble is encoded as 0.
    None,
    /// 4-bit literal, 0..=15.
    Immediate,
    /// Memory address 0..=15, written as a literal or a label.
    Address,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub kind: OperandKind,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc {
        op: Op::Nop,
        mnemonic: "NOP",
        opcode: 0x0,
        kind: OperandKind::None,
    },
    InstrDesc {
        op: Op::Lda,
        mnemonic: "LDA",
        opcode: 0x1,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Add,
        mnemonic: "ADD",
        opcode: 0x2,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Sub,
        mnemonic: "SUB",
        opcode: 0x3,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Sta,
        mnemonic: "STA",
        opcode: 0x4,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Out,
        mnemonic: "OUT",
        opcode: 0x5,
        kind: OperandKind::None,
    },
    InstrDesc {
        op: Op::Jmp,
        mnemonic: "JMP",
        opcode: 0x6,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Ldi,
        mnemonic: "LDI",
        opcode: 0x7,
        kind: OperandKind::Immediate,
    },
    InstrDesc {
        op: Op::Jc,
        mnemonic: "JC",
        opcode: 0x8,
        kind: OperandKind::Address,
    },
    InstrDesc {
        op: Op::Hlt,
        mnemonic: "HLT",
        opcode: 0xF,
        kind: OperandKind::None,
    },
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("opcode {opcode:#x} of {mnemonic} does not fit in 4 bits")]
    OpcodeTooWide { mnemonic: &'static str, opcode: u8 },
    #[error("opcode {opcode:#x} is assigned to both {first} and {second}")]
    DuplicateOpcode {
        opcode: u8,
        first: &'static str,
        second: &'static str,
    },
    #[error("mnemonic {0} appears more than once")]
    DuplicateMnemonic(&'static str),
    #[error("{0:?} appears more than once")]
    DuplicateOp(Op),
}

/// The one mapping between mnemonics, opcode nibbles and operand kinds.
///
/// Both the assembler and the decoder are built from a value of this type, so
/// the bit pattern an instruction is encoded with is always the one it is
/// decoded from.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeTable {
    entries: &'static [InstrDesc],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self { entries: TABLE }
    }
}

impl OpcodeTable {
    pub fn new(entries: &'static [InstrDesc]) -> Result<Self, TableError> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    pub fn entries(&self) -> &'static [InstrDesc] {
        self.entries
    }

    /// Case-insensitive mnemonic lookup.
    pub fn by_mnemonic(&self, name: &str) -> Option<&'static InstrDesc> {
        self.entries
            .iter()
            .find(|d| d.mnemonic.eq_ignore_ascii_case(name))
    }

    pub fn by_opcode(&self, opcode: u8) -> Option<&'static InstrDesc> {
        self.entries.iter().find(|d| d.opcode == opcode)
    }

    pub fn by_op(&self, op: Op) -> Option<&'static InstrDesc> {
        self.entries.iter().find(|d| d.op == op)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        for (i, d) in self.entries.iter().enumerate() {
            if d.opcode > 0xF {
                return Err(TableError::OpcodeTooWide {
                    mnemonic: d.mnemonic,
                    opcode: d.opcode,
                });
            }
            for e in &self.entries[..i] {
                if e.opcode == d.opcode {
                    return Err(TableError::DuplicateOpcode {
                        opcode: d.opcode,
                        first: e.mnemonic,
                        second: d.mnemonic,
                    });
                }
                if e.mnemonic.eq_ignore_ascii_case(d.mnemonic) {
                    return Err(TableError::DuplicateMnemonic(d.mnemonic));
                }
                if e.op == d.op {
                    return Err(TableError::DuplicateOp(d.op));
                }
            }
        }
        Ok(())
    }
}
