use serde::{Deserialize, Serialize};

use crate::instructions::{OpcodeTable, OperandKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Nop,
    Lda,
    Add,
    Sub,
    Sta,
    Out,
    Jmp,
    Ldi,
    Jc,
    Hlt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    pub kind: OperandKind,
    pub raw: u8,
}

impl Decoded {
    /// High nibble.
    pub fn opcode(&self) -> u8 {
        self.raw >> 4
    }

    /// Low nibble: an address, a literal or unused, depending on `kind`.
    pub fn operand(&self) -> u8 {
        self.raw & 0x0F
    }
}

pub trait Decoder {
    fn decode(&self, raw: u8) -> Option<Decoded>;
}

/// Decoder driven by an [`OpcodeTable`]; only opcodes present in the table decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDecoder {
    table: OpcodeTable,
}

impl TableDecoder {
    pub fn new(table: OpcodeTable) -> Self {
        Self { table }
    }
}

impl Decoder for TableDecoder {
    fn decode(&self, raw: u8) -> Option<Decoded> {
        let desc = self.table.by_opcode(raw >> 4)?;
        Some(Decoded {
            op: desc.op,
            kind: desc.kind,
            raw,
        })
    }
}
