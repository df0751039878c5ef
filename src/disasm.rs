use crate::asm::{Item, Operand, Program};
use crate::decoder::{Decoded, Decoder, TableDecoder};
use crate::instructions::{OpcodeTable, OperandKind};
use crate::memory::Image;

/// Renders one decoded byte in assembler syntax.
pub fn fmt_decoded(d: &Decoded, table: &OpcodeTable) -> String {
    let mn = table.by_op(d.op).map(|desc| desc.mnemonic).unwrap_or("???");
    match d.kind {
        OperandKind::None => mn.to_string(),
        OperandKind::Immediate | OperandKind::Address => format!("{} {}", mn, d.operand()),
    }
}

/// Disassembles a whole image, one line per address.
///
/// Bytes that are not a canonical instruction (unknown opcode, or a stray
/// operand on an operand-less opcode) are written as `.byte` so the listing
/// assembles back to the same image.
pub fn disassemble(image: &Image, table: &OpcodeTable) -> Vec<String> {
    let dec = TableDecoder::new(*table);
    image
        .iter()
        .map(|&raw| match dec.decode(raw) {
            Some(d) if d.kind != OperandKind::None || d.operand() == 0 => fmt_decoded(&d, table),
            _ => format!(".byte {}", raw),
        })
        .collect()
}

/// Human-readable dump of a parsed, unresolved program.
pub fn listing(program: &Program, table: &OpcodeTable) -> String {
    let mut s = String::from("Labels:\n");
    for (name, addr) in program.labels.iter() {
        s.push_str(&format!("\t{}:\t{}\n", addr, name));
    }
    s.push_str("--------------\nInstructions:\n");
    for item in &program.items {
        match item {
            Item::Instr(ins) => {
                let mn = table.by_op(ins.op).map(|desc| desc.mnemonic).unwrap_or("???");
                s.push_str(&format!("\t{:04b}\t{}", ins.opcode, mn));
                match &ins.operand {
                    Operand::None => {}
                    Operand::Literal(tok) => match tok.parse::<u8>() {
                        Ok(v) => s.push_str(&format!(" {:04b}", v)),
                        Err(_) => s.push_str(&format!(" {}", tok)),
                    },
                    Operand::Label(name) => s.push_str(&format!(" {}", name)),
                }
                s.push('\n');
            }
            Item::Byte { literal, .. } => s.push_str(&format!("\t.byte\t{}\n", literal)),
        }
    }
    s
}
