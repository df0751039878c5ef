use pretty_assertions::assert_eq;

use be8_rs::decoder::{Decoder, Op, TableDecoder};
use be8_rs::disasm::{disassemble, fmt_decoded, listing};
use be8_rs::instructions::{InstrDesc, OperandKind, TableError, TABLE};
use be8_rs::{assemble, Assembler, OpcodeTable};

#[test]
fn default_table_is_consistent() {
    let table = OpcodeTable::default();
    table.validate().unwrap();
    assert_eq!(table.entries().len(), 10);
    let expected = [
        ("NOP", 0x0), ("LDA", 0x1), ("ADD", 0x2), ("SUB", 0x3), ("STA", 0x4),
        ("OUT", 0x5), ("JMP", 0x6), ("LDI", 0x7), ("JC", 0x8), ("HLT", 0xF),
    ];
    for (mn, opcode) in expected {
        assert_eq!(table.by_mnemonic(mn).unwrap().opcode, opcode, "{mn}");
    }
}

#[test]
fn conflicting_tables_are_rejected() {
    static DUP: &[InstrDesc] = &[
        InstrDesc { op: Op::Out, mnemonic: "OUT", opcode: 0x5, kind: OperandKind::None },
        InstrDesc { op: Op::Ldi, mnemonic: "LDI", opcode: 0x5, kind: OperandKind::Immediate },
    ];
    assert_eq!(
        OpcodeTable::new(DUP).unwrap_err(),
        TableError::DuplicateOpcode { opcode: 0x5, first: "OUT", second: "LDI" }
    );

    static WIDE: &[InstrDesc] = &[
        InstrDesc { op: Op::Hlt, mnemonic: "HLT", opcode: 0x1F, kind: OperandKind::None },
    ];
    assert!(matches!(OpcodeTable::new(WIDE), Err(TableError::OpcodeTooWide { .. })));
}

#[test]
fn encoder_and_decoder_agree_on_every_mnemonic() {
    let asm = Assembler::default();
    let dec = TableDecoder::new(*asm.table());
    for desc in TABLE {
        let src = match desc.kind {
            OperandKind::None => desc.mnemonic.to_string(),
            _ => format!("{} 7", desc.mnemonic),
        };
        let out = asm.assemble(&src).unwrap();
        let d = dec.decode(out.image[0]).unwrap();
        assert_eq!(d.op, desc.op, "{src}");
        assert_eq!(d.opcode(), desc.opcode);
        assert_eq!(fmt_decoded(&d, asm.table()), src);
    }
}

#[test]
fn assemble_then_disassemble_recovers_source() {
    let src = "LDA 4\nADD 5\nOUT\nHLT\n.byte 14\n.byte 28";
    let out = assemble(src).unwrap();
    let lines = disassemble(&out.image, &OpcodeTable::default());
    assert_eq!(&lines[..4], &["LDA 4", "ADD 5", "OUT", "HLT"]);
    // NOP 14 would not assemble back to 0x0E, so data stays data
    assert_eq!(lines[4], ".byte 14");
    assert_eq!(lines[5], "LDA 12");
    assert_eq!(lines[6], "NOP");
}

#[test]
fn disassembly_reassembles_to_identical_image() {
    let images: [[u8; 16]; 3] = [
        [0x14, 0x25, 0x50, 0xF0, 0x0E, 0x1C, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0x9A, 0xAB, 0xBC, 0xCD, 0xDE, 0xE0, 0xFF, 0x51, 0x8F, 0x7F, 0x60, 0x4F, 0x3E, 0x2D, 0x1C, 0x00],
        [0xFF; 16],
    ];
    for img in images {
        let text = disassemble(&img, &OpcodeTable::default()).join("\n");
        assert_eq!(assemble(&text).unwrap().image, img, "{text}");
    }
}

#[test]
fn listing_shows_labels_and_unresolved_operands() {
    let asm = Assembler::default();
    let prog = asm.parse("start: LDI 5\nJMP start\nv: .byte 3").unwrap();
    let text = listing(&prog, asm.table());
    assert!(text.starts_with("Labels:\n"));
    assert!(text.contains("\t0:\tstart\n"));
    assert!(text.contains("\t2:\tv\n"));
    assert!(text.contains("\t0111\tLDI 0101\n"));
    assert!(text.contains("\t0110\tJMP start\n"));
    assert!(text.contains("\t.byte\t3\n"));
}
