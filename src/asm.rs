//! Two-pass assembler for BE-8 source text.
//!
//! Source is line oriented: `;` starts a comment, tokens are separated by
//! whitespace, mnemonics are case-insensitive and a token ending in `:`
//! defines a label at the current address. Every instruction occupies one
//! byte, so a label's address is the number of bytes emitted before it.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::decoder::Op;
use crate::instructions::{OpcodeTable, OperandKind};
use crate::memory::{Image, MEM_SIZE};

pub const COMMENT: char = ';';
pub const BYTE_DIRECTIVE: &str = ".byte";

const MAX_NIBBLE: u32 = 0x0F;
const MAX_BYTE: u32 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    /// Decimal digits as written; the range is checked when resolving.
    Literal(String),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub opcode: u8,
    pub kind: OperandKind,
    pub operand: Operand,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Instr(Instruction),
    Byte { literal: String, line: usize },
}

impl Item {
    pub fn line(&self) -> usize {
        match self {
            Item::Instr(ins) => ins.line,
            Item::Byte { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LabelDef {
    addr: usize,
    line: usize,
}

/// Label name to address. A name may be defined only once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    defs: BTreeMap<String, LabelDef>,
}

impl LabelTable {
    pub fn define(&mut self, name: &str, addr: usize, line: usize) -> Result<(), ErrorKind> {
        if let Some(prev) = self.defs.get(name) {
            return Err(ErrorKind::DuplicateLabel {
                name: name.to_string(),
                first_line: prev.line,
            });
        }
        self.defs.insert(name.to_string(), LabelDef { addr, line });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.defs.get(name).map(|d| d.addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.defs.iter().map(|(k, d)| (k.as_str(), d.addr))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid literal `{0}`: expected decimal digits")]
    InvalidLiteral(String),
    #[error("operand `{value}` out of range 0..={max}")]
    OperandOutOfRange { value: String, max: u32 },
    #[error("invalid label name `{0}`")]
    InvalidLabelName(String),
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),
    #[error("label `{name}` already defined on line {first_line}")]
    DuplicateLabel { name: String, first_line: usize },
    #[error("program does not fit in {max} bytes")]
    ProgramTooLarge { max: usize },
    #[error("unknown token `{0}`")]
    UnknownToken(String),
    #[error("`{0}` expects an operand")]
    MissingOperand(String),
}

/// An assembly failure, tagged with the 1-based source line it was found on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: ErrorKind,
}

impl AsmError {
    fn at(line: usize) -> impl FnOnce(ErrorKind) -> AsmError {
        move |kind| AsmError { line, kind }
    }
}

/// Output of the parse pass: items in address order plus every label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub items: Vec<Item>,
    pub labels: LabelTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub image: Image,
    /// Bytes actually emitted; the rest of the image is zero.
    pub len: usize,
    pub labels: BTreeMap<String, u8>,
}

impl Assembled {
    pub fn bytes(&self) -> &[u8] {
        &self.image[..self.len]
    }
}

impl fmt::Display for Assembled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.image.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Strips the comment and splits what is left on whitespace.
pub fn tokenize_line(line: &str) -> Vec<&str> {
    let code = match line.find(COMMENT) {
        Some(p) => &line[..p],
        None => line,
    };
    code.split_whitespace().collect()
}

pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Checks that `tok` is a decimal literal; its range is left to [`Program::encode`].
fn classify_literal(tok: &str) -> Result<Operand, ErrorKind> {
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::InvalidLiteral(tok.to_string()));
    }
    Ok(Operand::Literal(tok.to_string()))
}

fn classify_address(tok: &str) -> Result<Operand, ErrorKind> {
    if tok.starts_with(|c: char| c.is_ascii_digit()) {
        classify_literal(tok)
    } else if is_valid_label_name(tok) {
        Ok(Operand::Label(tok.to_string()))
    } else {
        Err(ErrorKind::InvalidLabelName(tok.to_string()))
    }
}

fn literal_value(tok: &str, max: u32) -> Result<u8, ErrorKind> {
    match tok.parse::<u32>() {
        Ok(v) if v <= max => Ok(v as u8),
        _ => Err(ErrorKind::OperandOutOfRange {
            value: tok.to_string(),
            max,
        }),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    table: OpcodeTable,
}

impl Assembler {
    pub fn new(table: OpcodeTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    /// Source text to machine image, or the error on the first failing line.
    pub fn assemble(&self, src: &str) -> Result<Assembled, AsmError> {
        let (prog, parse_err) = self.parse_lines(src);
        match parse_err {
            None => prog.encode(),
            // A reference on an earlier line may fail to resolve; that line wins.
            Some(err) => Err(prog.first_unresolved(err.line).unwrap_or(err)),
        }
    }

    /// Parse pass: builds the item list and the label table. Label references
    /// and literal ranges stay unchecked until [`Program::encode`].
    pub fn parse(&self, src: &str) -> Result<Program, AsmError> {
        match self.parse_lines(src) {
            (prog, None) => Ok(prog),
            (_, Some(err)) => Err(err),
        }
    }

    /// Keeps going after the first bad line so the label table is complete.
    fn parse_lines(&self, src: &str) -> (Program, Option<AsmError>) {
        let mut prog = Program::default();
        let mut first_err = None;
        for (idx, text) in src.lines().enumerate() {
            let line = idx + 1;
            if let Err(kind) = self.parse_line(&mut prog, &tokenize_line(text), line) {
                if first_err.is_none() {
                    first_err = Some(AsmError { line, kind });
                }
            }
        }
        debug!(
            items = prog.items.len(),
            labels = prog.labels.len(),
            failed = first_err.is_some(),
            "parsed program"
        );
        (prog, first_err)
    }

    fn parse_line(&self, prog: &mut Program, tokens: &[&str], line: usize) -> Result<(), ErrorKind> {
        let mut toks = tokens.iter().copied();
        while let Some(tok) = toks.next() {
            trace!(line, tok, "token");
            if let Some(desc) = self.table.by_mnemonic(tok) {
                let mut operand_tok = || {
                    toks.next()
                        .ok_or_else(|| ErrorKind::MissingOperand(desc.mnemonic.to_string()))
                };
                let operand = match desc.kind {
                    OperandKind::None => Operand::None,
                    OperandKind::Immediate => classify_literal(operand_tok()?)?,
                    OperandKind::Address => classify_address(operand_tok()?)?,
                };
                push(
                    prog,
                    Item::Instr(Instruction {
                        op: desc.op,
                        opcode: desc.opcode,
                        kind: desc.kind,
                        operand,
                        line,
                    }),
                )?;
            } else if tok.eq_ignore_ascii_case(BYTE_DIRECTIVE) {
                let value_tok = toks
                    .next()
                    .ok_or_else(|| ErrorKind::MissingOperand(BYTE_DIRECTIVE.to_string()))?;
                classify_literal(value_tok)?;
                push(
                    prog,
                    Item::Byte {
                        literal: value_tok.to_string(),
                        line,
                    },
                )?;
            } else if let Some(name) = tok.strip_suffix(':').filter(|n| !n.is_empty()) {
                if !is_valid_label_name(name) {
                    return Err(ErrorKind::InvalidLabelName(name.to_string()));
                }
                prog.labels.define(name, prog.items.len(), line)?;
            } else {
                return Err(ErrorKind::UnknownToken(tok.to_string()));
            }
        }
        Ok(())
    }
}

fn push(prog: &mut Program, item: Item) -> Result<(), ErrorKind> {
    if prog.items.len() >= MEM_SIZE {
        return Err(ErrorKind::ProgramTooLarge { max: MEM_SIZE });
    }
    prog.items.push(item);
    Ok(())
}

impl Program {
    /// Resolution pass: checks literal ranges, substitutes label addresses and
    /// packs each item into one byte, starting at address 0. The first item in
    /// address order that fails is reported.
    pub fn encode(&self) -> Result<Assembled, AsmError> {
        if self.items.len() > MEM_SIZE {
            let line = self.items[MEM_SIZE].line();
            return Err(AsmError {
                line,
                kind: ErrorKind::ProgramTooLarge { max: MEM_SIZE },
            });
        }
        let mut image = [0u8; MEM_SIZE];
        for (addr, item) in self.items.iter().enumerate() {
            image[addr] = self.resolve_item(item).map_err(AsmError::at(item.line()))?;
        }
        let mut labels = BTreeMap::new();
        for (name, addr) in self.labels.iter() {
            // A trailing label may point one past the end; it is only an
            // error if something refers to it.
            if addr < MEM_SIZE {
                labels.insert(name.to_string(), addr as u8);
            }
        }
        Ok(Assembled {
            image,
            len: self.items.len(),
            labels,
        })
    }

    /// First item on a line before `line` that fails to resolve.
    fn first_unresolved(&self, line: usize) -> Option<AsmError> {
        self.items
            .iter()
            .take_while(|item| item.line() < line)
            .find_map(|item| self.resolve_item(item).err().map(AsmError::at(item.line())))
    }

    fn resolve_item(&self, item: &Item) -> Result<u8, ErrorKind> {
        match item {
            Item::Byte { literal, .. } => literal_value(literal, MAX_BYTE),
            Item::Instr(ins) => Ok((ins.opcode << 4) | self.resolve(&ins.operand)?),
        }
    }

    fn resolve(&self, operand: &Operand) -> Result<u8, ErrorKind> {
        match operand {
            Operand::None => Ok(0),
            Operand::Literal(tok) => literal_value(tok, MAX_NIBBLE),
            Operand::Label(name) => {
                let addr = self
                    .labels
                    .get(name)
                    .ok_or_else(|| ErrorKind::UndefinedLabel(name.clone()))?;
                if addr > MAX_NIBBLE as usize {
                    return Err(ErrorKind::OperandOutOfRange {
                        value: format!("{} ({})", name, addr),
                        max: MAX_NIBBLE,
                    });
                }
                Ok(addr as u8)
            }
        }
    }
}

/// Assembles with the default opcode table.
pub fn assemble(src: &str) -> Result<Assembled, AsmError> {
    Assembler::default().assemble(src)
}
