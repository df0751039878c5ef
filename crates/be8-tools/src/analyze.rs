use std::collections::{BTreeSet, VecDeque};
use serde::Serialize;

use be8_rs::decoder::{Decoder, Op, TableDecoder};
use be8_rs::memory::Image;
use be8_rs::OpcodeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeOut { pub from: u8, pub to: u8, pub kind: EdgeKind }

/// Static control flow from address 0. Self-modifying code (STA into the
/// program) is not followed; the report describes the image as loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub reachable: Vec<u8>,
    pub edges: Vec<EdgeOut>,
    pub halts: Vec<u8>,
    pub invalid: Vec<u8>,
}

impl Report {
    /// False when no path from the entry reaches HLT, i.e. the program can only
    /// stop by running out of step budget (or on an invalid byte).
    pub fn can_halt(&self) -> bool {
        !self.halts.is_empty()
    }
}

pub fn analyze(img: &Image, table: &OpcodeTable) -> Report {
    let dec = TableDecoder::new(*table);
    let mut queue: VecDeque<u8> = VecDeque::from([0u8]);
    let mut visited: BTreeSet<u8> = BTreeSet::new();
    let mut edges: Vec<EdgeOut> = Vec::new();
    let mut halts = Vec::new();
    let mut invalid = Vec::new();
    while let Some(pc) = queue.pop_front() {
        if !visited.insert(pc) { continue; }
        let raw = img[usize::from(pc)];
        let Some(d) = dec.decode(raw) else { invalid.push(pc); continue; };
        let ft = (pc + 1) & 0x0F;
        let mut follow = |to: u8, kind: EdgeKind| {
            edges.push(EdgeOut { from: pc, to, kind });
            queue.push_back(to);
        };
        match d.op {
            Op::Hlt => halts.push(pc),
            Op::Jmp => follow(d.operand(), EdgeKind::Branch),
            Op::Jc => {
                follow(d.operand(), EdgeKind::CondBranch);
                follow(ft, EdgeKind::Fallthrough);
            }
            _ => follow(ft, EdgeKind::Fallthrough),
        }
    }
    Report { reachable: visited.into_iter().collect(), edges, halts, invalid }
}
