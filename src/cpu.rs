use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::decoder::{Decoder, TableDecoder};
use crate::exec::{Executor, IntExecutor};
use crate::memory::{Image, Memory};

pub const DEFAULT_MAX_STEPS: u64 = 1024;

/// Settings for a run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags: u8 {
const CARRY = 1 << 0; // unsigned overflow on ADD, borrow on SUB
const ZERO = 1 << 1;
}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    pub a: u8,
    pub b: u8,
    pub ir: u8,
    pub pc: u8, // 4 bits, wraps at 16
    pub mem: Memory,
    pub out: u8,
    pub halted: bool,
    pub flags: Flags,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    #[error("Invalid instruction byte {byte:#04x} at {pc:#x}")]
    InvalidOpcode { pc: u8, byte: u8 },
}

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Halted { steps: u64 },
    StepBudgetExhausted { steps: u64 },
}

impl RunOutcome {
    pub fn halted(&self) -> bool {
        matches!(self, RunOutcome::Halted { .. })
    }

    pub fn steps(&self) -> u64 {
        match *self {
            RunOutcome::Halted { steps } | RunOutcome::StepBudgetExhausted { steps } => steps,
        }
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image: &Image) -> Self {
        let mut cpu = Self::new();
        cpu.load(image);
        cpu
    }

    /// Installs `image` and clears every register and flag.
    pub fn load(&mut self, image: &Image) {
        *self = Self {
            mem: Memory::new(*image),
            ..Self::default()
        };
    }

    pub fn carry(&self) -> bool {
        self.flags.contains(Flags::CARRY)
    }

    pub fn zero(&self) -> bool {
        self.flags.contains(Flags::ZERO)
    }

    pub fn step(&mut self) -> Result<(), Trap> {
        self.step_with(&TableDecoder::default(), &IntExecutor)
    }

    pub fn step_with<D: Decoder, X: Executor>(&mut self, dec: &D, exec: &X) -> Result<(), Trap> {
        if self.halted {
            return Ok(());
        }
        let pc = self.pc;
        self.ir = self.mem.read(pc);
        let d = dec
            .decode(self.ir)
            .ok_or(Trap::InvalidOpcode { pc, byte: self.ir })?;
        trace!(pc, ir = self.ir, op = ?d.op, a = self.a, "step");
        // Jumps overwrite this.
        self.pc = pc.wrapping_add(1) & 0x0F;
        exec.exec(self, d);
        Ok(())
    }

    pub fn run(&mut self, max_steps: u64) -> Result<RunOutcome, Trap> {
        self.run_with(max_steps, &TableDecoder::default(), &IntExecutor)
    }

    pub fn run_with<D: Decoder, X: Executor>(
        &mut self,
        max_steps: u64,
        dec: &D,
        exec: &X,
    ) -> Result<RunOutcome, Trap> {
        let mut steps = 0u64;
        while !self.halted {
            if steps >= max_steps {
                debug!(steps, pc = self.pc, "step budget exhausted");
                return Ok(RunOutcome::StepBudgetExhausted { steps });
            }
            self.step_with(dec, exec)?;
            steps += 1;
        }
        debug!(steps, out = self.out, "halted");
        Ok(RunOutcome::Halted { steps })
    }
}
