use crate::cpu::{Cpu, Flags};
use crate::decoder::{Decoded, Op};

pub trait Executor {
    fn exec(&self, cpu: &mut Cpu, d: Decoded);
}

pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec(&self, cpu: &mut Cpu, d: Decoded) {
        let operand = d.operand();
        match d.op {
            Op::Nop => {}
            Op::Lda => {
                cpu.a = cpu.mem.read(operand);
            }
            Op::Add => {
                let (res, carry) = cpu.a.overflowing_add(cpu.mem.read(operand));
                cpu.a = res;
                cpu.flags.set(Flags::CARRY, carry);
                cpu.flags.set(Flags::ZERO, res == 0);
            }
            Op::Sub => {
                let (res, borrow) = cpu.a.overflowing_sub(cpu.mem.read(operand));
                cpu.a = res;
                cpu.flags.set(Flags::CARRY, borrow);
                cpu.flags.set(Flags::ZERO, res == 0);
            }
            Op::Sta => {
                cpu.mem.write(operand, cpu.a);
            }
            Op::Ldi => {
                cpu.a = operand;
            }
            Op::Out => {
                cpu.out = cpu.a;
            }
            // pc was already advanced by fetch; a taken jump replaces it
            Op::Jmp => {
                cpu.pc = operand;
            }
            Op::Jc => {
                if cpu.flags.contains(Flags::CARRY) {
                    cpu.pc = operand;
                }
            }
            Op::Hlt => {
                cpu.halted = true;
            }
        }
    }
}
