// Memory access commands: push and pop over the eight VM segments.
//
// | segment                     | address                        |
// |-----------------------------|--------------------------------|
// | constant                    | none, the index is the value   |
// | local/argument/this/that    | *(LCL/ARG/THIS/THAT) + index   |
// | temp                        | TEMP_BASE + index, index < 8   |
// | pointer                     | THIS (0) or THAT (1)           |
// | static                      | symbol `<namespace>.<index>`   |

use crate::hack::{Comp, Dest, Instruction};
use crate::vm::Segment;
use crate::{Result, abi};

use super::emitter::CodeWriter;
use super::labels::{InternalLabel, static_symbol};

/// Addressing rule for one segment access.
enum Addressing {
    /// `constant`: the index is the value.
    Immediate,
    /// Base pointer register plus index.
    Indirect(&'static str),
    /// Fixed cell: a temp word, a pointer register, or a static symbol.
    Cell(Instruction),
}

fn addressing(w: &CodeWriter, segment: Segment, index: u16) -> Result<Addressing> {
    match segment {
        Segment::Constant => Ok(Addressing::Immediate),
        Segment::Local => Ok(Addressing::Indirect(abi::LCL)),
        Segment::Argument => Ok(Addressing::Indirect(abi::ARG)),
        Segment::This => Ok(Addressing::Indirect(abi::THIS)),
        Segment::That => Ok(Addressing::Indirect(abi::THAT)),
        Segment::Temp => abi::temp_addr(index)
            .map(|addr| Addressing::Cell(Instruction::at_literal(addr)))
            .ok_or_else(|| {
                w.out_of_range(format!(
                    "temp index {index} outside 0..={}",
                    abi::TEMP_SIZE - 1
                ))
            }),
        Segment::Pointer => abi::pointer_register(index)
            .map(|reg| Addressing::Cell(Instruction::at(reg)))
            .ok_or_else(|| w.out_of_range(format!("pointer index {index} is not 0 or 1"))),
        Segment::Static => Ok(Addressing::Cell(Instruction::at(static_symbol(
            &w.static_namespace,
            index,
        )))),
    }
}

pub fn lower_push(w: &mut CodeWriter, segment: Segment, index: u16) -> Result<()> {
    match addressing(w, segment, index)? {
        Addressing::Immediate => {
            w.emit_all([
                Instruction::at_literal(index),
                Instruction::assign(Dest::D, Comp::A),
            ]);
        }
        Addressing::Indirect(base) => {
            w.emit_all([
                Instruction::at(base),
                Instruction::assign(Dest::D, Comp::M),
                Instruction::at_literal(index),
                Instruction::assign(Dest::A, Comp::DPlusA),
                Instruction::assign(Dest::D, Comp::M),
            ]);
        }
        Addressing::Cell(at) => {
            w.emit_all([at, Instruction::assign(Dest::D, Comp::M)]);
        }
    }
    w.push_d();
    Ok(())
}

pub fn lower_pop(w: &mut CodeWriter, segment: Segment, index: u16) -> Result<()> {
    match addressing(w, segment, index)? {
        Addressing::Immediate => Err(w.invalid_operation("cannot pop into the constant segment")),
        Addressing::Indirect(base) => {
            // The destination is computed before SP is touched, so it needs a
            // cell of its own: D is about to hold the popped value.
            let addr_cell = w.next_label(InternalLabel::PopAddr);
            w.emit_all([
                Instruction::at(base),
                Instruction::assign(Dest::D, Comp::M),
                Instruction::at_literal(index),
                Instruction::assign(Dest::D, Comp::DPlusA),
                Instruction::at(addr_cell.clone()),
                Instruction::assign(Dest::M, Comp::D),
            ]);
            w.pop_d();
            w.emit_all([
                Instruction::at(addr_cell),
                Instruction::assign(Dest::A, Comp::M),
                Instruction::assign(Dest::M, Comp::D),
            ]);
            Ok(())
        }
        Addressing::Cell(at) => {
            w.pop_d();
            w.emit_all([at, Instruction::assign(Dest::M, Comp::D)]);
            Ok(())
        }
    }
}
