// Arithmetic, logic, and comparison commands.
//
// Binary operators pop `y`, then compute `x OP y` in place of `x`, so the
// stack shrinks by one. Unary operators rewrite the top of the stack.

use crate::abi;
use crate::hack::{Comp, Dest, Instruction, Jump};
use crate::vm::ArithmeticOp;

use super::emitter::CodeWriter;
use super::labels::InternalLabel;

pub fn lower_arithmetic(w: &mut CodeWriter, op: ArithmeticOp) {
    match op {
        ArithmeticOp::Add => lower_binary(w, Comp::DPlusM),
        ArithmeticOp::Sub => lower_binary(w, Comp::MMinusD),
        ArithmeticOp::And => lower_binary(w, Comp::DAndM),
        ArithmeticOp::Or => lower_binary(w, Comp::DOrM),
        ArithmeticOp::Neg => lower_unary(w, Comp::NegM),
        ArithmeticOp::Not => lower_unary(w, Comp::NotM),
        ArithmeticOp::Eq => lower_equality(w),
        ArithmeticOp::Gt => lower_ordering(w, "GT", Jump::Jgt),
        ArithmeticOp::Lt => lower_ordering(w, "LT", Jump::Jlt),
    }
}

fn lower_binary(w: &mut CodeWriter, comp: Comp) {
    w.pop_d();
    w.emit_all([
        Instruction::assign(Dest::A, Comp::AMinusOne),
        Instruction::assign(Dest::M, comp),
    ]);
}

fn lower_unary(w: &mut CodeWriter, comp: Comp) {
    w.top_of_stack();
    w.emit(Instruction::assign(Dest::M, comp));
}

/// `x == y` as `x - y == 0`. Wrapping never turns a non-zero difference
/// into zero.
fn lower_equality(w: &mut CodeWriter) {
    let id = w.labels.next_id();
    let true_label = InternalLabel::CmpTrue("EQ").symbol(id);
    let end_label = InternalLabel::CmpEnd("EQ").symbol(id);

    w.pop_d();
    w.emit_all([
        Instruction::assign(Dest::A, Comp::AMinusOne),
        Instruction::assign(Dest::D, Comp::MMinusD),
        Instruction::at(&true_label),
        Instruction::jump(Comp::D, Jump::Jeq),
    ]);
    store_result(w, &true_label, &end_label);
}

/// `x > y` (`Jgt`) or `x < y` (`Jlt`). Operands of opposite sign are ordered
/// by the sign of `x`; only same-sign operands are subtracted, since their
/// difference always fits in 16 bits.
fn lower_ordering(w: &mut CodeWriter, name: &'static str, jump: Jump) {
    let id = w.labels.next_id();
    let true_label = InternalLabel::CmpTrue(name).symbol(id);
    let false_label = InternalLabel::CmpFalse(name).symbol(id);
    let end_label = InternalLabel::CmpEnd(name).symbol(id);
    let negative_label = InternalLabel::CmpNegative(name).symbol(id);
    let same_sign_label = InternalLabel::CmpSameSign(name).symbol(id);

    let (x_greater, x_less) = if jump == Jump::Jgt {
        (&true_label, &false_label)
    } else {
        (&false_label, &true_label)
    };

    // D = x; y stays readable at *SP after the pop.
    w.pop_d();
    w.emit_all([
        Instruction::assign(Dest::A, Comp::AMinusOne),
        Instruction::assign(Dest::D, Comp::M),
        Instruction::at(&negative_label),
        Instruction::jump(Comp::D, Jump::Jlt),
    ]);

    // x >= 0
    load_popped(w);
    w.emit_all([
        Instruction::at(&same_sign_label),
        Instruction::jump(Comp::D, Jump::Jge),
        Instruction::at(x_greater),
        Instruction::jump(Comp::Zero, Jump::Jmp),
        Instruction::label(&negative_label),
    ]);

    // x < 0
    load_popped(w);
    w.emit_all([
        Instruction::at(&same_sign_label),
        Instruction::jump(Comp::D, Jump::Jlt),
        Instruction::at(x_less),
        Instruction::jump(Comp::Zero, Jump::Jmp),
        Instruction::label(&same_sign_label),
    ]);

    load_popped(w);
    w.emit_all([
        Instruction::assign(Dest::A, Comp::AMinusOne),
        Instruction::assign(Dest::D, Comp::MMinusD),
        Instruction::at(&true_label),
        Instruction::jump(Comp::D, jump),
        Instruction::label(&false_label),
    ]);
    store_result(w, &true_label, &end_label);
}

/// `D = *SP`, the operand just popped; leaves `A` pointing at it.
fn load_popped(w: &mut CodeWriter) {
    w.emit_all([
        Instruction::at(abi::SP),
        Instruction::assign(Dest::A, Comp::M),
        Instruction::assign(Dest::D, Comp::M),
    ]);
}

/// Falls through to store 0; `true_label` stores -1 (all bits set).
fn store_result(w: &mut CodeWriter, true_label: &str, end_label: &str) {
    w.top_of_stack();
    w.emit_all([
        Instruction::assign(Dest::M, Comp::Zero),
        Instruction::at(end_label),
        Instruction::jump(Comp::Zero, Jump::Jmp),
        Instruction::label(true_label),
    ]);
    w.top_of_stack();
    w.emit_all([
        Instruction::assign(Dest::M, Comp::MinusOne),
        Instruction::label(end_label),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslateOptions;

    fn lowered(op: ArithmeticOp) -> Vec<String> {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Test");
        lower_arithmetic(&mut w, op);
        w.instructions.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_add_sequence() {
        assert_eq!(lowered(ArithmeticOp::Add), ["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"]);
    }

    #[test]
    fn test_sub_is_x_minus_y() {
        assert_eq!(lowered(ArithmeticOp::Sub).last().map(String::as_str), Some("M=M-D"));
    }

    #[test]
    fn test_unary_keeps_stack_pointer() {
        let asm = lowered(ArithmeticOp::Not);
        assert_eq!(asm, ["@SP", "A=M-1", "M=!M"]);
        assert!(!asm.iter().any(|l| l.starts_with("M=M+1") || l.contains("AM=M-1")));
    }

    #[test]
    fn test_comparison_uses_one_counter_value() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Test");
        lower_arithmetic(&mut w, ArithmeticOp::Lt);
        lower_arithmetic(&mut w, ArithmeticOp::Lt);
        assert_eq!(w.labels.issued(), 2);

        let labels: Vec<String> = w
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Label(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            [
                "LT_X_NEG$0",
                "LT_SAME_SIGN$0",
                "LT_FALSE$0",
                "LT_TRUE$0",
                "LT_END$0",
                "LT_X_NEG$1",
                "LT_SAME_SIGN$1",
                "LT_FALSE$1",
                "LT_TRUE$1",
                "LT_END$1",
            ]
        );
    }
}
