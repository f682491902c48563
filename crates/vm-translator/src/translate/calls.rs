// Function protocol: function entry, call, return, and the bootstrap.
//
// Frame pushed by a call, on top of the arguments:
//
//   ARG -> arg 0
//          ...
//          arg n-1
//          return address
//          saved LCL
//          saved ARG
//          saved THIS
//          saved THAT
//   LCL -> local 0            (callee)
//
// Return restores everything relative to a snapshot of LCL taken on entry,
// since LCL itself is the last register it overwrites.

use crate::hack::{Comp, Dest, Instruction, Jump};
use crate::vm::Segment;
use crate::{Result, abi};

use super::control_flow::LabelScope;
use super::emitter::CodeWriter;
use super::labels::InternalLabel;
use super::memory;

/// Unit prefix of a function name: `Main.fibonacci` -> `Main`.
#[must_use]
pub fn unit_prefix(function: &str) -> &str {
    function.split('.').next().unwrap_or(function)
}

/// `function name n_locals`
///
/// Statics are re-namespaced from the function's prefix. This assumes a
/// unit's statics are only used by functions declared in that unit.
pub fn lower_function(w: &mut CodeWriter, name: &str, n_locals: u16) -> Result<()> {
    w.close_scope()?;
    w.scope = LabelScope::new(name.to_string());

    let namespace = unit_prefix(name);
    if namespace != w.unit {
        tracing::warn!(
            pos = %w.origin.pos,
            function = name,
            unit = %w.unit,
            namespace,
            "function prefix differs from its unit; statics follow the prefix"
        );
    }
    w.static_namespace = namespace.to_string();

    w.emit(Instruction::label(name));
    for _ in 0..n_locals {
        memory::lower_push(w, Segment::Constant, 0)?;
    }
    Ok(())
}

/// `call name n_args`
pub fn lower_call(w: &mut CodeWriter, name: &str, n_args: u16) -> Result<()> {
    let arg_offset = n_args
        .checked_add(abi::FRAME_SIZE)
        .filter(|&offset| offset <= abi::MAX_LITERAL)
        .ok_or_else(|| w.out_of_range(format!("{n_args} arguments do not fit a call frame")))?;

    let return_label = w.next_label(InternalLabel::ReturnAddress);

    // push return address
    w.emit_all([
        Instruction::at(return_label.clone()),
        Instruction::assign(Dest::D, Comp::A),
    ]);
    w.push_d();

    // push LCL, ARG, THIS, THAT
    for reg in abi::SAVED_POINTERS {
        w.emit_all([Instruction::at(reg), Instruction::assign(Dest::D, Comp::M)]);
        w.push_d();
    }

    // ARG = SP - n_args - 5
    w.emit_all([
        Instruction::at(abi::SP),
        Instruction::assign(Dest::D, Comp::M),
        Instruction::at_literal(arg_offset),
        Instruction::assign(Dest::D, Comp::DMinusA),
        Instruction::at(abi::ARG),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    // LCL = SP
    w.emit_all([
        Instruction::at(abi::SP),
        Instruction::assign(Dest::D, Comp::M),
        Instruction::at(abi::LCL),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    w.emit_all([
        Instruction::at(name),
        Instruction::jump(Comp::Zero, Jump::Jmp),
        Instruction::label(return_label),
    ]);
    Ok(())
}

/// `return`
pub fn lower_return(w: &mut CodeWriter) {
    let id = w.labels.next_id();
    let frame = InternalLabel::Frame.symbol(id);
    let ret = InternalLabel::Ret.symbol(id);

    // FRAME = LCL
    w.emit_all([
        Instruction::at(abi::LCL),
        Instruction::assign(Dest::D, Comp::M),
        Instruction::at(frame.clone()),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    // RET = *(FRAME - 5); read before the return value can overwrite it
    // (with zero arguments *ARG is the return address slot).
    w.emit_all([
        Instruction::at_literal(abi::FRAME_SIZE),
        Instruction::assign(Dest::A, Comp::DMinusA),
        Instruction::assign(Dest::D, Comp::M),
        Instruction::at(ret.clone()),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    // *ARG = pop()
    w.pop_d();
    w.emit_all([
        Instruction::at(abi::ARG),
        Instruction::assign(Dest::A, Comp::M),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    // SP = ARG + 1
    w.emit_all([
        Instruction::at(abi::ARG),
        Instruction::assign(Dest::D, Comp::MPlusOne),
        Instruction::at(abi::SP),
        Instruction::assign(Dest::M, Comp::D),
    ]);

    // THAT, THIS, ARG, LCL = *(FRAME - 1..=4)
    for (offset, reg) in (1..).zip(abi::SAVED_POINTERS.iter().rev()) {
        w.emit_all([
            Instruction::at(frame.clone()),
            Instruction::assign(Dest::D, Comp::M),
            Instruction::at_literal(offset),
            Instruction::assign(Dest::A, Comp::DMinusA),
            Instruction::assign(Dest::D, Comp::M),
            Instruction::at(*reg),
            Instruction::assign(Dest::M, Comp::D),
        ]);
    }

    // goto RET
    w.emit_all([
        Instruction::at(ret),
        Instruction::assign(Dest::A, Comp::M),
        Instruction::jump(Comp::Zero, Jump::Jmp),
    ]);
}

/// `SP = stack_base; call entry 0`
pub fn lower_bootstrap(w: &mut CodeWriter) -> Result<()> {
    let stack_base = w.options.stack_base;
    let entry = w.options.entry_function.clone();

    if w.options.annotate {
        w.emit(Instruction::comment(format!("bootstrap: SP = {stack_base}")));
    }
    w.emit_all([
        Instruction::at_literal(stack_base),
        Instruction::assign(Dest::D, Comp::A),
        Instruction::at(abi::SP),
        Instruction::assign(Dest::M, Comp::D),
    ]);
    if w.options.annotate {
        w.emit(Instruction::comment(format!("call {entry} 0")));
    }
    lower_call(w, &entry, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslateOptions;

    fn asm(w: &CodeWriter) -> Vec<String> {
        w.instructions.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unit_prefix() {
        assert_eq!(unit_prefix("Main.fibonacci"), "Main");
        assert_eq!(unit_prefix("Sys.init"), "Sys");
        assert_eq!(unit_prefix("loose"), "loose");
    }

    #[test]
    fn test_function_zero_inits_locals_and_sets_namespace() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Class1");
        lower_function(&mut w, "Class1.set", 2).unwrap();
        assert_eq!(w.static_namespace, "Class1");

        let asm = asm(&w);
        assert_eq!(asm[0], "(Class1.set)");
        assert_eq!(asm.iter().filter(|l| *l == "@0").count(), 2);
    }

    #[test]
    fn test_call_pushes_frame_in_order() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Main");
        lower_call(&mut w, "Math.max", 2).unwrap();

        let asm = asm(&w);
        let saved: Vec<&str> = asm
            .iter()
            .filter(|l| matches!(l.as_str(), "@LCL" | "@ARG" | "@THIS" | "@THAT"))
            .map(String::as_str)
            .take(4)
            .collect();
        assert_eq!(saved, ["@LCL", "@ARG", "@THIS", "@THAT"]);
        assert!(asm.contains(&"@7".to_string()), "ARG = SP - 2 - 5");
        assert_eq!(asm[0], "@RETURN_ADDRESS$0");
        assert_eq!(asm.last().map(String::as_str), Some("(RETURN_ADDRESS$0)"));
    }

    #[test]
    fn test_return_restores_from_frame_snapshot() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Main");
        lower_return(&mut w);

        let asm = asm(&w);
        let restored: Vec<&str> = asm
            .windows(2)
            .filter(|pair| pair[1] == "M=D")
            .map(|pair| pair[0].as_str())
            .filter(|l| matches!(*l, "@LCL" | "@ARG" | "@THIS" | "@THAT"))
            .collect();
        assert_eq!(restored, ["@THAT", "@THIS", "@ARG", "@LCL"]);
        // Every restore reads the snapshot, never LCL directly.
        assert_eq!(asm.iter().filter(|l| *l == "@LCL").count(), 2);
        assert_eq!(asm.iter().filter(|l| *l == "@FRAME$0").count(), 5);
    }

    #[test]
    fn test_bootstrap_sets_stack_and_calls_entry() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        let asm: Vec<String> = w.write_init().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(&asm[..4], ["@256", "D=A", "@SP", "M=D"]);
        assert!(asm.contains(&"@Sys.init".to_string()));
    }
}
