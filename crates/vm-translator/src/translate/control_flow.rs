// Branching commands: label, goto, if-goto.
//
// User labels are emitted as `scope$name`, where the scope is the enclosing
// function (or the unit name for code before the first function).

use std::collections::HashSet;

use crate::error::SourcePos;
use crate::hack::{Comp, Instruction, Jump};
use crate::{Error, Result};

use super::emitter::CodeWriter;
use super::labels::scoped_label;

/// Labels declared and referenced within one function.
#[derive(Debug)]
pub struct LabelScope {
    name: String,
    declared: HashSet<String>,
    /// First reference of each label, in source order.
    referenced: Vec<(String, SourcePos)>,
}

impl LabelScope {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            declared: HashSet::new(),
            referenced: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a declaration. Returns `false` if the label was already declared.
    pub fn declare(&mut self, label: &str) -> bool {
        self.declared.insert(label.to_string())
    }

    pub fn reference(&mut self, label: &str, pos: &SourcePos) {
        if !self.referenced.iter().any(|(l, _)| l == label) {
            self.referenced.push((label.to_string(), pos.clone()));
        }
    }

    /// Every referenced label must have been declared in this scope.
    pub fn check(self) -> Result<()> {
        let missing = self
            .referenced
            .into_iter()
            .find(|(label, _)| !self.declared.contains(label));
        match missing {
            Some((label, pos)) => Err(Error::UndefinedLabelReference {
                pos,
                label,
                scope: self.name,
            }),
            None => Ok(()),
        }
    }
}

pub fn lower_label(w: &mut CodeWriter, name: &str) {
    if !w.scope.declare(name) {
        tracing::warn!(
            pos = %w.origin.pos,
            label = name,
            scope = w.scope.name(),
            "label declared twice in the same function"
        );
    }
    let symbol = scoped_label(w.scope.name(), name);
    w.emit(Instruction::label(symbol));
}

pub fn lower_goto(w: &mut CodeWriter, name: &str) {
    let symbol = reference(w, name);
    w.emit_all([Instruction::at(symbol), Instruction::jump(Comp::Zero, Jump::Jmp)]);
}

/// Pops the condition; any non-zero value takes the branch.
pub fn lower_if_goto(w: &mut CodeWriter, name: &str) {
    let symbol = reference(w, name);
    w.pop_d();
    w.emit_all([Instruction::at(symbol), Instruction::jump(Comp::D, Jump::Jne)]);
}

fn reference(w: &mut CodeWriter, name: &str) -> String {
    let pos = w.origin.pos.clone();
    w.scope.reference(name, &pos);
    scoped_label(w.scope.name(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslateOptions;

    #[test]
    fn test_labels_are_scoped_by_unit_before_any_function() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Loop");
        lower_label(&mut w, "TOP");
        lower_goto(&mut w, "TOP");
        let asm: Vec<String> = w.instructions.iter().map(ToString::to_string).collect();
        assert_eq!(asm, ["(Loop$TOP)", "@Loop$TOP", "0;JMP"]);
    }

    #[test]
    fn test_if_goto_pops_then_jumps_on_nonzero() {
        let mut w = CodeWriter::new(TranslateOptions::default());
        w.begin_unit("Loop");
        lower_if_goto(&mut w, "TOP");
        let asm: Vec<String> = w.instructions.iter().map(ToString::to_string).collect();
        assert_eq!(asm, ["@SP", "AM=M-1", "D=M", "@Loop$TOP", "D;JNE"]);
    }

    #[test]
    fn test_scope_check_reports_first_missing_reference() {
        let mut scope = LabelScope::new("Main.main".to_string());
        scope.declare("A");
        scope.reference("A", &SourcePos::new("Main", 2));
        scope.reference("B", &SourcePos::new("Main", 5));
        scope.reference("B", &SourcePos::new("Main", 9));
        match scope.check() {
            Err(Error::UndefinedLabelReference { pos, label, scope }) => {
                assert_eq!(pos.line, 5);
                assert_eq!(label, "B");
                assert_eq!(scope, "Main.main");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_forward_references_are_fine() {
        let mut scope = LabelScope::new("f".to_string());
        scope.reference("END", &SourcePos::new("X", 1));
        scope.declare("END");
        assert!(scope.check().is_ok());
    }
}
