// Core code writer: generation state, instruction buffer, and shared
// stack snippets used by the lowering submodules.
//
// Instructions for the unit being translated are buffered and only handed to
// the caller once the whole unit lowered cleanly.

use crate::error::SourcePos;
use crate::hack::{Comp, Dest, Instruction};
use crate::vm::{ArithmeticOp, Command, ParsedCommand, Parser, Segment};
use crate::{Error, Result, abi};

use super::control_flow::LabelScope;
use super::labels::{InternalLabel, LabelGen};
use super::{SourceUnit, TranslateOptions, alu, calls, control_flow, memory};

/// The command currently being lowered, used to locate errors.
#[derive(Debug, Clone, Default)]
pub(crate) struct Origin {
    pub pos: SourcePos,
    pub text: String,
}

/// Translates VM commands into Hack instructions.
///
/// One writer is used for a whole translation run so that generated labels
/// stay unique across every unit it sees.
pub struct CodeWriter {
    pub(crate) options: TranslateOptions,

    /// Run-wide label counter.
    pub(crate) labels: LabelGen,

    /// Prefix for `static` symbols. Reset from the function name at every
    /// `function` command.
    pub(crate) static_namespace: String,

    /// Name of the unit being translated.
    pub(crate) unit: String,

    /// Labels declared and referenced in the current function.
    pub(crate) scope: LabelScope,

    pub(crate) origin: Origin,

    pub(crate) instructions: Vec<Instruction>,
}

impl CodeWriter {
    #[must_use]
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            labels: LabelGen::new(),
            static_namespace: String::new(),
            unit: String::new(),
            scope: LabelScope::new(String::new()),
            origin: Origin::default(),
            instructions: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    #[must_use]
    pub fn static_namespace(&self) -> &str {
        &self.static_namespace
    }

    /// Number of label ids generated so far in this run.
    #[must_use]
    pub fn labels_issued(&self) -> usize {
        self.labels.issued()
    }

    /// Start a new source unit. Statics default to the unit's namespace
    /// until the first `function` command.
    pub fn begin_unit(&mut self, name: &str) {
        self.unit = name.to_string();
        self.static_namespace = name.to_string();
        self.scope = LabelScope::new(name.to_string());
        self.origin = Origin {
            pos: SourcePos::new(name, 0),
            text: String::new(),
        };
        self.instructions.clear();
    }

    /// Finish the current unit and hand back its instructions.
    pub fn end_unit(&mut self) -> Result<Vec<Instruction>> {
        if let Err(err) = self.close_scope() {
            self.instructions.clear();
            return Err(err);
        }
        Ok(std::mem::take(&mut self.instructions))
    }

    /// Translate a whole unit. On failure nothing from the unit is returned
    /// and the writer is ready for the next unit.
    pub fn translate_unit(&mut self, unit: &SourceUnit) -> Result<Vec<Instruction>> {
        self.begin_unit(&unit.name);

        for parsed in Parser::new(unit.name.clone(), &unit.source) {
            let lowered = parsed.and_then(|parsed| self.write_command(&parsed));
            if let Err(err) = lowered {
                self.instructions.clear();
                return Err(err);
            }
        }

        let instructions = self.end_unit()?;
        tracing::debug!(
            unit = %unit.name,
            instructions = instructions.len(),
            labels = self.labels.issued(),
            "translated unit"
        );
        Ok(instructions)
    }

    /// Lower one parsed command into the unit buffer.
    pub fn write_command(&mut self, parsed: &ParsedCommand) -> Result<()> {
        self.origin = Origin {
            pos: parsed.pos.clone(),
            text: parsed.text.clone(),
        };
        tracing::trace!(pos = %parsed.pos, command = %parsed.command, "lowering");

        if self.options.annotate {
            self.emit(Instruction::comment(parsed.command.to_string()));
        }

        match &parsed.command {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push(segment, index) => self.write_push(*segment, *index),
            Command::Pop(segment, index) => self.write_pop(*segment, *index),
            Command::Label(name) => self.write_label(name),
            Command::Goto(name) => self.write_goto(name),
            Command::IfGoto(name) => self.write_if(name),
            Command::Function { name, n_locals } => self.write_function(name, *n_locals),
            Command::Call { name, n_args } => self.write_call(name, *n_args),
            Command::Return => self.write_return(),
        }
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> Result<()> {
        alu::lower_arithmetic(self, op);
        Ok(())
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<()> {
        memory::lower_push(self, segment, index)
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<()> {
        memory::lower_pop(self, segment, index)
    }

    pub fn write_label(&mut self, name: &str) -> Result<()> {
        control_flow::lower_label(self, name);
        Ok(())
    }

    pub fn write_goto(&mut self, name: &str) -> Result<()> {
        control_flow::lower_goto(self, name);
        Ok(())
    }

    pub fn write_if(&mut self, name: &str) -> Result<()> {
        control_flow::lower_if_goto(self, name);
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<()> {
        calls::lower_function(self, name, n_locals)
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<()> {
        calls::lower_call(self, name, n_args)
    }

    pub fn write_return(&mut self) -> Result<()> {
        calls::lower_return(self);
        Ok(())
    }

    /// Bootstrap code: set SP to the stack base and call the entry function.
    pub fn write_init(&mut self) -> Result<Vec<Instruction>> {
        self.instructions.clear();
        self.origin = Origin {
            pos: SourcePos::new("<bootstrap>", 0),
            text: format!("call {} 0", self.options.entry_function),
        };
        calls::lower_bootstrap(self)?;
        Ok(std::mem::take(&mut self.instructions))
    }

    pub(crate) fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub(crate) fn emit_all(&mut self, instrs: impl IntoIterator<Item = Instruction>) {
        self.instructions.extend(instrs);
    }

    pub(crate) fn next_label(&mut self, kind: InternalLabel) -> String {
        kind.symbol(self.labels.next_id())
    }

    /// Check the labels of the function being left.
    pub(crate) fn close_scope(&mut self) -> Result<()> {
        let scope = std::mem::replace(&mut self.scope, LabelScope::new(self.unit.clone()));
        if self.options.check_labels {
            scope.check()?;
        }
        Ok(())
    }

    pub(crate) fn invalid_operation(&self, reason: impl Into<String>) -> Error {
        Error::InvalidOperation {
            pos: self.origin.pos.clone(),
            text: self.origin.text.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(&self, reason: impl Into<String>) -> Error {
        Error::OperandOutOfRange {
            pos: self.origin.pos.clone(),
            text: self.origin.text.clone(),
            reason: reason.into(),
        }
    }

    // ── Stack snippets ──

    /// `*SP = D; SP++`
    pub(crate) fn push_d(&mut self) {
        self.emit_all([
            Instruction::at(abi::SP),
            Instruction::assign(Dest::A, Comp::M),
            Instruction::assign(Dest::M, Comp::D),
            Instruction::at(abi::SP),
            Instruction::assign(Dest::M, Comp::MPlusOne),
        ]);
    }

    /// `SP--; D = *SP`
    pub(crate) fn pop_d(&mut self) {
        self.emit_all([
            Instruction::at(abi::SP),
            Instruction::assign(Dest::AM, Comp::MMinusOne),
            Instruction::assign(Dest::D, Comp::M),
        ]);
    }

    /// `A = SP - 1` (address of the top of the stack)
    pub(crate) fn top_of_stack(&mut self) {
        self.emit_all([
            Instruction::at(abi::SP),
            Instruction::assign(Dest::A, Comp::MMinusOne),
        ]);
    }
}
