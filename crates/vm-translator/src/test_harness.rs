//! Test harness for vm-translator tests
//!
//! Provides a small Hack CPU emulator that assembles the translator's typed
//! instructions directly (no text round trip) and runs them, plus helpers to
//! translate VM source and inspect the resulting machine state.
//!
//! # Example
//!
//! ```rust
//! use vm_translator::test_harness::*;
//!
//! let machine = run_vm("push constant 7\npush constant 8\nadd\n");
//! assert_eq!(machine.stack(), [15]);
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::manual_assert,
    clippy::missing_panics_doc,
    clippy::uninlined_format_args
)]

use std::collections::{HashMap, HashSet};

use crate::hack::{Address, Comp, Dest, Instruction, Jump};
use crate::translate::{SourceUnit, TranslateOptions, translate};
use crate::{AsmProgram, Result, abi};

/// Steps allowed before a run is considered non-terminating.
pub const DEFAULT_STEP_LIMIT: usize = 2_000_000;

/// Initial segment pointers used by [`run_vm`] for code that runs without a
/// bootstrap (the classic single-file test setup).
pub const TEST_SP: i16 = 256;
pub const TEST_LCL: i16 = 300;
pub const TEST_ARG: i16 = 400;
pub const TEST_THIS: i16 = 3000;
pub const TEST_THAT: i16 = 3010;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("label `{0}` declared twice")]
    DuplicateLabel(String),

    #[error("no RAM left for variable `{0}`")]
    OutOfVariables(String),

    #[error("no halt after {0} steps")]
    StepLimit(usize),

    #[error("RAM access out of bounds at address {addr} (pc {pc})")]
    RamOutOfBounds { pc: usize, addr: usize },
}

/// Assembled ROM word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    Load(u16),
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
}

/// Hack CPU with 32K ROM and the full data memory map.
#[derive(Debug, Clone)]
pub struct Machine {
    rom: Vec<Word>,
    ram: Vec<i16>,
    symbols: HashMap<String, u16>,
    pc: usize,
    a: i16,
    d: i16,
    steps: usize,
}

impl Machine {
    /// Assemble `instructions`: labels bind to the next ROM word, unknown
    /// symbols become variables allocated upward from RAM 16.
    pub fn load(instructions: &[Instruction]) -> std::result::Result<Self, MachineError> {
        let mut symbols = HashMap::new();
        let mut rom_len: u16 = 0;
        for instr in instructions {
            match instr {
                Instruction::Label(name) => {
                    if symbols.insert(name.clone(), rom_len).is_some() {
                        return Err(MachineError::DuplicateLabel(name.clone()));
                    }
                }
                Instruction::At(_) | Instruction::Compute { .. } => rom_len += 1,
                Instruction::Comment(_) => {}
            }
        }

        let mut next_variable = abi::VARIABLE_BASE;
        let mut rom = Vec::with_capacity(usize::from(rom_len));
        for instr in instructions {
            match instr {
                Instruction::At(Address::Literal(value)) => rom.push(Word::Load(*value)),
                Instruction::At(Address::Symbol(name)) => {
                    let addr = match abi::predefined_symbol(name).or_else(|| symbols.get(name).copied())
                    {
                        Some(addr) => addr,
                        None => {
                            if next_variable >= 0x4000 {
                                return Err(MachineError::OutOfVariables(name.clone()));
                            }
                            symbols.insert(name.clone(), next_variable);
                            next_variable += 1;
                            next_variable - 1
                        }
                    };
                    rom.push(Word::Load(addr));
                }
                Instruction::Compute { dest, comp, jump } => rom.push(Word::Compute {
                    dest: *dest,
                    comp: *comp,
                    jump: *jump,
                }),
                Instruction::Label(_) | Instruction::Comment(_) => {}
            }
        }

        Ok(Self {
            rom,
            ram: vec![0; abi::RAM_SIZE],
            symbols,
            pc: 0,
            a: 0,
            d: 0,
            steps: 0,
        })
    }

    /// Address bound to a label or variable by the assembler.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        abi::predefined_symbol(name).or_else(|| self.symbols.get(name).copied())
    }

    pub fn ram(&self, addr: usize) -> i16 {
        self.ram[addr]
    }

    pub fn set_ram(&mut self, addr: usize, value: i16) {
        self.ram[addr] = value;
    }

    /// Value of a static or other assembler variable, if the program uses it.
    pub fn variable(&self, name: &str) -> Option<i16> {
        self.symbols.get(name).map(|&addr| self.ram[usize::from(addr)])
    }

    pub fn sp(&self) -> i16 {
        self.ram[0]
    }

    /// Stack contents from the stack base up to `SP`, bottom first.
    pub fn stack(&self) -> &[i16] {
        self.stack_from(abi::STACK_BASE)
    }

    pub fn stack_from(&self, base: u16) -> &[i16] {
        let sp = (self.sp() as u16).max(base);
        &self.ram[usize::from(base)..usize::from(sp)]
    }

    /// Top of the stack.
    pub fn peek(&self) -> i16 {
        self.ram[self.sp() as usize - 1]
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    /// `true` once the program ran off the end of ROM or is parked in a
    /// `(X) @X 0;JMP` loop.
    pub fn halted(&self) -> bool {
        if self.pc >= self.rom.len() {
            return true;
        }
        let parked = matches!(
            self.rom[self.pc],
            Word::Compute { comp: Comp::Zero, jump: Some(Jump::Jmp), .. }
        );
        parked && self.pc > 0 && self.rom[self.pc - 1] == Word::Load((self.pc - 1) as u16)
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> std::result::Result<(), MachineError> {
        match self.rom[self.pc] {
            Word::Load(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            Word::Compute { dest, comp, jump } => {
                let addr = self.a as u16 as usize;
                let m = if comp.reads_m() {
                    *self.ram.get(addr).ok_or(MachineError::RamOutOfBounds { pc: self.pc, addr })?
                } else {
                    0
                };
                let value = comp.eval(self.d, self.a, m);

                if let Some(dest) = dest {
                    if dest.writes_m() {
                        let cell = self
                            .ram
                            .get_mut(addr)
                            .ok_or(MachineError::RamOutOfBounds { pc: self.pc, addr })?;
                        *cell = value;
                    }
                    if dest.writes_d() {
                        self.d = value;
                    }
                }

                // The jump target is the A register from before this instruction.
                let target = self.a;
                if dest.is_some_and(Dest::writes_a) {
                    self.a = value;
                }
                self.pc = match jump {
                    Some(jump) if jump.taken(value) => target as u16 as usize,
                    _ => self.pc + 1,
                };
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Run until halted. Returns the number of steps executed.
    pub fn run(&mut self, step_limit: usize) -> std::result::Result<usize, MachineError> {
        let start = self.steps;
        while !self.halted() {
            if self.steps - start >= step_limit {
                return Err(MachineError::StepLimit(step_limit));
            }
            self.step()?;
        }
        Ok(self.steps - start)
    }
}

/// Translate one unit with default options.
pub fn translate_str(unit: &str, source: &str) -> Result<AsmProgram> {
    translate(&[SourceUnit::new(unit, source)], &TranslateOptions::default())
}

/// Translate several `(name, source)` units in the given order.
pub fn translate_units(units: &[(&str, &str)], options: &TranslateOptions) -> Result<AsmProgram> {
    let units: Vec<SourceUnit> = units
        .iter()
        .map(|(name, source)| SourceUnit::new(*name, *source))
        .collect();
    translate(&units, options)
}

/// Load `program` and preset the segment pointers to the `TEST_*` values.
pub fn machine_with_test_pointers(program: &AsmProgram) -> Machine {
    let mut machine = Machine::load(program.instructions())
        .unwrap_or_else(|e| panic!("failed to assemble: {e}"));
    machine.set_ram(0, TEST_SP);
    machine.set_ram(1, TEST_LCL);
    machine.set_ram(2, TEST_ARG);
    machine.set_ram(3, TEST_THIS);
    machine.set_ram(4, TEST_THAT);
    machine
}

/// Translate a single unit named `Test` without bootstrap and run it to the
/// end of ROM with the `TEST_*` pointers preset.
pub fn run_vm(source: &str) -> Machine {
    let program =
        translate_str("Test", source).unwrap_or_else(|e| panic!("translation failed: {e}"));
    let mut machine = machine_with_test_pointers(&program);
    machine
        .run(DEFAULT_STEP_LIMIT)
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    machine
}

/// Translate `units` with the bootstrap and run until the program parks in
/// its final loop (typically `Sys.init`'s `label END / goto END`).
pub fn run_program(units: &[(&str, &str)]) -> Machine {
    let options = TranslateOptions {
        bootstrap: true,
        ..TranslateOptions::default()
    };
    let program =
        translate_units(units, &options).unwrap_or_else(|e| panic!("translation failed: {e}"));
    assert_unique_labels(&program);
    let mut machine =
        Machine::load(program.instructions()).unwrap_or_else(|e| panic!("failed to assemble: {e}"));
    machine
        .run(DEFAULT_STEP_LIMIT)
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    machine
}

/// Panic if any label is declared more than once.
pub fn assert_unique_labels(program: &AsmProgram) {
    let mut seen = HashSet::new();
    for label in program.labels() {
        if !seen.insert(label) {
            panic!("label `{}` declared more than once", label);
        }
    }
}
