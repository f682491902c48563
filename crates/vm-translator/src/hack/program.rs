use std::fmt;
use std::io::Write;

use super::Instruction;

/// A translated Hack assembly program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsmProgram {
    instructions: Vec<Instruction>,
}

impl AsmProgram {
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        self.instructions.extend(instructions);
    }

    /// Number of ROM words the program occupies once assembled.
    #[must_use]
    pub fn rom_len(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_executable()).count()
    }

    /// Labels declared by the program, in order of appearance.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::Label(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write_instructions(out, &self.instructions)
    }
}

/// Write one instruction per line.
pub fn write_instructions<W: Write>(out: &mut W, instructions: &[Instruction]) -> std::io::Result<()> {
    for instr in instructions {
        writeln!(out, "{instr}")?;
    }
    Ok(())
}

impl fmt::Display for AsmProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hack::{Comp, Dest};

    #[test]
    fn test_rom_len_skips_pseudo_instructions() {
        let program = AsmProgram::new(vec![
            Instruction::comment("push constant 1"),
            Instruction::label("LOOP"),
            Instruction::at_literal(1),
            Instruction::assign(Dest::D, Comp::A),
        ]);
        assert_eq!(program.rom_len(), 2);
        assert_eq!(program.labels().collect::<Vec<_>>(), vec!["LOOP"]);
        assert_eq!(program.to_string(), "// push constant 1\n(LOOP)\n@1\nD=A\n");
    }
}
