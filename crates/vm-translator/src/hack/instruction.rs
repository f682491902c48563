use std::fmt;

/// Operand of an `@` instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Literal(u16),
    Symbol(String),
}

/// Destination registers of a compute instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dest {
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    #[must_use]
    pub const fn writes_a(self) -> bool {
        matches!(self, Dest::A | Dest::AM | Dest::AD | Dest::AMD)
    }

    #[must_use]
    pub const fn writes_d(self) -> bool {
        matches!(self, Dest::D | Dest::MD | Dest::AD | Dest::AMD)
    }

    #[must_use]
    pub const fn writes_m(self) -> bool {
        matches!(self, Dest::M | Dest::MD | Dest::AM | Dest::AMD)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Dest::M => "M",
            Dest::D => "D",
            Dest::MD => "MD",
            Dest::A => "A",
            Dest::AM => "AM",
            Dest::AD => "AD",
            Dest::AMD => "AMD",
        }
    }
}

/// ALU computation. Covers the complete Hack comp table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::MinusOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::M => "M",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NotM => "!M",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::NegM => "-M",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::MPlusOne => "M+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusA => "D+A",
            Comp::DPlusM => "D+M",
            Comp::DMinusA => "D-A",
            Comp::DMinusM => "D-M",
            Comp::AMinusD => "A-D",
            Comp::MMinusD => "M-D",
            Comp::DAndA => "D&A",
            Comp::DAndM => "D&M",
            Comp::DOrA => "D|A",
            Comp::DOrM => "D|M",
        }
    }

    /// Whether the computation reads `M` (RAM[A]).
    #[must_use]
    pub const fn reads_m(self) -> bool {
        matches!(
            self,
            Comp::M
                | Comp::NotM
                | Comp::NegM
                | Comp::MPlusOne
                | Comp::MMinusOne
                | Comp::DPlusM
                | Comp::DMinusM
                | Comp::MMinusD
                | Comp::DAndM
                | Comp::DOrM
        )
    }

    /// Evaluate the computation with 16-bit wrapping semantics.
    #[must_use]
    pub fn eval(self, d: i16, a: i16, m: i16) -> i16 {
        match self {
            Comp::Zero => 0,
            Comp::One => 1,
            Comp::MinusOne => -1,
            Comp::D => d,
            Comp::A => a,
            Comp::M => m,
            Comp::NotD => !d,
            Comp::NotA => !a,
            Comp::NotM => !m,
            Comp::NegD => d.wrapping_neg(),
            Comp::NegA => a.wrapping_neg(),
            Comp::NegM => m.wrapping_neg(),
            Comp::DPlusOne => d.wrapping_add(1),
            Comp::APlusOne => a.wrapping_add(1),
            Comp::MPlusOne => m.wrapping_add(1),
            Comp::DMinusOne => d.wrapping_sub(1),
            Comp::AMinusOne => a.wrapping_sub(1),
            Comp::MMinusOne => m.wrapping_sub(1),
            Comp::DPlusA => d.wrapping_add(a),
            Comp::DPlusM => d.wrapping_add(m),
            Comp::DMinusA => d.wrapping_sub(a),
            Comp::DMinusM => d.wrapping_sub(m),
            Comp::AMinusD => a.wrapping_sub(d),
            Comp::MMinusD => m.wrapping_sub(d),
            Comp::DAndA => d & a,
            Comp::DAndM => d & m,
            Comp::DOrA => d | a,
            Comp::DOrM => d | m,
        }
    }
}

/// Jump condition, tested against the comp result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Jump {
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Jump::Jgt => "JGT",
            Jump::Jeq => "JEQ",
            Jump::Jge => "JGE",
            Jump::Jlt => "JLT",
            Jump::Jne => "JNE",
            Jump::Jle => "JLE",
            Jump::Jmp => "JMP",
        }
    }

    #[must_use]
    pub const fn taken(self, value: i16) -> bool {
        match self {
            Jump::Jgt => value > 0,
            Jump::Jeq => value == 0,
            Jump::Jge => value >= 0,
            Jump::Jlt => value < 0,
            Jump::Jne => value != 0,
            Jump::Jle => value <= 0,
            Jump::Jmp => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `@value`: load a literal or a symbol's address into `A`.
    At(Address),
    /// `dest=comp;jump`
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
    /// `(name)`: pseudo-instruction binding `name` to the next instruction.
    Label(String),
    /// `// text`: annotation, ignored by the assembler.
    Comment(String),
}

impl Instruction {
    pub fn at(symbol: impl Into<String>) -> Self {
        Instruction::At(Address::Symbol(symbol.into()))
    }

    #[must_use]
    pub const fn at_literal(value: u16) -> Self {
        Instruction::At(Address::Literal(value))
    }

    #[must_use]
    pub const fn assign(dest: Dest, comp: Comp) -> Self {
        Instruction::Compute {
            dest: Some(dest),
            comp,
            jump: None,
        }
    }

    #[must_use]
    pub const fn jump(comp: Comp, jump: Jump) -> Self {
        Instruction::Compute {
            dest: None,
            comp,
            jump: Some(jump),
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        Instruction::Label(name.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Instruction::Comment(text.into())
    }

    /// Whether this instruction occupies a ROM word.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        matches!(self, Instruction::At(_) | Instruction::Compute { .. })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Literal(v) => write!(f, "{v}"),
            Address::Symbol(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::At(addr) => write!(f, "@{addr}"),
            Instruction::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest.mnemonic())?;
                }
                f.write_str(comp.mnemonic())?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump.mnemonic())?;
                }
                Ok(())
            }
            Instruction::Label(name) => write!(f, "({name})"),
            Instruction::Comment(text) => write!(f, "// {text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Instruction::at("SP").to_string(), "@SP");
        assert_eq!(Instruction::at_literal(17).to_string(), "@17");
        assert_eq!(
            Instruction::assign(Dest::AM, Comp::MMinusOne).to_string(),
            "AM=M-1"
        );
        assert_eq!(Instruction::jump(Comp::D, Jump::Jne).to_string(), "D;JNE");
        assert_eq!(Instruction::jump(Comp::Zero, Jump::Jmp).to_string(), "0;JMP");
        assert_eq!(Instruction::label("Main.main").to_string(), "(Main.main)");
        assert_eq!(Instruction::comment("push constant 7").to_string(), "// push constant 7");
    }

    #[test]
    fn test_eval_wraps() {
        assert_eq!(Comp::DPlusM.eval(i16::MAX, 0, 1), i16::MIN);
        assert_eq!(Comp::NegM.eval(0, 0, i16::MIN), i16::MIN);
        assert_eq!(Comp::NotM.eval(0, 0, 0), -1);
        assert_eq!(Comp::MMinusD.eval(2, 0, 15), 13);
    }

    #[test]
    fn test_jump_conditions() {
        assert!(Jump::Jne.taken(-1));
        assert!(Jump::Jne.taken(1));
        assert!(!Jump::Jne.taken(0));
        assert!(Jump::Jlt.taken(-1));
        assert!(!Jump::Jgt.taken(0));
        assert!(Jump::Jmp.taken(0));
    }
}
