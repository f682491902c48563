use std::fmt;

use super::{ArithmeticOp, Command, Segment};

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{op}"),
            Command::Push(seg, index) => write!(f, "push {seg} {index}"),
            Command::Pop(seg, index) => write!(f, "pop {seg} {index}"),
            Command::Label(name) => write!(f, "label {name}"),
            Command::Goto(name) => write!(f, "goto {name}"),
            Command::IfGoto(name) => write!(f, "if-goto {name}"),
            Command::Function { name, n_locals } => write!(f, "function {name} {n_locals}"),
            Command::Call { name, n_args } => write!(f, "call {name} {n_args}"),
            Command::Return => write!(f, "return"),
        }
    }
}
