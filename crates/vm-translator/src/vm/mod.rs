mod command;
mod display;
mod parser;

pub use command::{ArithmeticOp, Command, CommandKind, Segment};
pub use parser::{ParsedCommand, Parser, normalize, parse_line};
