//! Line-oriented VM command parser.
//!
//! Each non-blank line holds one command. `//` starts a comment that runs to
//! the end of the line. Tokens are separated by any amount of whitespace.

use std::iter::Enumerate;
use std::str::Lines;

use super::{ArithmeticOp, Command, CommandKind, Segment};
use crate::abi::MAX_LITERAL;
use crate::error::SourcePos;
use crate::translate::is_internal_symbol;
use crate::{Error, Result};

/// A command together with the source line it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub pos: SourcePos,
    /// Normalized line text (comment and surrounding whitespace removed).
    pub text: String,
}

/// Lazily parses the commands of one source unit.
pub struct Parser<'a> {
    unit: String,
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(unit: impl Into<String>, source: &'a str) -> Self {
        Self {
            unit: unit.into(),
            lines: source.lines().enumerate(),
        }
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<ParsedCommand>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.lines.by_ref() {
            let text = normalize(raw);
            if text.is_empty() {
                continue;
            }
            let pos = SourcePos::new(self.unit.clone(), idx + 1);
            let parsed = match parse_command(text) {
                Ok(command) => Ok(ParsedCommand {
                    command,
                    pos,
                    text: text.to_string(),
                }),
                Err(e) => Err(e.into_error(pos, text)),
            };
            return Some(parsed);
        }
        None
    }
}

/// Strip the trailing comment and surrounding whitespace.
#[must_use]
pub fn normalize(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code).trim()
}

/// Parse a single normalized command line.
pub fn parse_line(unit: &str, line_no: usize, line: &str) -> Result<Option<Command>> {
    let text = normalize(line);
    if text.is_empty() {
        return Ok(None);
    }
    parse_command(text)
        .map(Some)
        .map_err(|e| e.into_error(SourcePos::new(unit, line_no), text))
}

/// Parser failure before it is tied to a source position.
enum ParseError {
    Malformed(String),
    UnknownOperator(String),
    OutOfRange(String),
}

impl ParseError {
    fn into_error(self, pos: SourcePos, text: &str) -> Error {
        match self {
            ParseError::Malformed(reason) => Error::MalformedCommand {
                pos,
                text: text.to_string(),
                reason,
            },
            ParseError::UnknownOperator(op) => Error::UnknownOperator {
                pos,
                text: text.to_string(),
                op,
            },
            ParseError::OutOfRange(reason) => Error::OperandOutOfRange {
                pos,
                text: text.to_string(),
                reason,
            },
        }
    }
}

fn parse_command(text: &str) -> std::result::Result<Command, ParseError> {
    let mut tokens = text.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err(ParseError::Malformed("empty command".to_string()));
    };
    let operands: Vec<&str> = tokens.collect();
    let kind = CommandKind::from_keyword(keyword);

    // The operator check comes first so `mul 1` reports the operator.
    if kind != CommandKind::Arithmetic {
        expect_operands(kind, &operands)?;
    }

    let command = match kind {
        CommandKind::Arithmetic => {
            let op = ArithmeticOp::from_mnemonic(keyword)
                .ok_or_else(|| ParseError::UnknownOperator(keyword.to_string()))?;
            expect_operands(kind, &operands)?;
            Command::Arithmetic(op)
        }
        CommandKind::Push => Command::Push(segment(operands[0])?, number(operands[1])?),
        CommandKind::Pop => Command::Pop(segment(operands[0])?, number(operands[1])?),
        CommandKind::Label => Command::Label(symbol(operands[0])?),
        CommandKind::Goto => Command::Goto(symbol(operands[0])?),
        CommandKind::IfGoto => Command::IfGoto(symbol(operands[0])?),
        CommandKind::Function => Command::Function {
            name: function_name(operands[0])?,
            n_locals: number(operands[1])?,
        },
        CommandKind::Call => Command::Call {
            name: function_name(operands[0])?,
            n_args: number(operands[1])?,
        },
        CommandKind::Return => Command::Return,
    };
    Ok(command)
}

fn expect_operands(kind: CommandKind, operands: &[&str]) -> std::result::Result<(), ParseError> {
    let expected = kind.operand_count();
    if operands.len() == expected {
        Ok(())
    } else {
        Err(ParseError::Malformed(format!(
            "expected {expected} operand(s), found {}",
            operands.len()
        )))
    }
}

fn segment(token: &str) -> std::result::Result<Segment, ParseError> {
    Segment::from_name(token)
        .ok_or_else(|| ParseError::Malformed(format!("unknown segment `{token}`")))
}

fn number(token: &str) -> std::result::Result<u16, ParseError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Malformed(format!(
            "expected a non-negative integer, found `{token}`"
        )));
    }
    match token.parse::<u16>() {
        Ok(value) if value <= MAX_LITERAL => Ok(value),
        _ => Err(ParseError::OutOfRange(format!(
            "`{token}` exceeds the largest literal {MAX_LITERAL}"
        ))),
    }
}

fn symbol(token: &str) -> std::result::Result<String, ParseError> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':');
    let starts_with_digit = token.starts_with(|c: char| c.is_ascii_digit());
    if token.is_empty() || starts_with_digit || !token.chars().all(valid_char) {
        return Err(ParseError::Malformed(format!("invalid symbol `{token}`")));
    }
    Ok(token.to_string())
}

/// Function names become bare assembly labels, so they must stay clear of the
/// translator's own `KIND$n` symbols.
fn function_name(token: &str) -> std::result::Result<String, ParseError> {
    let name = symbol(token)?;
    if is_internal_symbol(&name) {
        return Err(ParseError::Malformed(format!(
            "`{name}` is reserved for generated symbols"
        )));
    }
    Ok(name)
}
