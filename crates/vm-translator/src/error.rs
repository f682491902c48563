use std::fmt;

/// Location of a VM command: the unit it came from and its 1-based line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePos {
    pub unit: String,
    pub line: usize,
}

impl SourcePos {
    pub fn new(unit: impl Into<String>, line: usize) -> Self {
        Self {
            unit: unit.into(),
            line,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{pos}: malformed command `{text}`: {reason}")]
    MalformedCommand {
        pos: SourcePos,
        text: String,
        reason: String,
    },

    #[error("{pos}: unknown operator `{op}` in `{text}`")]
    UnknownOperator {
        pos: SourcePos,
        text: String,
        op: String,
    },

    #[error("{pos}: invalid operation `{text}`: {reason}")]
    InvalidOperation {
        pos: SourcePos,
        text: String,
        reason: String,
    },

    #[error("{pos}: operand out of range in `{text}`: {reason}")]
    OperandOutOfRange {
        pos: SourcePos,
        text: String,
        reason: String,
    },

    #[error("{pos}: label `{label}` is never declared in `{scope}`")]
    UndefinedLabelReference {
        pos: SourcePos,
        label: String,
        scope: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Position of the offending command, if the error came from VM source.
    pub fn pos(&self) -> Option<&SourcePos> {
        match self {
            Error::MalformedCommand { pos, .. }
            | Error::UnknownOperator { pos, .. }
            | Error::InvalidOperation { pos, .. }
            | Error::OperandOutOfRange { pos, .. }
            | Error::UndefinedLabelReference { pos, .. } => Some(pos),
            Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_position() {
        let err = Error::MalformedCommand {
            pos: SourcePos::new("Main", 12),
            text: "push constant".to_string(),
            reason: "expected 2 operands, found 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Main:12: malformed command `push constant`: expected 2 operands, found 1"
        );
        assert_eq!(err.pos().map(|p| p.line), Some(12));
    }

    #[test]
    fn test_unknown_operator_keeps_line_text() {
        let err = Error::UnknownOperator {
            pos: SourcePos::new("Main", 3),
            text: "mul 1".to_string(),
            op: "mul".to_string(),
        };
        assert_eq!(err.to_string(), "Main:3: unknown operator `mul` in `mul 1`");
    }
}
