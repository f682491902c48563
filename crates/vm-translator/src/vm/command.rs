/// VM command set: one variant per command kind.
///
/// Operands are validated for shape by the parser; range checks that depend
/// on the segment (temp, pointer, constant) belong to the code writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, n_locals: u16 },
    Call { name: String, n_args: u16 },
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

impl CommandKind {
    /// Classify a command by its first token.
    #[must_use]
    pub fn from_keyword(word: &str) -> Self {
        match word {
            "push" => CommandKind::Push,
            "pop" => CommandKind::Pop,
            "label" => CommandKind::Label,
            "goto" => CommandKind::Goto,
            "if-goto" => CommandKind::IfGoto,
            "function" => CommandKind::Function,
            "call" => CommandKind::Call,
            "return" => CommandKind::Return,
            _ => CommandKind::Arithmetic,
        }
    }

    /// Number of operands following the keyword.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self {
            CommandKind::Arithmetic | CommandKind::Return => 0,
            CommandKind::Label | CommandKind::Goto | CommandKind::IfGoto => 1,
            CommandKind::Push | CommandKind::Pop | CommandKind::Function | CommandKind::Call => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 9] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];

    #[must_use]
    pub fn from_mnemonic(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == word)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, ArithmeticOp::Neg | ArithmeticOp::Not)
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self, ArithmeticOp::Eq | ArithmeticOp::Gt | ArithmeticOp::Lt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Static,
    Temp,
    Pointer,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Constant,
        Segment::Local,
        Segment::Argument,
        Segment::This,
        Segment::That,
        Segment::Static,
        Segment::Temp,
        Segment::Pointer,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|seg| seg.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
        }
    }
}

impl Command {
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push(..) => CommandKind::Push,
            Command::Pop(..) => CommandKind::Pop,
            Command::Label(_) => CommandKind::Label,
            Command::Goto(_) => CommandKind::Goto,
            Command::IfGoto(_) => CommandKind::IfGoto,
            Command::Function { .. } => CommandKind::Function,
            Command::Call { .. } => CommandKind::Call,
            Command::Return => CommandKind::Return,
        }
    }

    /// First operand. For arithmetic commands this is the operator itself.
    #[must_use]
    pub fn arg1(&self) -> Option<&str> {
        match self {
            Command::Arithmetic(op) => Some(op.mnemonic()),
            Command::Push(seg, _) | Command::Pop(seg, _) => Some(seg.name()),
            Command::Label(name)
            | Command::Goto(name)
            | Command::IfGoto(name)
            | Command::Function { name, .. }
            | Command::Call { name, .. } => Some(name),
            Command::Return => None,
        }
    }

    #[must_use]
    pub const fn arg2(&self) -> Option<u16> {
        match self {
            Command::Push(_, index) | Command::Pop(_, index) => Some(*index),
            Command::Function { n_locals, .. } => Some(*n_locals),
            Command::Call { n_args, .. } => Some(*n_args),
            _ => None,
        }
    }
}
