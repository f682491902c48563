//! Generated assembly symbols.
//!
//! Internal labels are `KIND$n`, where `n` comes from the single run-wide
//! counter. User labels are `scope$name`; VM label names never start with a
//! digit, so the two forms cannot coincide. Function names shaped like an
//! internal label are rejected by the parser.

/// Run-wide source of unique label ids. Shared by every construct that needs
/// a private symbol, so ids are never reused across constructs or units.
#[derive(Debug, Default)]
pub struct LabelGen {
    next: usize,
}

impl LabelGen {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Reserve the next id. Every symbol derived from one id belongs to a
    /// single generated construct.
    pub fn next_id(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn issued(&self) -> usize {
        self.next
    }
}

/// Kinds of translator-private symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalLabel {
    /// Comparison true branch.
    CmpTrue(&'static str),
    /// Comparison false branch.
    CmpFalse(&'static str),
    /// Comparison join point.
    CmpEnd(&'static str),
    /// Ordered comparison: `x` is negative.
    CmpNegative(&'static str),
    /// Ordered comparison: both operands have the same sign.
    CmpSameSign(&'static str),
    /// Scratch cell holding a computed pop destination.
    PopAddr,
    /// Landing point after a call.
    ReturnAddress,
    /// Scratch cell holding the frame base during a return.
    Frame,
    /// Scratch cell holding the return address during a return.
    Ret,
}

impl InternalLabel {
    #[must_use]
    pub fn symbol(self, id: usize) -> String {
        match self {
            InternalLabel::CmpTrue(op) => format!("{op}_TRUE${id}"),
            InternalLabel::CmpFalse(op) => format!("{op}_FALSE${id}"),
            InternalLabel::CmpEnd(op) => format!("{op}_END${id}"),
            InternalLabel::CmpNegative(op) => format!("{op}_X_NEG${id}"),
            InternalLabel::CmpSameSign(op) => format!("{op}_SAME_SIGN${id}"),
            InternalLabel::PopAddr => format!("POP_ADDR${id}"),
            InternalLabel::ReturnAddress => format!("RETURN_ADDRESS${id}"),
            InternalLabel::Frame => format!("FRAME${id}"),
            InternalLabel::Ret => format!("RET${id}"),
        }
    }
}

/// `true` if `name` has the shape of a translator-private symbol
/// (`KIND$<digits>`). Such names are reserved and cannot name functions.
#[must_use]
pub fn is_internal_symbol(name: &str) -> bool {
    let Some((kind, id)) = name.rsplit_once('$') else {
        return false;
    };
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let comparison = kind.split_once('_').is_some_and(|(op, branch)| {
        matches!(op, "EQ" | "GT" | "LT")
            && matches!(branch, "TRUE" | "FALSE" | "END" | "X_NEG" | "SAME_SIGN")
    });
    comparison || matches!(kind, "POP_ADDR" | "RETURN_ADDRESS" | "FRAME" | "RET")
}

/// Assembly symbol for a user label declared inside `scope`.
#[must_use]
pub fn scoped_label(scope: &str, label: &str) -> String {
    format!("{scope}${label}")
}

/// Assembly symbol for `static <index>` in `namespace`.
#[must_use]
pub fn static_symbol(namespace: &str, index: u16) -> String {
    format!("{namespace}.{index}")
}
