//! Hack ABI constants (reserved registers, memory layout, frame layout).
//!
//! This module centralizes the calling convention shared by the code writer,
//! the bootstrap sequence and the test emulator.
//!
//! ```text
//! Hack RAM:
//!   0          SP     stack pointer
//!   1          LCL    local segment base
//!   2          ARG    argument segment base
//!   3          THIS   this segment base (pointer 0)
//!   4          THAT   that segment base (pointer 1)
//!   5 - 12     temp segment
//!   13 - 15    R13-R15 (unused by the translator)
//!   16 - 255   static variables and translator scratch cells
//!   256 -      stack (grows upward)
//! ```

// ── Reserved Registers ──

/// Stack pointer symbol. Points to the next free stack word.
pub const SP: &str = "SP";

/// Local segment base pointer.
pub const LCL: &str = "LCL";

/// Argument segment base pointer.
pub const ARG: &str = "ARG";

/// `this` segment base pointer, also addressed as `pointer 0`.
pub const THIS: &str = "THIS";

/// `that` segment base pointer, also addressed as `pointer 1`.
pub const THAT: &str = "THAT";

// ── Memory Layout ──

/// First RAM word of the temp segment.
pub const TEMP_BASE: u16 = 5;

/// Number of words in the temp segment.
pub const TEMP_SIZE: u16 = 8;

/// First RAM word handed out to assembler variables.
pub const VARIABLE_BASE: u16 = 16;

/// Default initial stack pointer set by the bootstrap sequence.
pub const STACK_BASE: u16 = 256;

/// Largest value an `@value` instruction can load (15-bit literal).
pub const MAX_LITERAL: u16 = 0x7FFF;

/// Size of the Hack data memory in words (RAM + screen + keyboard).
pub const RAM_SIZE: usize = 0x6001;

// ── Frame Layout ──

/// Words pushed by a call on top of the arguments.
///
/// Layout relative to the callee's `LCL` (the frame base):
/// - `LCL - 5`: return address
/// - `LCL - 4`: saved `LCL`
/// - `LCL - 3`: saved `ARG`
/// - `LCL - 2`: saved `THIS`
/// - `LCL - 1`: saved `THAT`
pub const FRAME_SIZE: u16 = 5;

/// Base pointers saved by a call, in push order.
pub const SAVED_POINTERS: [&str; 4] = [LCL, ARG, THIS, THAT];

/// Entry function called by the bootstrap sequence.
pub const ENTRY_FUNCTION: &str = "Sys.init";

/// Address of a temp slot, or `None` when `index` is outside the segment.
#[must_use]
pub fn temp_addr(index: u16) -> Option<u16> {
    (index < TEMP_SIZE).then(|| TEMP_BASE + index)
}

/// Base pointer backing `pointer <index>`.
#[must_use]
pub fn pointer_register(index: u16) -> Option<&'static str> {
    match index {
        0 => Some(THIS),
        1 => Some(THAT),
        _ => None,
    }
}

/// Address of a predefined Hack symbol, as resolved by the assembler.
#[must_use]
pub fn predefined_symbol(name: &str) -> Option<u16> {
    let addr = match name {
        "SP" => 0,
        "LCL" => 1,
        "ARG" => 2,
        "THIS" => 3,
        "THAT" => 4,
        "SCREEN" => 0x4000,
        "KBD" => 0x6000,
        _ => {
            let reg = name.strip_prefix('R')?;
            if reg.len() > 2 || (reg.len() == 2 && reg.starts_with('0')) {
                return None;
            }
            let n: u16 = reg.parse().ok()?;
            return (n < 16).then_some(n);
        }
    };
    Some(addr)
}
