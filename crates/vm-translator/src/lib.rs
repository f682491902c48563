#![allow(
    clippy::cast_possible_truncation, // Hack words are 16 bits; the emulator narrows i32 and usize freely
    clippy::cast_possible_wrap, // u16 literals reinterpreted as i16 machine words
    clippy::cast_sign_loss, // i16 machine words used as RAM/ROM addresses
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod abi;
pub mod error;
pub mod hack;
pub mod translate;
pub mod vm;

/// Hack emulator and helpers for unit and integration tests.
///
/// Only available when running tests or when the `test-harness` feature
/// is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use error::{Error, Result, SourcePos};
pub use hack::{AsmProgram, Instruction};
pub use translate::{CodeWriter, SourceUnit, TranslateOptions, translate, translate_to};
pub use vm::{Command, Parser};
