mod alu;
mod calls;
mod control_flow;
mod emitter;
mod labels;
mod memory;

pub use calls::unit_prefix;
pub use emitter::CodeWriter;
pub use labels::{InternalLabel, LabelGen, is_internal_symbol, scoped_label, static_symbol};

use std::io::Write;
use std::path::Path;

use crate::hack::{AsmProgram, write_instructions};
use crate::{Result, abi};

/// Options controlling a translation run.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Emit the bootstrap (set SP, call the entry function) before any unit.
    pub bootstrap: bool,
    /// Function called by the bootstrap.
    pub entry_function: String,
    /// Initial stack pointer set by the bootstrap.
    pub stack_base: u16,
    /// Precede each command's code with a `// command` line.
    pub annotate: bool,
    /// Reject goto/if-goto targets never declared in the same function.
    pub check_labels: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            bootstrap: false,
            entry_function: abi::ENTRY_FUNCTION.to_string(),
            stack_base: abi::STACK_BASE,
            annotate: false,
            check_labels: true,
        }
    }
}

/// One VM source file: its unit name and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Unit name for a source path: the file name without its extension.
#[must_use]
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Move the unit declaring the entry function to the front, keeping the
/// relative order of the rest.
pub fn order_units(units: &mut [SourceUnit], entry_function: &str) {
    let entry_unit = unit_prefix(entry_function);
    if let Some(idx) = units.iter().position(|u| u.name == entry_unit) {
        units[..=idx].rotate_right(1);
    }
}

/// Translate `units` in order into one program.
pub fn translate(units: &[SourceUnit], options: &TranslateOptions) -> Result<AsmProgram> {
    let mut program = AsmProgram::default();
    let mut writer = CodeWriter::new(options.clone());

    if options.bootstrap {
        program.extend(writer.write_init()?);
    }
    for unit in units {
        program.extend(writer.translate_unit(unit)?);
    }

    tracing::debug!(
        units = units.len(),
        rom_words = program.rom_len(),
        "translation finished"
    );
    Ok(program)
}

/// Translate `units` in order, writing each unit to `out` as soon as it has
/// been translated completely. A failing unit writes nothing; units written
/// before it stay written.
pub fn translate_to<W: Write>(
    units: &[SourceUnit],
    options: &TranslateOptions,
    out: &mut W,
) -> Result<()> {
    let mut writer = CodeWriter::new(options.clone());

    if options.bootstrap {
        write_instructions(out, &writer.write_init()?)?;
    }
    for unit in units {
        let instructions = writer.translate_unit(unit)?;
        write_instructions(out, &instructions)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_unit_name_strips_directory_and_extension() {
        assert_eq!(unit_name(Path::new("progs/FibonacciElement/Main.vm")), "Main");
        assert_eq!(unit_name(Path::new("Sys.vm")), "Sys");
    }

    #[test]
    fn test_order_units_puts_entry_unit_first() {
        let mut units = vec![
            SourceUnit::new("Class1", ""),
            SourceUnit::new("Main", ""),
            SourceUnit::new("Sys", ""),
        ];
        order_units(&mut units, "Sys.init");
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Sys", "Class1", "Main"]);
    }

    #[test]
    fn test_order_units_without_entry_unit_is_a_no_op() {
        let mut units = vec![SourceUnit::new("B", ""), SourceUnit::new("A", "")];
        order_units(&mut units, "Sys.init");
        assert_eq!(units[0].name, "B");
    }

    #[test]
    fn test_failed_unit_writes_nothing() {
        let units = [
            SourceUnit::new("Good", "push constant 1\n"),
            SourceUnit::new("Bad", "push constant 2\npush constant\n"),
        ];
        let mut out = Vec::new();
        let err = translate_to(&units, &TranslateOptions::default(), &mut out).unwrap_err();
        assert!(matches!(err, Error::MalformedCommand { .. }));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("@1"));
        assert!(!text.contains("@2"), "partial unit leaked: {text}");
    }

    #[test]
    fn test_bootstrap_comes_first() {
        let units = [SourceUnit::new("Sys", "function Sys.init 0\nlabel L\ngoto L\n")];
        let options = TranslateOptions {
            bootstrap: true,
            ..TranslateOptions::default()
        };
        let program = translate(&units, &options).unwrap();
        let text = program.to_string();
        assert!(text.starts_with("@256\nD=A\n@SP\nM=D\n"));
        assert!(text.contains("(Sys.init)"));
    }
}
