//! Error classification and the "failed unit emits nothing" guarantee.

use vm_translator::test_harness::*;
use vm_translator::translate::SourceUnit;
use vm_translator::{Error, TranslateOptions, translate_to};

fn translate_err(source: &str) -> Error {
    translate_str("Bad", source).expect_err("translation should fail")
}

#[test]
fn test_missing_operand_is_malformed() {
    let err = translate_err("push constant 1\npush constant\n");
    match err {
        Error::MalformedCommand { pos, text, .. } => {
            assert_eq!(pos.unit, "Bad");
            assert_eq!(pos.line, 2);
            assert_eq!(text, "push constant");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_extra_operand_is_malformed() {
    assert!(matches!(
        translate_err("return 0\n"),
        Error::MalformedCommand { .. }
    ));
    assert!(matches!(
        translate_err("add 1\n"),
        Error::MalformedCommand { .. }
    ));
}

#[test]
fn test_unknown_operator() {
    match translate_err("push constant 1\nmul 1\n") {
        Error::UnknownOperator { pos, op, text } => {
            assert_eq!(op, "mul");
            assert_eq!(text, "mul 1");
            assert_eq!(pos.line, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_segment_and_bad_numbers_are_malformed() {
    for source in [
        "push heap 0",
        "push constant -1",
        "push constant x",
        "function Main.f many",
        "label 1abc",
    ] {
        assert!(
            matches!(translate_err(source), Error::MalformedCommand { .. }),
            "{source}"
        );
    }
}

#[test]
fn test_out_of_range_operands() {
    for source in ["push constant 32768", "push temp 8", "pop pointer 2"] {
        assert!(
            matches!(translate_err(source), Error::OperandOutOfRange { .. }),
            "{source}"
        );
    }
}

#[test]
fn test_pop_constant_is_invalid() {
    match translate_err("push constant 1\npop constant 5\n") {
        Error::InvalidOperation { text, .. } => assert_eq!(text, "pop constant 5"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_undefined_label_reference() {
    let err = translate_err(
        "
        function Main.main 0
        goto NOWHERE
        function Main.other 0
        label NOWHERE
        return
        ",
    );
    match err {
        Error::UndefinedLabelReference { label, scope, pos } => {
            assert_eq!(label, "NOWHERE");
            assert_eq!(scope, "Main.main");
            assert_eq!(pos.line, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_undefined_label_checked_at_end_of_unit() {
    assert!(matches!(
        translate_err("push constant 1\nif-goto MISSING\n"),
        Error::UndefinedLabelReference { .. }
    ));
}

#[test]
fn test_label_check_can_be_disabled() {
    let options = TranslateOptions {
        check_labels: false,
        ..TranslateOptions::default()
    };
    let program = translate_units(&[("Loose", "goto SOMEWHERE\n")], &options).unwrap();
    assert!(program.to_string().contains("@Loose$SOMEWHERE"));
}

#[test]
fn test_failed_unit_emits_nothing_but_earlier_units_stay() {
    let units = [
        SourceUnit::new("First", "push constant 11\n"),
        SourceUnit::new("Second", "push constant 22\npop local 0\npush argument\n"),
        SourceUnit::new("Third", "push constant 33\n"),
    ];
    let mut out = Vec::new();
    let err = translate_to(&units, &TranslateOptions::default(), &mut out).unwrap_err();
    assert_eq!(err.pos().map(|p| p.unit.as_str()), Some("Second"));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("@11"));
    assert!(!text.contains("@22"), "{text}");
    assert!(!text.contains("@33"), "{text}");
}

#[test]
fn test_error_message_names_the_location() {
    let err = translate_err("push constant 1\n\n  pop temp 9 // oops\n");
    let message = err.to_string();
    assert!(message.starts_with("Bad:3:"), "{message}");
    assert!(message.contains("pop temp 9"), "{message}");
}

#[test]
fn test_generated_symbol_shapes_cannot_name_functions() {
    for source in ["function RET$0 0\nreturn\n", "call FRAME$3 0\n", "call LT_TRUE$0 1\n"] {
        match translate_err(source) {
            Error::MalformedCommand { pos, .. } => assert_eq!(pos.line, 1, "{source}"),
            other => panic!("unexpected error for {source:?}: {other:?}"),
        }
    }
}
