//! Arithmetic, logic and comparison commands executed on the Hack emulator.

use vm_translator::test_harness::*;

#[test]
fn test_simple_add() {
    let machine = run_vm("push constant 7\npush constant 8\nadd\n");
    assert_eq!(machine.stack(), [15]);
    assert_eq!(machine.sp(), 257);
}

#[test]
fn test_add_then_sub() {
    let machine = run_vm(
        "
        push constant 7
        push constant 8
        add
        push constant 2
        sub
        ",
    );
    assert_eq!(machine.stack(), [13]);
}

#[test]
fn test_sub_operand_order() {
    // x - y where y is the top of the stack
    let machine = run_vm("push constant 3\npush constant 10\nsub\n");
    assert_eq!(machine.stack(), [-7]);
}

#[test]
fn test_neg_and_not() {
    let machine = run_vm("push constant 5\nneg\npush constant 0\nnot\n");
    assert_eq!(machine.stack(), [-5, -1]);
}

#[test]
fn test_bitwise_and_or() {
    let machine = run_vm(
        "
        push constant 12
        push constant 10
        and
        push constant 12
        push constant 10
        or
        ",
    );
    assert_eq!(machine.stack(), [8, 14]);
}

#[test]
fn test_comparisons_produce_all_ones_or_zero() {
    let machine = run_vm(
        "
        push constant 17
        push constant 17
        eq
        push constant 17
        push constant 16
        eq
        push constant 892
        push constant 891
        gt
        push constant 891
        push constant 892
        gt
        push constant 5
        push constant 8
        lt
        push constant 8
        push constant 5
        lt
        push constant 4
        push constant 4
        lt
        ",
    );
    assert_eq!(machine.stack(), [-1, 0, -1, 0, -1, 0, 0]);
}

#[test]
fn test_comparisons_with_negative_operands() {
    let machine = run_vm(
        "
        push constant 3
        neg
        push constant 2
        lt
        push constant 0
        push constant 1
        neg
        gt
        ",
    );
    assert_eq!(machine.stack(), [-1, -1]);
}

/// The classic StackTest sequence from the course material.
#[test]
fn test_stack_test_sequence() {
    let machine = run_vm(
        "
        push constant 57
        push constant 31
        push constant 53
        add
        push constant 112
        sub
        neg
        and
        push constant 82
        or
        not
        ",
    );
    assert_eq!(machine.stack(), [-91]);
}

#[test]
fn test_ordering_when_difference_overflows() {
    // x - y does not fit in 16 bits for any of these pairs.
    let machine = run_vm(
        "
        push constant 20000
        neg
        push constant 20000
        lt
        push constant 32767
        push constant 1
        neg
        gt
        push constant 20000
        push constant 20000
        neg
        gt
        push constant 32767
        push constant 32767
        neg
        lt
        ",
    );
    assert_eq!(machine.stack(), [-1, -1, -1, 0]);
}

#[test]
fn test_ordering_with_mixed_signs_without_overflow() {
    let machine = run_vm(
        "
        push constant 1
        neg
        push constant 0
        gt
        push constant 0
        push constant 1
        neg
        lt
        push constant 7
        neg
        push constant 3
        neg
        lt
        ",
    );
    assert_eq!(machine.stack(), [0, 0, -1]);
}

#[test]
fn test_add_wraps_at_sixteen_bits() {
    let machine = run_vm("push constant 32767\npush constant 1\nadd\n");
    assert_eq!(machine.stack(), [i16::MIN]);
}

#[test]
fn test_repeated_comparisons_get_distinct_labels() {
    let program = translate_str("Test", "push constant 1\npush constant 1\neq\npush constant 1\neq\n")
        .expect("translation failed");
    assert_unique_labels(&program);
    let labels: Vec<&str> = program.labels().collect();
    assert_eq!(labels, ["EQ_TRUE$0", "EQ_END$0", "EQ_TRUE$1", "EQ_END$1"]);
}
