use crate::parser::{MasmParser, Rule};
use ::pest::*;

#[test]
fn empty_line() {
    parses_to! {
        parser: MasmParser,
        input: "",
        rule: Rule::line,
        tokens: [ line(0, 0, [ EOI(0, 0) ]) ]
    };
}

#[test]
fn separators_only() {
    parses_to! {
        parser: MasmParser,
        input: ", ()",
        rule: Rule::line,
        tokens: [ line(0, 4, [ EOI(4, 4) ]) ]
    };
}

#[test]
fn comment() {
    parses_to! {
        parser: MasmParser,
        input: "# a2$5 ,( anything at all",
        rule: Rule::COMMENT,
        tokens: []
    };
}

#[test]
fn memory_operand() {
    parses_to! {
        parser: MasmParser,
        input: "lw $t0, 4($sp) # load",
        rule: Rule::line,
        tokens: [ line(0, 21, [
            token(0, 2),
            token(3, 6),
            token(8, 9),
            token(10, 13),
            EOI(21, 21)
        ]) ]
    };
}

#[test]
fn labeled_instruction() {
    parses_to! {
        parser: MasmParser,
        input: "loop: addu $t0, $t0, $t1",
        rule: Rule::line,
        tokens: [ line(0, 24, [
            token(0, 5),
            token(6, 10),
            token(11, 14),
            token(16, 19),
            token(21, 24),
            EOI(24, 24)
        ]) ]
    };
}
