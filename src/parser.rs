use matches::debug_assert_matches;
use pest::Parser;
use pest_derive::Parser;

use crate::Result;

/// Pest parser shared by both passes. See `masm.pest` for the grammar.
#[derive(Parser)]
#[grammar = "masm.pest"]
pub struct MasmParser;

/// Splits a single line into instruction tokens.
///
/// The comment tail (first `#` to end of line) is dropped, and whitespace,
/// commas and parentheses all separate tokens, so `lw $t0, 4($sp)` yields
/// `["lw", "$t0", "4", "$sp"]`. A blank or comment-only line yields no
/// tokens.
pub fn tokenize(line: &str) -> Result<Vec<&str>> {
    let parsed = MasmParser::parse(Rule::line, line)?.next().unwrap();
    debug_assert_matches!(parsed.as_rule(), Rule::line);

    Ok(parsed
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::token)
        .map(|pair| pair.as_str())
        .collect())
}
