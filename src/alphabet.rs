//! Helpers for working with tape alphabets.

use crate::types::INPUT_BLANK_SYMBOL;

/// Returns the sorted, de-duplicated characters of `input`.
pub fn create_alphabet(input: &str) -> Vec<char> {
    let mut alphabet: Vec<char> = input.chars().collect();
    alphabet.sort_unstable();
    alphabet.dedup();
    alphabet
}

/// Returns true if every character of `input` belongs to `alphabet`.
pub fn validate_string(input: &str, alphabet: &[char]) -> bool {
    input.chars().all(|c| alphabet.contains(&c))
}

/// Replaces `INPUT_BLANK_SYMBOL` with the machine's blank symbol.
pub fn rewrite_symbol(symbol: char, blank: char) -> char {
    if symbol == INPUT_BLANK_SYMBOL {
        blank
    } else {
        symbol
    }
}

/// Rewrites every `_` in user-written tape text to `blank`.
pub fn rewrite_blank(tape: &str, blank: char) -> String {
    tape.chars().map(|c| rewrite_symbol(c, blank)).collect()
}
