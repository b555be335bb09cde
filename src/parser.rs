//! This module provides the parser for `.tm` Turing Machine programs, utilizing the `pest` crate.
//! It defines the grammar binding and functions to parse the input into a `Program` struct.

use crate::{
    alphabet::{rewrite_blank, rewrite_symbol},
    analyzer::validate,
    machine::TuringMachine,
    types::{
        Instruction, MachineError, Move, Options, Program, StateId, DEFAULT_BLANK_SYMBOL,
        INPUT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// The parsed program is validated before being returned; only fatal analyzer findings
/// are reported as errors.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(MachineError::ParseError)` if there are any syntax errors.
/// * `Err(MachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, MachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(MachineError::ValidationError(format!(
            "Program is larger than {MAX_PROGRAM_SIZE} bytes"
        )));
    }

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| MachineError::ValidationError("Empty program".to_string()))?;

    let program = parse_program(root)?;

    validate(&TuringMachine::from_program(&program))?;

    Ok(program)
}

/// Parses the top-level sections of a program and applies defaults for missing ones.
fn parse_program(pair: Pair<Rule>) -> Result<Program, MachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut input: Option<String> = None;
    let mut rules: Option<Vec<Instruction>> = None;
    let mut options = Options::default();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let kind = p.as_rule();

        check_unique_rule(kind, span, &mut seen)?;

        match kind {
            Rule::name => name = Some(parse_inner_string(p)?.trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(parse_inner(p)?)),
            Rule::tape => {
                input = Some(
                    p.into_inner()
                        .next()
                        .map(|cells| cells.as_str().to_string())
                        .unwrap_or_default(),
                )
            }
            Rule::head => options.initial_position = parse_integer(parse_inner(p)?)?,
            Rule::initial => options.initial_state = parse_state(parse_inner(p)?),
            Rule::final_state => options.final_state = parse_state(parse_inner(p)?),
            Rule::max_steps => {
                let pair = parse_inner(p)?;
                let steps = parse_integer(pair.clone())?;
                options.max_steps = usize::try_from(steps).map_err(|_| {
                    parse_error("Maximum number of steps cannot be negative", pair.as_span())
                })?;
            }
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // Skip EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let rules = check_required_rule(rules, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);

    Ok(Program {
        name,
        input: rewrite_blank(&input.unwrap_or_default(), blank),
        blank,
        options,
        instructions: rules
            .into_iter()
            .map(|instruction| Instruction {
                symbol: rewrite_symbol(instruction.symbol, blank),
                new_symbol: rewrite_symbol(instruction.new_symbol, blank),
                ..instruction
            })
            .collect(),
    })
}

/// Parses the `rules:` section into instructions, keeping their order.
fn parse_rules(pair: Pair<Rule>) -> Result<Vec<Instruction>, MachineError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::transition)
        .map(parse_transition)
        .collect()
}

/// Parses a single `state, read -> write, move, next` rule.
fn parse_transition(pair: Pair<Rule>) -> Result<Instruction, MachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let state = parse_state(next_pair(&mut pairs, span)?);
    let symbol = parse_symbol(next_pair(&mut pairs, span)?);
    let new_symbol = parse_symbol(next_pair(&mut pairs, span)?);
    let movement = parse_direction(next_pair(&mut pairs, span)?)?;
    let new_state = parse_state(next_pair(&mut pairs, span)?);

    Ok(Instruction {
        state,
        symbol,
        new_symbol,
        movement,
        new_state,
    })
}

/// Parses a move direction, reporting unsupported letters at their position.
fn parse_direction(pair: Pair<Rule>) -> Result<Move, MachineError> {
    let span = pair.as_span();
    pair.as_str()
        .parse::<Move>()
        .map_err(|e| parse_error(&e.to_string(), span))
}

fn parse_integer(pair: Pair<Rule>) -> Result<i64, MachineError> {
    let span = pair.as_span();
    pair.as_str()
        .parse::<i64>()
        .map_err(|e| parse_error(&format!("Invalid number: {e}"), span))
}

fn parse_state(pair: Pair<Rule>) -> StateId {
    StateId::Name(pair.as_str().to_string())
}

fn parse_symbol(pair: Pair<Rule>) -> char {
    pair.as_str().chars().next().unwrap_or(INPUT_BLANK_SYMBOL)
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Returns the single inner pair of a section such as `head: 3`.
fn parse_inner(pair: Pair<Rule>) -> Result<Pair<Rule>, MachineError> {
    let span = pair.as_span();
    next_pair(&mut pair.into_inner(), span)
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> Result<String, MachineError> {
    Ok(parse_inner(pair)?.as_str().to_string())
}

fn next_pair<'a>(
    pairs: &mut Pairs<'a, Rule>,
    span: Span,
) -> Result<Pair<'a, Rule>, MachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete declaration", span))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    kind: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if kind == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(kind) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(kind)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::ValidationError(format!("Missing '{name}' section")))
}

fn section_name(kind: Rule) -> &'static str {
    match kind {
        Rule::name => "name",
        Rule::blank => "blank",
        Rule::tape => "tape",
        Rule::head => "head",
        Rule::initial => "initial",
        Rule::final_state => "final",
        Rule::max_steps => "max_steps",
        Rule::rules => "rules",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLIP: &str = r#"
name: Bit flip
tape: 1010
rules:
  q0, 0 -> 1, R, q0
  q0, 1 -> 0, R, q0
  q0, _ -> _, R, !
"#;

    #[test]
    fn test_parse_simple_program() {
        let program = parse(FLIP).unwrap();

        assert_eq!(program.name, "Bit flip");
        assert_eq!(program.input, "1010");
        assert_eq!(program.blank, 'λ');
        assert_eq!(program.options, Options::default());
        assert_eq!(
            program.instructions,
            vec![
                Instruction::new("q0", '0', '1', Move::Right, "q0"),
                Instruction::new("q0", '1', '0', Move::Right, "q0"),
                Instruction::new("q0", 'λ', 'λ', Move::Right, "!"),
            ]
        );

        let mut machine = TuringMachine::from_program(&program);
        assert_eq!(machine.run().unwrap().result, "0101λ");
    }

    #[test]
    fn test_parse_transition_line() {
        let pair = TuringMachineParser::parse(Rule::transition, "q0, 1 -> 0, L, done")
            .unwrap()
            .next()
            .unwrap();

        assert_eq!(pair.as_rule(), Rule::transition);
        assert_eq!(
            parse_transition(pair).unwrap(),
            Instruction::new("q0", '1', '0', Move::Left, "done")
        );
    }

    #[test]
    fn test_parse_all_sections() {
        let input = r#"
# Walks left over the input.
name: Left walker   # trailing comment
blank: B
tape: 11_1
head: -2
initial: start
final: done
max_steps: 25
rules:
  start, B -> B, L, start   # keep going
  start, 1 -> 1, N, done
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.name, "Left walker");
        assert_eq!(program.blank, 'B');
        assert_eq!(program.input, "11B1");
        assert_eq!(program.options.initial_position, -2);
        assert_eq!(program.options.initial_state, StateId::from("start"));
        assert_eq!(program.options.final_state, StateId::from("done"));
        assert_eq!(program.options.max_steps, 25);
        assert_eq!(program.instructions.len(), 2);
        assert_eq!(program.instructions[1].movement, Move::Stay);
    }

    #[test]
    fn test_blank_placeholder_follows_declared_blank() {
        let input = r#"
name: Custom blank
blank: -
tape: a_
rules:
  q0, _ -> -, R, !
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.input, "a-");
        assert_eq!(program.instructions[0].symbol, '-');
        assert_eq!(program.instructions[0].new_symbol, '-');
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
rules:
  q0, a -> b, R, !
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, MachineError::ParseError(_)));
        assert!(error.to_string().contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
tape: a
rules:
  q0, a -> b, R, !
"#;
        let error = parse(input).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_rules() {
        let input = r#"
name: Missing Rules
tape: a
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, MachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'rules' section"
        );
    }

    #[test]
    fn test_parse_invalid_direction() {
        let input = r#"
name: Bad move
tape: 1
rules:
  q0, 1 -> 0, I, !
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, MachineError::ParseError(_)));
        assert!(error.to_string().contains("Invalid move 'I'"));
    }

    #[test]
    fn test_parse_syntax_error() {
        let error = parse("name: Broken\nrules:\n  q0 1 -> 0, R, !").unwrap_err();
        assert!(matches!(error, MachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_zero_step_budget_is_rejected() {
        let input = r#"
name: No budget
max_steps: 0
rules:
  q0, _ -> _, R, !
"#;
        let error = parse(input).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Program validation error: Maximum number of steps must be positive"
        );
    }

    #[test]
    fn test_parse_keeps_duplicate_rules() {
        let input = r#"
name: Duplicates
tape: 1
rules:
  q0, 1 -> a, R, !
  q0, 1 -> b, R, !
"#;
        let program = parse(input).unwrap();
        let mut machine = TuringMachine::from_program(&program);

        assert_eq!(program.instructions.len(), 2);
        assert_eq!(machine.step().unwrap(), "b");
    }
}
