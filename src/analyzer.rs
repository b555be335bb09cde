//! This module provides functions for analyzing Turing Machines to detect common errors
//! and inconsistencies before execution. This includes checks for duplicated instructions,
//! an unreachable final state, unregistered states, unhandled input symbols, and the step budget.

use crate::machine::TuringMachine;
use crate::types::{MachineError, StateId};
use std::collections::HashSet;

/// Represents the findings of an analysis pass over a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Several instructions share a (state, symbol) pair; the last one wins at lookup.
    DuplicateInstructions(Vec<(StateId, char)>),
    /// The final state is not reachable from the initial state.
    FinalStateUnreachable(StateId),
    /// The initial state has no outgoing instructions and is not the final state.
    InvalidStartState(StateId),
    /// States used by options or instructions that are missing from the attached registry.
    UnregisteredStates(Vec<StateId>),
    /// The input contains symbols that no instruction reads.
    InvalidTapeSymbols(Vec<char>),
    /// `max_steps` is zero, so `run` can never take a step.
    ZeroStepBudget,
}

impl AnalysisError {
    /// Fatal findings make the machine unusable; the rest are warnings.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::UnregisteredStates(_) | AnalysisError::ZeroStepBudget
        )
    }
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        MachineError::ValidationError(error.to_string())
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::DuplicateInstructions(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(state, symbol)| format!("({state}, {symbol})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Duplicate instructions for {pairs}; the last one is used")
            }
            AnalysisError::FinalStateUnreachable(state) => {
                write!(f, "Final state '{state}' is not reachable from the initial state")
            }
            AnalysisError::InvalidStartState(state) => {
                write!(f, "Initial state '{state}' has no instructions")
            }
            AnalysisError::UnregisteredStates(states) => {
                let states = states
                    .iter()
                    .map(|s| format!("'{s}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "States not found in the state registry: {states}")
            }
            AnalysisError::InvalidTapeSymbols(symbols) => write!(
                f,
                "Input contains symbols not handled by any instruction: {symbols:?}"
            ),
            AnalysisError::ZeroStepBudget => write!(f, "Maximum number of steps must be positive"),
        }
    }
}

/// Runs every check over `machine` and returns all findings, fatal ones first.
pub fn analyze(machine: &TuringMachine) -> Vec<AnalysisError> {
    let mut findings = [
        check_step_budget,
        check_registered_states,
        check_duplicates,
        check_valid_start_state,
        check_final_state_reachable,
        check_tape_symbols,
    ]
    .iter()
    .filter_map(|f| f(machine).err())
    .collect::<Vec<_>>();

    findings.sort_by_key(|finding| !finding.is_fatal());
    findings
}

/// Fails with the first fatal finding, if any.
///
/// # Returns
///
/// * `Ok(warnings)` with the non-fatal findings.
/// * `Err(MachineError::ValidationError)` if a fatal finding exists.
pub fn validate(machine: &TuringMachine) -> Result<Vec<AnalysisError>, MachineError> {
    let findings = analyze(machine);

    if let Some(fatal) = findings.iter().find(|finding| finding.is_fatal()) {
        return Err(fatal.clone().into());
    }

    Ok(findings)
}

fn check_step_budget(machine: &TuringMachine) -> Result<(), AnalysisError> {
    if machine.options().max_steps == 0 {
        return Err(AnalysisError::ZeroStepBudget);
    }

    Ok(())
}

/// Checks that every state referenced by the options or the instructions is registered.
/// Machines without a registry always pass.
fn check_registered_states(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let Some(registry) = machine.states() else {
        return Ok(());
    };

    let missing: Vec<StateId> = machine
        .referenced_states()
        .into_iter()
        .filter(|state| !registry.contains(state))
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::UnregisteredStates(missing));
    }

    Ok(())
}

fn check_duplicates(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for instruction in machine.instructions() {
        let pair = (instruction.state.clone(), instruction.symbol);
        if !seen.insert(pair.clone()) && !duplicates.contains(&pair) {
            duplicates.push(pair);
        }
    }

    if !duplicates.is_empty() {
        return Err(AnalysisError::DuplicateInstructions(duplicates));
    }

    Ok(())
}

fn check_valid_start_state(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let options = machine.options();

    let has_instructions = machine
        .instructions()
        .iter()
        .any(|i| i.state == options.initial_state);

    if !has_instructions && options.initial_state != options.final_state {
        return Err(AnalysisError::InvalidStartState(
            options.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that some chain of instructions leads from the initial state to the final state.
fn check_final_state_reachable(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let options = machine.options();
    if options.initial_state == options.final_state {
        return Ok(());
    }

    // Walk the transition graph from the initial state.
    let mut visited = HashSet::new();
    let mut queue = vec![&options.initial_state];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for instruction in machine.instructions().iter().filter(|i| &i.state == state) {
            if !visited.contains(&instruction.new_state) {
                queue.push(&instruction.new_state);
            }
        }
    }

    if !visited.contains(&options.final_state) {
        return Err(AnalysisError::FinalStateUnreachable(
            options.final_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that all symbols present in the input are read by at least one instruction.
fn check_tape_symbols(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let handled: HashSet<char> = machine.instructions().iter().map(|i| i.symbol).collect();

    let mut unhandled: Vec<char> = machine
        .input()
        .chars()
        .filter(|c| !handled.contains(c))
        .collect();
    unhandled.sort();
    unhandled.dedup();

    if !unhandled.is_empty() {
        return Err(AnalysisError::InvalidTapeSymbols(unhandled));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::StateRegistry;
    use crate::types::{Instruction, Move, OptionsUpdate};

    fn machine(input: &str, instructions: Vec<Instruction>) -> TuringMachine {
        TuringMachine::new(input, instructions, OptionsUpdate::default())
    }

    #[test]
    fn test_valid_machine() {
        let machine = machine(
            "10",
            vec![
                Instruction::new("q0", '1', '1', Move::Right, "q0"),
                Instruction::new("q0", '0', '0', Move::Right, "q1"),
                Instruction::new("q1", 'λ', 'λ', Move::Stay, "!"),
            ],
        );

        assert!(analyze(&machine).is_empty());
        assert_eq!(validate(&machine), Ok(vec![]));
    }

    #[test]
    fn test_duplicate_instructions() {
        let machine = machine(
            "1",
            vec![
                Instruction::new("q0", '1', 'a', Move::Right, "!"),
                Instruction::new("q0", '1', 'b', Move::Right, "!"),
                Instruction::new("q0", '1', 'c', Move::Right, "!"),
            ],
        );

        let findings = analyze(&machine);
        assert_eq!(
            findings,
            vec![AnalysisError::DuplicateInstructions(vec![("q0".into(), '1')])]
        );
        assert!(!findings[0].is_fatal());
    }

    #[test]
    fn test_final_state_unreachable() {
        let machine = machine(
            "",
            vec![
                Instruction::new("q0", 'λ', 'λ', Move::Right, "q1"),
                Instruction::new("q2", 'λ', 'λ', Move::Right, "!"),
            ],
        );

        // "q2" leads into the final state, but nothing leads from "q0" to "q2".
        let findings = analyze(&machine);
        assert_eq!(
            findings,
            vec![AnalysisError::FinalStateUnreachable("!".into())]
        );
        assert_eq!(
            findings[0].to_string(),
            "Final state '!' is not reachable from the initial state"
        );
    }

    #[test]
    fn test_invalid_start_state() {
        let machine = machine("", vec![Instruction::new("q1", 'λ', 'λ', Move::Right, "!")]);

        let findings = analyze(&machine);
        assert!(findings.contains(&AnalysisError::InvalidStartState("q0".into())));
    }

    #[test]
    fn test_unhandled_tape_symbols() {
        let machine = machine(
            "abca",
            vec![Instruction::new("q0", 'a', 'a', Move::Right, "!")],
        );

        assert_eq!(
            analyze(&machine),
            vec![AnalysisError::InvalidTapeSymbols(vec!['b', 'c'])]
        );
    }

    #[test]
    fn test_unregistered_states_are_fatal() {
        let states = StateRegistry::new().with("q0", "q0");
        let machine = machine("", vec![Instruction::new("q0", 'λ', 'λ', Move::Right, "!")])
            .with_states(states);

        let findings = analyze(&machine);
        assert_eq!(
            findings[0],
            AnalysisError::UnregisteredStates(vec!["!".into()])
        );

        let error = validate(&machine).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: States not found in the state registry: '!'"
        );
    }

    #[test]
    fn test_zero_step_budget() {
        let mut machine = machine("", vec![Instruction::new("q0", 'λ', 'λ', Move::Right, "!")]);
        machine.set_options(OptionsUpdate {
            max_steps: Some(0),
            ..Default::default()
        });

        assert!(matches!(
            validate(&machine),
            Err(MachineError::ValidationError(_))
        ));
    }
}
