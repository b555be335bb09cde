//! This module defines the core data structures and types used throughout the Turing Machine
//! engine, including state identifiers, instructions, options, condition snapshots, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The blank symbol used when nothing else is configured.
pub const DEFAULT_BLANK_SYMBOL: char = 'λ';
/// A special input symbol used in program text to represent the machine's blank symbol.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The default step budget for `run`.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// The maximum allowed size for a program file in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The maximum number of cells a tape may grow to.
pub const MAX_TAPE_SIZE: usize = 1 << 20;

/// An opaque key naming a machine state.
///
/// Callers may key states by name (`"q0"`) or by a numeric index with a separate
/// display-name table (see [`crate::states::StateRegistry`]). The engine only ever
/// compares identifiers for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateId {
    Index(u64),
    Name(String),
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateId::Index(index) => write!(f, "{index}"),
            StateId::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        StateId::Name(name.to_string())
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        StateId::Name(name)
    }
}

impl From<u64> for StateId {
    fn from(index: u64) -> Self {
        StateId::Index(index)
    }
}

/// Represents the possible directions the head can move after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Move {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Move {
    /// Returns the signed change applied to the head position.
    pub fn offset(self) -> i64 {
        match self {
            Move::Left => -1,
            Move::Right => 1,
            Move::Stay => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Left => "L",
            Move::Right => "R",
            Move::Stay => "N",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = MachineError;

    /// Accepts `L`, `R`, and `N` (or `S`) for Left, Right, and Stay.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Move::Left),
            "R" => Ok(Move::Right),
            "N" | "S" => Ok(Move::Stay),
            other => Err(MachineError::InvalidMove(other.to_string())),
        }
    }
}

impl TryFrom<String> for Move {
    type Error = MachineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Move> for String {
    fn from(movement: Move) -> Self {
        movement.as_str().to_string()
    }
}

/// A single entry of the transition table.
///
/// Reading `symbol` while in `state` writes `new_symbol`, moves the head by `movement`,
/// and enters `new_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The state of the machine to execute the instruction.
    pub state: StateId,
    /// The symbol to read in the cell under the head.
    pub symbol: char,
    /// The symbol written in the cell.
    pub new_symbol: char,
    /// The direction in which the head moves after writing.
    pub movement: Move,
    /// The state of the machine after the instruction is executed.
    pub new_state: StateId,
}

impl Instruction {
    pub fn new(
        state: impl Into<StateId>,
        symbol: char,
        new_symbol: char,
        movement: Move,
        new_state: impl Into<StateId>,
    ) -> Self {
        Self {
            state: state.into(),
            symbol,
            new_symbol,
            movement,
            new_state: new_state.into(),
        }
    }

    /// Returns true if this instruction applies to the given (state, symbol) pair.
    pub fn matches(&self, state: &StateId, symbol: char) -> bool {
        &self.state == state && self.symbol == symbol
    }
}

/// Run options of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Reaching this state stops `run` successfully.
    pub final_state: StateId,
    /// The state the machine starts in and returns to on reset.
    pub initial_state: StateId,
    /// The initial head position, relative to the first symbol of the input.
    pub initial_position: i64,
    /// The maximum number of steps `run` executes before giving up.
    pub max_steps: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            final_state: "!".into(),
            initial_state: "q0".into(),
            initial_position: 0,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Options {
    /// Returns a copy of these options with every `Some` field of `update` applied.
    pub fn merged(&self, update: OptionsUpdate) -> Self {
        Self {
            final_state: update.final_state.unwrap_or_else(|| self.final_state.clone()),
            initial_state: update
                .initial_state
                .unwrap_or_else(|| self.initial_state.clone()),
            initial_position: update.initial_position.unwrap_or(self.initial_position),
            max_steps: update.max_steps.unwrap_or(self.max_steps),
        }
    }
}

/// A partial set of options. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_state: Option<StateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<StateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
}

impl From<Options> for OptionsUpdate {
    fn from(options: Options) -> Self {
        Self {
            final_state: Some(options.final_state),
            initial_state: Some(options.initial_state),
            initial_position: Some(options.initial_position),
            max_steps: Some(options.max_steps),
        }
    }
}

/// A read-only snapshot of the machine, derived on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub tape_value: String,
    pub state: StateId,
    /// May be negative or beyond the end of `tape_value`; those cells are blank.
    pub head_position: i64,
    pub step: usize,
    /// The symbol under the head.
    pub symbol: char,
    /// The instruction that the next step would execute, if any.
    pub instruction: Option<Instruction>,
    pub is_final: bool,
}

/// Direct edits to the live machine fields, bypassing transition logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tape_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

/// The result of a successful `run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The tape value once the final state was reached.
    pub result: String,
    /// The condition before each executed step, in order.
    pub logs: Vec<Condition>,
}

/// A machine definition as written in a `.tm` program file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The initial tape content, with blanks already rewritten to `blank`.
    pub input: String,
    /// The blank symbol used by the program.
    pub blank: char,
    pub options: Options,
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Returns the set of states used by the program, in order of first appearance.
    pub fn states(&self) -> Vec<StateId> {
        referenced_states(&self.options, &self.instructions)
    }
}

/// Collects the initial state, the final state, and every state the instructions mention,
/// without duplicates and in order of first appearance.
pub(crate) fn referenced_states(options: &Options, instructions: &[Instruction]) -> Vec<StateId> {
    let mut states: Vec<StateId> = Vec::new();
    let candidates = [&options.initial_state, &options.final_state]
        .into_iter()
        .chain(instructions.iter().flat_map(|i| [&i.state, &i.new_state]));

    for state in candidates {
        if !states.contains(state) {
            states.push(state.clone());
        }
    }

    states
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// No instruction matches the (state, symbol) pair.
    #[error("No instruction found for state '{state}' and symbol '{symbol}'")]
    NoInstruction { state: StateId, symbol: char },
    /// The state identifier is not part of the attached state registry.
    #[error("Unknown state '{0}'")]
    UnknownState(StateId),
    /// A move direction other than L, R, or N.
    #[error("Invalid move '{0}'")]
    InvalidMove(String),
    /// `run` did not reach the final state within the step budget.
    #[error("Maximum number of steps reached ({0})")]
    MaxStepsExceeded(usize),
    /// Execution was requested while the machine already sits in the final state.
    #[error("Machine has already finished in state '{0}'")]
    AlreadyFinal(StateId),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates that a machine snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::SerializationError(error.to_string())
    }
}
