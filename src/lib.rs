//! This crate provides the core logic for a single-tape Turing machine simulator.
//! It includes the execution engine, a state registry, a static analyzer, a parser for
//! `.tm` program files, an editing session with an execution log, and a catalogue of
//! predefined programs.

pub mod alphabet;
pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod session;
pub mod states;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the alphabet helpers.
pub use alphabet::{create_alphabet, rewrite_blank, validate_string};
/// Re-exports the analyzer entry points and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, validate, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use session::{Action, LogEntry, Session};
pub use states::StateRegistry;
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Condition, ConditionUpdate, Instruction, MachineError, Move, Options, OptionsUpdate, Program,
    RunOutcome, StateId, DEFAULT_BLANK_SYMBOL, DEFAULT_MAX_STEPS, INPUT_BLANK_SYMBOL,
    MAX_PROGRAM_SIZE, MAX_TAPE_SIZE,
};
