//! This module defines the `TuringMachine` struct, which simulates a deterministic single-tape
//! Turing Machine. It owns the input, the transition table, the run options, and the live
//! configuration (tape, state, head position, step count), and derives a `Condition`
//! snapshot from them on demand.

use crate::states::StateRegistry;
use crate::tape::Tape;
use crate::types::{
    referenced_states, Condition, ConditionUpdate, Instruction, MachineError, Options,
    OptionsUpdate, Program, RunOutcome, StateId, DEFAULT_BLANK_SYMBOL,
};
use serde::{Deserialize, Serialize};

/// The mutable core of a running machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Configuration {
    tape_value: Tape,
    state: StateId,
    head_position: i64,
    step: usize,
}

/// A single-tape Turing Machine.
///
/// `Clone` is a deep copy: the clone evolves independently of the original, which is how
/// callers get undo-style "copy, mutate, replace" semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuringMachine {
    input: String,
    instructions: Vec<Instruction>,
    options: Options,
    #[serde(default = "default_blank")]
    blank: char,
    current: Configuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    states: Option<StateRegistry>,
}

fn default_blank() -> char {
    DEFAULT_BLANK_SYMBOL
}

impl TuringMachine {
    /// The blank symbol a machine starts with unless told otherwise.
    pub const BLANK_SYMBOL: char = DEFAULT_BLANK_SYMBOL;

    /// Creates a new machine.
    ///
    /// `options` is merged over the defaults; the head starts at `initial_position`
    /// in `initial_state` with the tape holding `input`.
    ///
    /// ```
    /// use tape_machine::{Instruction, Move, OptionsUpdate, TuringMachine};
    ///
    /// // Change the first 1 to 0 and stop.
    /// let mut machine = TuringMachine::new(
    ///     "101",
    ///     vec![Instruction::new("q0", '1', '0', Move::Stay, "!")],
    ///     OptionsUpdate::default(),
    /// );
    /// assert_eq!(machine.step().unwrap(), "001");
    /// ```
    pub fn new(
        input: impl Into<String>,
        instructions: Vec<Instruction>,
        options: OptionsUpdate,
    ) -> Self {
        let input = input.into();
        let options = Options::default().merged(options);

        Self {
            current: Configuration {
                tape_value: Tape::new(&input),
                state: options.initial_state.clone(),
                head_position: options.initial_position,
                step: 0,
            },
            input,
            instructions,
            options,
            blank: DEFAULT_BLANK_SYMBOL,
            states: None,
        }
    }

    /// Creates a machine from a parsed program.
    pub fn from_program(program: &Program) -> Self {
        Self::new(
            program.input.clone(),
            program.instructions.clone(),
            program.options.clone().into(),
        )
        .with_blank_symbol(program.blank)
    }

    /// Sets the blank symbol without migrating existing symbols.
    ///
    /// Use this when the input and instructions were already written with `blank`.
    pub fn with_blank_symbol(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    /// Attaches a state registry, enabling the unknown-state check during lookup.
    pub fn with_states(mut self, states: StateRegistry) -> Self {
        self.states = Some(states);
        self
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the stored input. The live tape picks it up on the next `reset`.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) {
        self.instructions = instructions;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Merges `update` into the current options. The live configuration is left as is.
    pub fn set_options(&mut self, update: OptionsUpdate) {
        self.options = self.options.merged(update);
    }

    /// Returns every state the options and instructions mention, in order of first appearance.
    pub fn referenced_states(&self) -> Vec<StateId> {
        referenced_states(&self.options, &self.instructions)
    }

    pub fn states(&self) -> Option<&StateRegistry> {
        self.states.as_ref()
    }

    /// Returns the attached registry, attaching an empty one first if there is none.
    pub fn states_mut(&mut self) -> &mut StateRegistry {
        self.states.get_or_insert_with(StateRegistry::new)
    }

    pub fn set_states(&mut self, states: Option<StateRegistry>) {
        self.states = states;
    }

    /// Returns the blank symbol used by this machine.
    pub fn blank_symbol(&self) -> char {
        self.blank
    }

    /// Overwrites parts of the live configuration directly, bypassing transition logic.
    pub fn set_current_condition(&mut self, update: ConditionUpdate) {
        if let Some(tape_value) = update.tape_value {
            self.current.tape_value = Tape::new(&tape_value);
        }
        if let Some(state) = update.state {
            self.current.state = state;
        }
        if let Some(head_position) = update.head_position {
            self.current.head_position = head_position;
        }
        if let Some(step) = update.step {
            self.current.step = step;
        }
    }

    /// Derives the current condition. Never mutates; a failed lookup yields `instruction: None`.
    pub fn current_condition(&self) -> Condition {
        let symbol = self.symbol();

        Condition {
            tape_value: self.tape_value(),
            state: self.current.state.clone(),
            head_position: self.current.head_position,
            step: self.current.step,
            symbol,
            instruction: self.lookup(&self.current.state, symbol).ok().cloned(),
            is_final: self.is_final(),
        }
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &StateId {
        &self.current.state
    }

    pub fn head_position(&self) -> i64 {
        self.current.head_position
    }

    /// Returns the total number of steps executed so far.
    pub fn step_count(&self) -> usize {
        self.current.step
    }

    pub fn tape(&self) -> &Tape {
        &self.current.tape_value
    }

    pub fn tape_value(&self) -> String {
        self.current.tape_value.to_string()
    }

    /// Returns the symbol under the head, or the blank symbol if the tape does not reach it.
    pub fn symbol(&self) -> char {
        self.current
            .tape_value
            .read(self.current.head_position, self.blank)
    }

    pub fn is_final(&self) -> bool {
        self.current.state == self.options.final_state
    }

    /// Finds the instruction for a (state, symbol) pair.
    ///
    /// When several instructions share the pair, the last one wins. If a state registry is
    /// attached, an unregistered `state` fails before the table is consulted.
    pub fn lookup(&self, state: &StateId, symbol: char) -> Result<&Instruction, MachineError> {
        if let Some(states) = &self.states {
            if !states.contains(state) {
                return Err(MachineError::UnknownState(state.clone()));
            }
        }

        self.instructions
            .iter()
            .rev()
            .find(|instruction| instruction.matches(state, symbol))
            .ok_or_else(|| MachineError::NoInstruction {
                state: state.clone(),
                symbol,
            })
    }

    /// Executes a single step and returns the new tape value.
    ///
    /// In the final state this is a no-op that returns the unchanged tape. A failed lookup,
    /// or a step that would grow the tape past `MAX_TAPE_SIZE`, leaves the machine untouched.
    pub fn step(&mut self) -> Result<String, MachineError> {
        if self.is_final() {
            return Ok(self.tape_value());
        }

        let symbol = self.symbol();
        let instruction = self.lookup(&self.current.state, symbol)?.clone();
        self.check_growth(&instruction)?;
        self.execute(&instruction)?;

        Ok(self.tape_value())
    }

    /// Fails if executing `instruction` would grow the tape past its size limit.
    fn check_growth(&self, instruction: &Instruction) -> Result<(), MachineError> {
        let head_position = self.current.head_position;
        // The write lands on index 0 for any head at or left of the first cell.
        let prepends = head_position <= 0 && instruction.movement.offset() < 0;

        Tape::ensure_fits(
            self.current
                .tape_value
                .len_reaching(head_position)
                .saturating_add(u64::from(prepends)),
        )
    }

    /// Commits tape growth, write, move, state change, and step count together.
    fn execute(&mut self, instruction: &Instruction) -> Result<(), MachineError> {
        let blank = self.blank;
        let current = &mut self.current;

        let index =
            current
                .tape_value
                .write(current.head_position, instruction.new_symbol, blank)? as i64;

        let mut head_position = index + instruction.movement.offset();
        if head_position < 0 {
            // Only blanks exist left of the tape: grow it and keep the head on the new cell.
            current.tape_value.prepend(blank)?;
            head_position = 0;
        }

        current.head_position = head_position;
        current.state = instruction.new_state.clone();
        current.step += 1;

        Ok(())
    }

    /// Steps until the final state is reached, collecting the condition before each step.
    ///
    /// Fails with `MaxStepsExceeded` if `max_steps` steps do not reach the final state; the
    /// log collected so far is dropped and the machine keeps the configuration it reached.
    /// On an already final machine the tape is returned with an empty log.
    pub fn run(&mut self) -> Result<RunOutcome, MachineError> {
        let mut logs = Vec::new();

        if self.is_final() {
            return Ok(RunOutcome {
                result: self.tape_value(),
                logs,
            });
        }

        for _ in 0..self.options.max_steps {
            logs.push(self.current_condition());
            let result = self.step()?;

            if self.is_final() {
                return Ok(RunOutcome { result, logs });
            }
        }

        Err(MachineError::MaxStepsExceeded(self.options.max_steps))
    }

    /// Resets the Turing Machine to its initial configuration.
    /// This restores the tape from the input, the initial state and position, and step 0.
    /// The blank symbol is kept.
    pub fn reset(&mut self) {
        self.current = Configuration {
            tape_value: Tape::new(&self.input),
            state: self.options.initial_state.clone(),
            head_position: self.options.initial_position,
            step: 0,
        };
    }

    /// Replaces the blank symbol, rewriting every occurrence of the old one in the input,
    /// the tape, and the instructions.
    ///
    /// Fails if `blank` is already used as an ordinary symbol, since the rewrite would
    /// merge it with the old blank.
    pub fn set_blank_symbol(&mut self, blank: char) -> Result<(), MachineError> {
        let old = self.blank;
        if blank == old {
            return Ok(());
        }

        if self.uses_symbol(blank) {
            return Err(MachineError::ValidationError(format!(
                "Symbol '{blank}' is already in use and cannot become the blank symbol"
            )));
        }

        let swap = |c: char| if c == old { blank } else { c };

        self.input = self.input.chars().map(swap).collect();
        self.current.tape_value.replace(old, blank);
        for instruction in &mut self.instructions {
            instruction.symbol = swap(instruction.symbol);
            instruction.new_symbol = swap(instruction.new_symbol);
        }
        self.blank = blank;

        Ok(())
    }

    fn uses_symbol(&self, symbol: char) -> bool {
        self.input.contains(symbol)
            || self.current.tape_value.contains(symbol)
            || self
                .instructions
                .iter()
                .any(|i| i.symbol == symbol || i.new_symbol == symbol)
    }

    /// Exports the machine (input, instructions, options, blank, live configuration, and
    /// state registry) as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, MachineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a machine exported with [`TuringMachine::to_json`].
    pub fn from_json(json: &str) -> Result<Self, MachineError> {
        Ok(serde_json::from_str(json)?)
    }
}
