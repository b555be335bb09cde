//! A caller-side controller around a `TuringMachine`.
//!
//! `Session` keeps the machine together with the alphabet and an execution log, applies
//! every edit copy-on-write (clone, mutate, replace), and records run-time failures as
//! typed log entries instead of returning them.

use crate::alphabet::create_alphabet;
use crate::machine::TuringMachine;
use crate::states::StateRegistry;
use crate::types::{Condition, ConditionUpdate, Instruction, MachineError, OptionsUpdate, StateId};

/// What `Session::execute` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Step,
}

/// One record of the execution log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// The condition before an executed step.
    Condition(Condition),
    /// A step or run that failed.
    Failure(MachineError),
}

impl LogEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self, LogEntry::Failure(_))
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    machine: TuringMachine,
    alphabet: Vec<char>,
    logs: Vec<LogEntry>,
}

impl Session {
    /// Wraps `machine`. If it has no state registry, one is built from every state the
    /// options and instructions mention.
    pub fn new(mut machine: TuringMachine) -> Self {
        if machine.states().is_none() {
            let referenced = machine.referenced_states();
            machine.set_states(Some(StateRegistry::from_ids(&referenced)));
        }

        let blank = machine.blank_symbol();
        let symbols: String = machine
            .input()
            .chars()
            .chain(
                machine
                    .instructions()
                    .iter()
                    .flat_map(|i| [i.symbol, i.new_symbol]),
            )
            .filter(|&c| c != blank)
            .collect();

        Self {
            alphabet: create_alphabet(&symbols),
            machine,
            logs: Vec::new(),
        }
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn set_machine(&mut self, machine: TuringMachine) {
        self.machine = machine;
    }

    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) {
        let mut next = self.machine.clone();
        next.set_instructions(instructions);
        self.machine = next;
    }

    /// Steps or runs the machine.
    ///
    /// Fails with `AlreadyFinal` if the machine already sits in the final state. Any other
    /// failure is appended to the log as `LogEntry::Failure` and `Ok(())` is returned. On a
    /// failed run the conditions of that run are not logged, and the machine keeps the
    /// configuration it reached.
    pub fn execute(&mut self, action: Action) -> Result<(), MachineError> {
        if self.machine.is_final() {
            return Err(MachineError::AlreadyFinal(self.machine.state().clone()));
        }

        let mut next = self.machine.clone();

        match action {
            Action::Run => match next.run() {
                Ok(outcome) => self
                    .logs
                    .extend(outcome.logs.into_iter().map(LogEntry::Condition)),
                Err(error) => self.logs.push(LogEntry::Failure(error)),
            },
            Action::Step => {
                let condition = next.current_condition();
                match next.step() {
                    Ok(_) => self.logs.push(LogEntry::Condition(condition)),
                    Err(error) => self.logs.push(LogEntry::Failure(error)),
                }
            }
        }

        self.machine = next;
        Ok(())
    }

    /// Resets the machine and clears the log.
    pub fn reset(&mut self) {
        let mut next = self.machine.clone();
        next.reset();
        self.machine = next;
        self.logs.clear();
    }

    /// Moves the head, optionally making the position the initial one as well.
    pub fn set_head_position(&mut self, position: i64, is_initial: bool) {
        let mut next = self.machine.clone();
        next.set_current_condition(ConditionUpdate {
            head_position: Some(position),
            ..Default::default()
        });

        if is_initial {
            next.set_options(OptionsUpdate {
                initial_position: Some(position),
                ..Default::default()
            });
        }

        self.machine = next;
    }

    /// Applies `update` to the machine options.
    ///
    /// An unregistered initial state is replaced by the first registered non-final state.
    /// While no step has been taken, the live state and head follow the new options.
    pub fn set_options(&mut self, mut update: OptionsUpdate) {
        if let Some(initial_state) = &update.initial_state {
            if !self.is_registered(initial_state) {
                update.initial_state = Self::first_non_final(&self.machine, None);
            }
        }

        let mut next = self.machine.clone();
        next.set_options(update.clone());

        if next.step_count() == 0 {
            next.set_current_condition(ConditionUpdate {
                state: update.initial_state,
                head_position: update.initial_position,
                ..Default::default()
            });
        }

        self.machine = next;
    }

    /// Replaces the alphabet and drops every instruction that reads or writes a symbol
    /// outside the alphabet and the blank symbol.
    pub fn set_alphabet(&mut self, alphabet: &[char]) {
        let alphabet = create_alphabet(&alphabet.iter().collect::<String>());
        let blank = self.machine.blank_symbol();
        let allowed = |c: char| c == blank || alphabet.contains(&c);

        let instructions = self
            .machine
            .instructions()
            .iter()
            .filter(|i| allowed(i.symbol) && allowed(i.new_symbol))
            .cloned()
            .collect();

        self.set_instructions(instructions);
        self.alphabet = alphabet;
    }

    /// Changes the blank symbol. It must not be part of the alphabet.
    pub fn set_blank_symbol(&mut self, blank: char) -> Result<(), MachineError> {
        if self.alphabet.contains(&blank) {
            return Err(MachineError::ValidationError(format!(
                "Symbol '{blank}' is already in the alphabet"
            )));
        }

        let mut next = self.machine.clone();
        next.set_blank_symbol(blank)?;
        self.machine = next;

        Ok(())
    }

    /// Registers a new index-keyed state and returns its identifier.
    ///
    /// The state becomes the initial and current state if those are not registered.
    pub fn add_state(&mut self) -> StateId {
        let mut next = self.machine.clone();
        let registry = next.states_mut();

        let index = registry
            .ids()
            .filter_map(|id| match id {
                StateId::Index(index) => Some(index + 1),
                StateId::Name(_) => None,
            })
            .max()
            .unwrap_or(0);
        let id = StateId::Index(index);

        let mut number = registry.len().saturating_sub(1);
        let name = loop {
            let candidate = format!("q{number}");
            if !registry.names().any(|name| name == candidate) {
                break candidate;
            }
            number += 1;
        };
        registry.insert(id.clone(), name);

        if !next.states().is_some_and(|r| r.contains(&next.options().initial_state)) {
            next.set_options(OptionsUpdate {
                initial_state: Some(id.clone()),
                ..Default::default()
            });
        }
        if !next.states().is_some_and(|r| r.contains(next.state())) {
            next.set_current_condition(ConditionUpdate {
                state: Some(id.clone()),
                ..Default::default()
            });
        }

        self.machine = next;
        id
    }

    pub fn rename_state(
        &mut self,
        id: &StateId,
        name: impl Into<String>,
    ) -> Result<(), MachineError> {
        if !self.is_registered(id) {
            return Err(MachineError::UnknownState(id.clone()));
        }

        let mut next = self.machine.clone();
        next.states_mut().insert(id.clone(), name);
        self.machine = next;

        Ok(())
    }

    /// Removes a state and every instruction that starts from or leads to it.
    ///
    /// Options and the live state that pointed at it move to the first remaining
    /// non-final state.
    pub fn delete_state(&mut self, id: &StateId) -> Result<(), MachineError> {
        if !self.is_registered(id) {
            return Err(MachineError::UnknownState(id.clone()));
        }

        let mut next = self.machine.clone();
        next.states_mut().remove(id);

        let instructions = next
            .instructions()
            .iter()
            .filter(|i| &i.state != id && &i.new_state != id)
            .cloned()
            .collect();
        next.set_instructions(instructions);

        let fallback = Self::first_non_final(&next, Some(id));
        let repoint = |state: &StateId| (state == id).then(|| fallback.clone()).flatten();

        let options = next.options();
        let update = OptionsUpdate {
            initial_state: repoint(&options.initial_state),
            final_state: repoint(&options.final_state),
            ..Default::default()
        };
        let state = repoint(next.state());

        next.set_options(update);
        next.set_current_condition(ConditionUpdate {
            state,
            ..Default::default()
        });

        self.machine = next;
        Ok(())
    }

    fn is_registered(&self, id: &StateId) -> bool {
        self.machine.states().is_some_and(|r| r.contains(id))
    }

    fn first_non_final(machine: &TuringMachine, excluding: Option<&StateId>) -> Option<StateId> {
        let final_state = &machine.options().final_state;

        machine
            .states()?
            .ids()
            .find(|id| *id != final_state && Some(*id) != excluding)
            .cloned()
    }
}
