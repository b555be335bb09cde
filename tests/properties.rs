//! Property-based tests for the execution engine.
//!
//! Machines are generated over a small state and symbol space so that random
//! transition tables hit final states, missing instructions, and tape growth
//! in both directions.

use proptest::prelude::*;
use tape_machine::{Instruction, Move, OptionsUpdate, TuringMachine, DEFAULT_BLANK_SYMBOL};

const STATES: [&str; 3] = ["q0", "q1", "q2"];
const SYMBOLS: [char; 3] = ['0', '1', DEFAULT_BLANK_SYMBOL];

fn arbitrary_move() -> impl Strategy<Value = Move> {
    prop_oneof![Just(Move::Left), Just(Move::Right), Just(Move::Stay)]
}

prop_compose! {
    fn arbitrary_instruction()(
        state in 0..STATES.len(),
        symbol in 0..SYMBOLS.len(),
        new_symbol in 0..SYMBOLS.len(),
        movement in arbitrary_move(),
        // The extra slot stands for the final state.
        new_state in 0..=STATES.len(),
    ) -> Instruction {
        Instruction::new(
            STATES[state],
            SYMBOLS[symbol],
            SYMBOLS[new_symbol],
            movement,
            STATES.get(new_state).copied().unwrap_or("!"),
        )
    }
}

prop_compose! {
    fn arbitrary_machine()(
        input in "[01]{0,8}",
        instructions in prop::collection::vec(arbitrary_instruction(), 0..12),
        initial_position in -3i64..12,
    ) -> TuringMachine {
        TuringMachine::new(
            input,
            instructions,
            OptionsUpdate {
                initial_position: Some(initial_position),
                max_steps: Some(50),
                ..OptionsUpdate::default()
            },
        )
    }
}

proptest! {
    #[test]
    fn reading_the_condition_has_no_effect(machine in arbitrary_machine()) {
        let before = machine.clone();
        let first = machine.current_condition();
        let second = machine.current_condition();

        prop_assert_eq!(first, second);
        prop_assert_eq!(machine, before);
    }

    #[test]
    fn stepping_is_deterministic(machine in arbitrary_machine(), steps in 0usize..20) {
        let mut left = machine.clone();
        let mut right = machine;

        for _ in 0..steps {
            prop_assert_eq!(left.step(), right.step());
        }
        prop_assert_eq!(left.current_condition(), right.current_condition());
    }

    #[test]
    fn failed_step_leaves_machine_untouched(machine in arbitrary_machine(), steps in 0usize..20) {
        let mut machine = machine;

        for _ in 0..steps {
            let before = machine.clone();
            if machine.step().is_err() {
                prop_assert_eq!(&machine, &before);
                break;
            }
        }
    }

    #[test]
    fn final_state_is_absorbing(machine in arbitrary_machine()) {
        let mut machine = machine;
        let _ = machine.run();

        if machine.is_final() {
            let before = machine.current_condition();
            prop_assert_eq!(machine.step(), Ok(before.tape_value.clone()));
            prop_assert_eq!(machine.current_condition(), before);
        }
    }

    #[test]
    fn head_stays_on_the_tape_after_a_step(machine in arbitrary_machine(), steps in 1usize..20) {
        let mut machine = machine;

        for _ in 0..steps {
            if machine.is_final() || machine.step().is_err() {
                break;
            }
            // Moving right off the end is the only way past the last cell.
            prop_assert!(machine.head_position() >= 0);
            prop_assert!(machine.head_position() as usize <= machine.tape().len());
        }
    }

    #[test]
    fn reset_restores_the_initial_configuration(
        machine in arbitrary_machine(),
        steps in 0usize..20,
    ) {
        let pristine = machine.clone();
        let mut machine = machine;

        for _ in 0..steps {
            if machine.step().is_err() {
                break;
            }
        }
        machine.reset();

        prop_assert_eq!(machine, pristine);
    }

    #[test]
    fn blank_substitution_commutes_with_stepping(
        machine in arbitrary_machine(),
        steps in 0usize..20,
    ) {
        let mut original = machine.clone();
        let mut substituted = machine;
        prop_assert!(substituted.set_blank_symbol('B').is_ok());

        for _ in 0..steps {
            prop_assert_eq!(original.step().is_ok(), substituted.step().is_ok());

            let expected = original.tape_value().replace(DEFAULT_BLANK_SYMBOL, "B");
            prop_assert_eq!(substituted.tape_value(), expected);
            prop_assert_eq!(substituted.state(), original.state());
            prop_assert_eq!(substituted.head_position(), original.head_position());
            prop_assert_eq!(substituted.step_count(), original.step_count());
        }
    }
}
