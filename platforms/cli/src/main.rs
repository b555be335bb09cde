use clap::Parser;
use std::path::PathBuf;
use std::process;
use tape_machine::{
    analyze, rewrite_blank, Condition, MachineError, OptionsUpdate, ProgramLoader,
    ProgramManager, TuringMachine,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The program file to execute (`.tm` program or `.json` snapshot)
    #[clap(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// Name of a built-in program to execute
    #[clap(short, long)]
    builtin: Option<String>,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,

    /// Replace the input on the tape
    #[clap(short, long)]
    input: Option<String>,

    /// Replace the blank symbol
    #[clap(long)]
    blank: Option<char>,

    /// Override the maximum number of steps
    #[clap(short, long)]
    max_steps: Option<usize>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Write a JSON snapshot of the machine after execution
    #[clap(short, long)]
    export: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if cli.list {
        list_programs();
        return;
    }

    if let Err(e) = execute(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn list_programs() {
    for index in 0..ProgramManager::get_program_count() {
        if let Ok(info) = ProgramManager::get_program_info(index) {
            println!(
                "{}: {} (input: {}, states: {}, instructions: {})",
                info.index, info.name, info.input, info.state_count, info.instruction_count
            );
        }
    }
}

fn load(cli: &Cli) -> Result<TuringMachine, MachineError> {
    match (&cli.program, &cli.builtin) {
        (Some(path), _) => ProgramLoader::load_machine(path),
        (None, Some(name)) => {
            ProgramManager::get_program_by_name(name).map(|p| TuringMachine::from_program(&p))
        }
        (None, None) => Err(MachineError::ValidationError(
            "Either --program or --builtin is required".to_string(),
        )),
    }
}

fn execute(cli: &Cli) -> Result<(), MachineError> {
    let mut machine = load(cli)?;

    if let Some(blank) = cli.blank {
        machine.set_blank_symbol(blank)?;
    }

    if let Some(max_steps) = cli.max_steps {
        machine.set_options(OptionsUpdate {
            max_steps: Some(max_steps),
            ..OptionsUpdate::default()
        });
    }

    if let Some(input) = &cli.input {
        replace_input(&mut machine, input);
    }

    for finding in analyze(&machine) {
        eprintln!("Warning: {}", finding);
    }

    let result = if cli.debug {
        trace(&mut machine)
    } else {
        machine.run().map(|outcome| outcome.result)
    };

    // The configuration reached is exported even when the run fails.
    if let Some(path) = &cli.export {
        ProgramLoader::save_machine(path, &machine)?;
    }

    println!("{}", result?);
    Ok(())
}

/// Loads `input` onto the tape, reading `_` as the blank symbol like `.tm` files do.
fn replace_input(machine: &mut TuringMachine, input: &str) {
    machine.set_input(rewrite_blank(input, machine.blank_symbol()));
    machine.reset();
}

/// Steps like `TuringMachine::run`, printing every condition along the way.
/// The step budget counts from the current step, so resumed snapshots get a full budget.
fn trace(machine: &mut TuringMachine) -> Result<String, MachineError> {
    let print_condition = |condition: &Condition| {
        println!(
            "Step: {}, State: {}, Tape: {}, Head: {}, Symbol: {}",
            condition.step,
            condition.state,
            condition.tape_value,
            condition.head_position,
            condition.symbol
        );
    };

    let max_steps = machine.options().max_steps;
    print_condition(&machine.current_condition());

    for _ in 0..max_steps {
        if machine.is_final() {
            break;
        }

        machine.step()?;
        print_condition(&machine.current_condition());
    }

    if !machine.is_final() {
        return Err(MachineError::MaxStepsExceeded(max_steps));
    }

    println!("\nMachine halted.");
    Ok(machine.tape_value())
}
