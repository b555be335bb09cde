use crate::types::{MachineError, Program};

// Default embedded programs
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/bit-flip.tm"),
    include_str!("../programs/binary-increment.tm"),
    include_str!("../programs/unary-addition.tm"),
    include_str!("../programs/palindrome.tm"),
];

lazy_static::lazy_static! {
    /// Embedded programs, parsed on first access.
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(program) => Some(program),
            Err(e) => {
                eprintln!("Failed to parse embedded program: {e}");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            MachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| MachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_state: program.options.initial_state.to_string(),
            final_state: program.options.final_state.to_string(),
            input: program.input.clone(),
            state_count: program.states().len(),
            instruction_count: program.instructions.len(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            MachineError::ValidationError(format!("Program text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub final_state: String,
    pub input: String,
    pub state_count: usize,
    pub instruction_count: usize,
}
