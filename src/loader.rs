//! This module provides the `ProgramLoader` struct, responsible for loading `.tm` programs
//! and JSON machine snapshots from disk, and for saving snapshots back.

use crate::machine::TuringMachine;
use crate::parser::parse;
use crate::types::{MachineError, Program};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of text programs.
pub const PROGRAM_EXTENSION: &str = "tm";
/// File extension of machine snapshots.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// `ProgramLoader` is a utility struct for loading machines.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, MachineError> {
        parse(&read(path)?)
    }

    /// Loads a single program from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, MachineError> {
        parse(content)
    }

    /// Loads a machine from either kind of file.
    ///
    /// `.json` files are read as snapshots written by [`ProgramLoader::save_machine`],
    /// which restores the live configuration as well; anything else is parsed as a program.
    pub fn load_machine(path: &Path) -> Result<TuringMachine, MachineError> {
        if path.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION) {
            TuringMachine::from_json(&read(path)?)
        } else {
            Ok(TuringMachine::from_program(&Self::load_program(path)?))
        }
    }

    /// Writes a JSON snapshot of `machine` to `path`.
    pub fn save_machine(path: &Path, machine: &TuringMachine) -> Result<(), MachineError> {
        fs::write(path, machine.to_json()?).map_err(|e| {
            MachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })
    }

    /// Loads all program files (`.tm` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// path and its program, or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir() || !path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION) {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(program) => Some(Ok((path, program))),
                    Err(e) => Some(Err(MachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

fn read(path: &Path) -> Result<String, MachineError> {
    fs::read_to_string(path).map_err(|e| {
        MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "name: Test Program\ntape: a\nrules:\n  q0, a -> b, R, !";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.tm");
        write_file(&file_path, VALID);

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.name, "Test Program");
        assert_eq!(program.input, "a");
        assert_eq!(program.instructions.len(), 1);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        assert!(ProgramLoader::load_program(&file_path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let error = ProgramLoader::load_program(&dir.path().join("missing.tm")).unwrap_err();

        assert!(matches!(error, MachineError::FileError(_)));
    }

    #[test]
    fn test_save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let snapshot_path = dir.path().join("machine.json");

        let mut machine = ProgramLoader::load_program_from_string(VALID)
            .map(|program| TuringMachine::from_program(&program))
            .unwrap();
        machine.step().unwrap();

        ProgramLoader::save_machine(&snapshot_path, &machine).unwrap();
        let restored = ProgramLoader::load_machine(&snapshot_path).unwrap();

        assert_eq!(restored, machine);
        assert_eq!(restored.tape_value(), "b");
        assert!(restored.is_final());
    }

    #[test]
    fn test_load_machine_from_program_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("walk.tm");
        write_file(&file_path, VALID);

        let machine = ProgramLoader::load_machine(&file_path).unwrap();
        assert_eq!(machine.tape_value(), "a");
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), VALID);
        write_file(&dir.path().join("invalid.tm"), "This is not a valid program");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let results = ProgramLoader::load_programs(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_programs_from_missing_directory() {
        let results = ProgramLoader::load_programs(Path::new("/definitely/not/here"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
