//! The machine's tape: a finite run of cells addressed by a signed head position.
//! Cells outside `[0, len)` read as the blank symbol until a write grows the tape to reach them.

use crate::types::{MachineError, MAX_TAPE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tape {
    cells: Vec<char>,
}

impl Tape {
    pub fn new(content: &str) -> Self {
        Self {
            cells: content.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// Returns the symbol at `position`, or `blank` if the tape does not reach it.
    pub fn read(&self, position: i64, blank: char) -> char {
        usize::try_from(position)
            .ok()
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(blank)
    }

    /// Returns how many cells the tape would hold after [`Tape::reach`] at `position`.
    pub fn len_reaching(&self, position: i64) -> u64 {
        let len = self.cells.len() as u64;

        if position < 0 {
            len.saturating_add(position.unsigned_abs())
        } else {
            len.max(position as u64 + 1)
        }
    }

    /// Fails if a tape of `cells` cells would exceed [`MAX_TAPE_SIZE`].
    pub fn ensure_fits(cells: u64) -> Result<(), MachineError> {
        if cells > MAX_TAPE_SIZE as u64 {
            return Err(MachineError::ValidationError(format!(
                "Tape cannot grow beyond {MAX_TAPE_SIZE} cells"
            )));
        }

        Ok(())
    }

    /// Grows the tape with `blank` cells until `position` is addressable and returns the
    /// index of that same cell afterwards.
    ///
    /// A negative position pads on the left, shifting existing content right, so the
    /// returned index is `0`. A position at or past the end pads on the right up to and
    /// including it. Growth past [`MAX_TAPE_SIZE`] fails and leaves the tape as is.
    pub fn reach(&mut self, position: i64, blank: char) -> Result<usize, MachineError> {
        Self::ensure_fits(self.len_reaching(position))?;

        if position < 0 {
            let pad = position.unsigned_abs() as usize;
            self.cells.splice(0..0, std::iter::repeat(blank).take(pad));
            return Ok(0);
        }

        let index = position as usize;
        if index >= self.cells.len() {
            self.cells.resize(index + 1, blank);
        }

        Ok(index)
    }

    /// Writes `symbol` at `position`, growing the tape first if needed.
    /// Returns the index of the written cell.
    pub fn write(
        &mut self,
        position: i64,
        symbol: char,
        blank: char,
    ) -> Result<usize, MachineError> {
        let index = self.reach(position, blank)?;
        self.cells[index] = symbol;
        Ok(index)
    }

    /// Inserts one blank cell before the first cell.
    pub fn prepend(&mut self, blank: char) -> Result<(), MachineError> {
        Self::ensure_fits(self.cells.len() as u64 + 1)?;
        self.cells.insert(0, blank);
        Ok(())
    }

    /// Rewrites every occurrence of `from` to `to`.
    pub fn replace(&mut self, from: char, to: char) {
        for cell in self.cells.iter_mut().filter(|cell| **cell == from) {
            *cell = to;
        }
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.cells.contains(&symbol)
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

impl From<String> for Tape {
    fn from(content: String) -> Self {
        Tape::new(&content)
    }
}

impl From<&str> for Tape {
    fn from(content: &str) -> Self {
        Tape::new(content)
    }
}

impl From<Tape> for String {
    fn from(tape: Tape) -> Self {
        tape.to_string()
    }
}
