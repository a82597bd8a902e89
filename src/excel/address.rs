//! A1-style cell addresses

use crate::error::{PlanillaError, PlanillaResult};
use regex::Regex;
use std::fmt;

/// Zero-based cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `C7`, `$K$1` or `aa10` into zero-based coordinates.
    pub fn parse(address: &str) -> PlanillaResult<Self> {
        let pattern = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$")
            .map_err(|e| PlanillaError::InvalidCell(format!("Regex error: {}", e)))?;

        let trimmed = address.trim();
        let captures = pattern
            .captures(trimmed)
            .ok_or_else(|| PlanillaError::InvalidCell(address.to_string()))?;

        let col = column_letter_to_index(&captures[1])?;
        let row: u32 = captures[2]
            .parse()
            .map_err(|_| PlanillaError::InvalidCell(address.to_string()))?;
        if row == 0 {
            return Err(PlanillaError::InvalidCell(address.to_string()));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Same column, `rows` further down.
    pub fn offset_rows(self, rows: u32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_index_to_letter(self.col), self.row + 1)
    }
}

/// Column letters to zero-based index (A→0, Z→25, AA→26).
pub fn column_letter_to_index(letters: &str) -> PlanillaResult<u16> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return Err(PlanillaError::InvalidCell(letters.to_string()));
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(PlanillaError::InvalidCell(letters.to_string()));
        }
        index = index * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    // XFD is the last Excel column
    if index > 16_384 {
        return Err(PlanillaError::InvalidCell(letters.to_string()));
    }
    Ok((index - 1) as u16)
}

/// Zero-based column index to letters (0→A, 25→Z, 26→AA).
pub fn column_index_to_letter(index: u16) -> String {
    let mut result = String::new();
    let mut num = index as usize;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}
