//! Cell-related types
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., `{A,1}`)
//! - [`CellRange`] - A rectangle of cells between two corners
//! - [`Cell`] - An address together with its stored formula text

mod address;

pub use address::{CellAddress, CellRange, CellRangeIterator};

/// A single grid cell
///
/// The formula is kept as raw text; it is lexed and parsed each time the
/// cell is dereferenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    address: CellAddress,
    formula: String,
}

impl Cell {
    /// Create a cell at `address` holding `formula`
    pub fn new(address: CellAddress, formula: impl Into<String>) -> Self {
        Self {
            address,
            formula: formula.into(),
        }
    }

    /// The cell's address. Fixed for the lifetime of the cell.
    pub fn address(&self) -> CellAddress {
        self.address
    }

    /// The stored formula text, unparsed
    pub fn formula(&self) -> &str {
        &self.formula
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}", self.address, self.formula)
    }
}
