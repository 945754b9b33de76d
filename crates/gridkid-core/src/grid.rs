//! Grid type

use ahash::AHashMap;

use crate::cell::{Cell, CellAddress, CellRange};

/// The grid: a sparse mapping from address to cell
///
/// Keys are unique; iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: AHashMap<CellAddress, Cell>,
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cell at `address`
    pub fn lookup(&self, address: &CellAddress) -> Option<&Cell> {
        self.cells.get(address)
    }

    /// Store `formula` at `address`, returning the cell it replaced
    pub fn insert(&mut self, address: CellAddress, formula: impl Into<String>) -> Option<Cell> {
        self.cells.insert(address, Cell::new(address, formula))
    }

    /// Remove the cell at `address`
    pub fn remove(&mut self, address: &CellAddress) -> Option<Cell> {
        self.cells.remove(address)
    }

    /// Check whether a cell exists at `address`
    pub fn contains(&self, address: &CellAddress) -> bool {
        self.cells.contains_key(address)
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all cells, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Addresses of the stored cells inside `range`, column by column
    ///
    /// Same order as [`CellRange::cells`], but only occupied addresses are
    /// returned. Small rectangles are scanned; rectangles larger than the
    /// grid are answered from the stored cells instead.
    pub fn occupied_in(&self, range: &CellRange) -> Vec<CellAddress> {
        let scan = range
            .cell_count()
            .is_some_and(|count| count <= self.cells.len() as u128);

        if scan {
            return range.cells().filter(|addr| self.contains(addr)).collect();
        }

        let mut addresses: Vec<_> = self
            .cells
            .keys()
            .filter(|addr| range.contains(addr))
            .copied()
            .collect();
        addresses.sort_unstable();
        addresses
    }
}
