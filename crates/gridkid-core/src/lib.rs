//! # gridkid-core
//!
//! Core data structures for the gridkid formula grid.
//!
//! This crate provides the types every other gridkid crate builds on:
//! - [`CellAddress`] and [`CellRange`] - Cell coordinates and rectangular ranges
//! - [`Cell`] - An address paired with the formula text stored there
//! - [`Grid`] - The mapping from address to cell
//!
//! ## Example
//!
//! ```rust
//! use gridkid_core::{CellAddress, Grid};
//!
//! let mut grid = Grid::new();
//! let addr = CellAddress::parse("{A,1}").unwrap();
//! grid.insert(addr, "4 ** 2");
//!
//! assert_eq!(grid.lookup(&addr).map(|c| c.formula()), Some("4 ** 2"));
//! ```

pub mod cell;
pub mod error;
pub mod grid;

pub use cell::{Cell, CellAddress, CellRange, CellRangeIterator};
pub use error::{Error, Result};
pub use grid::Grid;
