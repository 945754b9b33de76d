//! Cell address and range types

use crate::error::{Error, Result};
use lazy_regex::regex_captures;
use std::fmt;

/// A cell address (e.g., `{A,1}`)
///
/// `x` is the column, decoded from the letters (`A` = 1, `Z` = 26, `AA` = 27),
/// and `y` is the row, taken verbatim from the digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Column coordinate
    pub x: i64,
    /// Row coordinate
    pub y: i64,
}

impl CellAddress {
    /// Create a new cell address
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Parse a cell address from brace or parenthesis notation
    ///
    /// Both `{A,1}` (as written in formulas) and `(A,1)` (the grid key form)
    /// are accepted, with optional whitespace after the comma.
    ///
    /// # Examples
    /// ```
    /// use gridkid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("{A,1}").unwrap();
    /// assert_eq!(addr, CellAddress::new(1, 1));
    ///
    /// let addr = CellAddress::parse("(AB, 12)").unwrap();
    /// assert_eq!(addr, CellAddress::new(28, 12));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (_, letters, digits) = regex_captures!(r"^[{(]([A-Z]+),\s*([0-9]+)[})]$", s)
            .ok_or_else(|| Error::InvalidAddress(format!("'{}'", s)))?;

        let x = Self::letters_to_column(letters)?;
        let y = digits
            .parse::<i64>()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        Ok(Self { x, y })
    }

    /// Convert column letters to a coordinate (A = 1, Z = 26, AA = 27, etc.)
    pub fn letters_to_column(letters: &str) -> Result<i64> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: i64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(c as i64 - 'A' as i64 + 1))
                .ok_or_else(|| Error::InvalidAddress(format!("column too large: {}", letters)))?;
        }

        Ok(col)
    }

    /// Convert a column coordinate to letters (1 = A, 26 = Z, 27 = AA, etc.)
    ///
    /// Returns `None` for coordinates below 1, which have no letter form.
    pub fn column_to_letters(col: i64) -> Option<String> {
        if col < 1 {
            return None;
        }

        let mut result = String::new();
        let mut n = col;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }

        Some(result)
    }

    /// Format as a `{A,1}` reference, if the coordinates can be written that way
    pub fn to_reference_string(&self) -> Option<String> {
        if self.y < 0 {
            return None;
        }
        Self::column_to_letters(self.x).map(|letters| format!("{{{},{}}}", letters, self.y))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_reference_string() {
            Some(s) => f.write_str(&s),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}


/// A rectangular range of cells between two corners
///
/// The corners are kept exactly as given. Iteration always covers the
/// inclusive rectangle between them, whichever way round they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Corner given first (normally top-left)
    pub start: CellAddress,
    /// Corner given second (normally bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub const fn new(start: CellAddress, end: CellAddress) -> Self {
        Self { start, end }
    }

    /// Corner with the smallest coordinates
    pub fn top_left(&self) -> CellAddress {
        CellAddress::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y))
    }

    /// Corner with the largest coordinates
    pub fn bottom_right(&self) -> CellAddress {
        CellAddress::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y))
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        let (min, max) = (self.top_left(), self.bottom_right());
        addr.x >= min.x && addr.x <= max.x && addr.y >= min.y && addr.y <= max.y
    }

    /// Number of cells in the rectangle, or `None` if it does not fit a `u128`
    pub fn cell_count(&self) -> Option<u128> {
        let (min, max) = (self.top_left(), self.bottom_right());
        let width = (i128::from(max.x) - i128::from(min.x) + 1) as u128;
        let height = (i128::from(max.y) - i128::from(min.y) + 1) as u128;
        width.checked_mul(height)
    }

    /// Product of the coordinate spans, `(end.x - start.x) * (end.y - start.y)`
    ///
    /// This is not the cell count: a single row or column gives zero, and
    /// corners written right-to-left or bottom-to-top make it negative.
    /// Returns `None` on overflow.
    pub fn span_product(&self) -> Option<i64> {
        let dx = self.end.x.checked_sub(self.start.x)?;
        let dy = self.end.y.checked_sub(self.start.y)?;
        dx.checked_mul(dy)
    }

    /// Iterate over all cell addresses in the range, column by column
    pub fn cells(&self) -> CellRangeIterator {
        let min = self.top_left();
        CellRangeIterator {
            min,
            max: self.bottom_right(),
            current: Some(min),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Iterator over cells in a range
///
/// Yields every `y` for the first `x`, then moves to the next column.
pub struct CellRangeIterator {
    min: CellAddress,
    max: CellAddress,
    current: Option<CellAddress>,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let addr = self.current?;

        self.current = if addr.y < self.max.y {
            Some(CellAddress::new(addr.x, addr.y + 1))
        } else if addr.x < self.max.x {
            Some(CellAddress::new(addr.x + 1, self.min.y))
        } else {
            None
        };

        Some(addr)
    }
}
