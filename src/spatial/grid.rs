//! Grid model: validated finite-palette symbol matrices and rectangular regions
//!
//! A `Grid` is immutable once constructed. Every constructor checks that the
//! data is rectangular, non-empty and drawn from the palette, so downstream
//! detectors can index freely within `rows()` × `cols()`.

use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::io::configuration::PALETTE_SIZE;
use crate::io::error::{InductionError, Result, malformed_grid};

/// A single cell value, drawn from `0..PALETTE_SIZE`
pub type Symbol = u8;

/// Per-symbol cell counts indexed by symbol value
pub type Histogram = [usize; PALETTE_SIZE];

/// Rectangular finite-palette grid of symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Symbol>>", into = "Vec<Vec<Symbol>>")]
pub struct Grid {
    cells: Array2<Symbol>,
}

impl Grid {
    /// Build a grid from row vectors
    ///
    /// # Errors
    ///
    /// Returns `MalformedGrid` if there are no rows, the first row is empty,
    /// rows have unequal lengths, or any symbol is outside the palette
    pub fn from_rows(rows: &[Vec<Symbol>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(malformed_grid(&format!(
                "row {index} has length {} but row 0 has length {width}",
                row.len()
            )));
        }

        let flat: Vec<Symbol> = rows.iter().flat_map(|row| row.iter().copied()).collect();
        let cells = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| malformed_grid(&format!("cannot shape {height}x{width} grid: {e}")))?;

        Self::from_array(cells)
    }

    /// Wrap an existing array after validating dimensions and palette
    ///
    /// # Errors
    ///
    /// Returns `MalformedGrid` if the array is empty or contains a symbol
    /// outside the palette
    pub fn from_array(cells: Array2<Symbol>) -> Result<Self> {
        let (rows, cols) = cells.dim();
        if rows == 0 || cols == 0 {
            return Err(malformed_grid(&format!(
                "grid must have at least one cell, got {rows}x{cols}"
            )));
        }

        if let Some(((row, col), &symbol)) = cells
            .indexed_iter()
            .find(|(_, s)| usize::from(**s) >= PALETTE_SIZE)
        {
            return Err(malformed_grid(&format!(
                "symbol {symbol} at ({row}, {col}) is outside the palette 0..{PALETTE_SIZE}"
            )));
        }

        Ok(Self { cells })
    }

    /// Create a grid with every cell set to `symbol`
    ///
    /// # Errors
    ///
    /// Returns `MalformedGrid` for zero dimensions or an out-of-palette symbol
    pub fn filled(rows: usize, cols: usize, symbol: Symbol) -> Result<Self> {
        Self::from_array(Array2::from_elem((rows, cols), symbol))
    }

    /// Wrap an array produced by a palette-preserving operation on valid grids
    pub(crate) fn from_valid(cells: Array2<Symbol>) -> Self {
        debug_assert!(cells.nrows() > 0 && cells.ncols() > 0);
        debug_assert!(cells.iter().all(|&s| usize::from(s) < PALETTE_SIZE));
        Self { cells }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Symbol at a coordinate, `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        self.cells.get((row, col)).copied()
    }

    /// Underlying symbol matrix
    pub const fn cells(&self) -> &Array2<Symbol> {
        &self.cells
    }

    /// Copy the grid out as row vectors
    pub fn to_rows(&self) -> Vec<Vec<Symbol>> {
        self.cells.outer_iter().map(|row| row.to_vec()).collect()
    }

    /// Count of cells per symbol
    pub fn histogram(&self) -> Histogram {
        let mut counts = [0; PALETTE_SIZE];
        for &symbol in &self.cells {
            if let Some(count) = counts.get_mut(usize::from(symbol)) {
                *count += 1;
            }
        }
        counts
    }

    /// Distinct symbols present, ascending
    pub fn palette(&self) -> Vec<Symbol> {
        self.histogram()
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, _)| symbol as Symbol)
            .collect()
    }

    /// Most frequent symbol, ties resolved toward the smaller symbol
    pub fn dominant_symbol(&self) -> Symbol {
        let histogram = self.histogram();
        let mut best = 0;
        let mut best_count = 0;
        for (symbol, &count) in histogram.iter().enumerate() {
            if count > best_count {
                best = symbol;
                best_count = count;
            }
        }
        best as Symbol
    }

    /// Classify a coordinate as corner, edge or interior
    pub fn position_class(&self, row: usize, col: usize) -> PositionClass {
        let on_row_edge = row == 0 || row + 1 == self.rows();
        let on_col_edge = col == 0 || col + 1 == self.cols();
        match (on_row_edge, on_col_edge) {
            (true, true) => PositionClass::Corner,
            (true, false) | (false, true) => PositionClass::Edge,
            (false, false) => PositionClass::Interior,
        }
    }

    /// Copy out a rectangular region, `None` if it does not fit
    pub fn subgrid(&self, region: &Region) -> Option<Self> {
        if region.area() == 0 || !region.fits_within(self.rows(), self.cols()) {
            return None;
        }
        let cells = self
            .cells
            .slice(s![region.top..region.bottom(), region.left..region.right()])
            .to_owned();
        Some(Self { cells })
    }

    /// Number of differing cells, `None` when shapes differ
    pub fn count_differences(&self, other: &Self) -> Option<usize> {
        if self.dimensions() != other.dimensions() {
            return None;
        }
        Some(
            self.cells
                .iter()
                .zip(other.cells.iter())
                .filter(|(a, b)| a != b)
                .count(),
        )
    }

    /// Region covering the whole grid
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.rows(), self.cols())
    }
}

impl TryFrom<Vec<Vec<Symbol>>> for Grid {
    type Error = InductionError;

    fn try_from(rows: Vec<Vec<Symbol>>) -> Result<Self> {
        Self::from_rows(&rows)
    }
}

impl From<Grid> for Vec<Vec<Symbol>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.outer_iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for symbol in row {
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

/// Location class of a cell relative to the grid border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionClass {
    /// One of the four corner cells
    Corner,
    /// Border cell that is not a corner
    Edge,
    /// Any cell not on the border
    Interior,
}

/// Axis-aligned rectangle with an exclusive bottom-right corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Region {
    /// First row (inclusive)
    pub top: usize,
    /// First column (inclusive)
    pub left: usize,
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
}

impl Region {
    /// Create a region from its top-left corner and size
    pub const fn new(top: usize, left: usize, height: usize, width: usize) -> Self {
        Self {
            top,
            left,
            height,
            width,
        }
    }

    /// Row one past the last covered row
    pub const fn bottom(&self) -> usize {
        self.top + self.height
    }

    /// Column one past the last covered column
    pub const fn right(&self) -> usize {
        self.left + self.width
    }

    /// Number of covered cells
    pub const fn area(&self) -> usize {
        self.height * self.width
    }

    /// Check if a cell is inside the region
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.top && row < self.bottom() && col >= self.left && col < self.right()
    }

    /// Check if the region lies inside a grid of the given size
    pub const fn fits_within(&self, rows: usize, cols: usize) -> bool {
        self.bottom() <= rows && self.right() <= cols
    }

    /// Overlapping rectangle, `None` when disjoint
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        (top < bottom && left < right).then(|| Self::new(top, left, bottom - top, right - left))
    }

    /// Number of cells shared with another region
    pub fn intersection_area(&self, other: &Self) -> usize {
        self.intersection(other).map_or(0, |r| r.area())
    }

    /// Intersection over union in [0, 1]
    pub fn iou(&self, other: &Self) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union == 0 {
            0.0
        } else {
            inter as f64 / union as f64
        }
    }

    /// Check if the regions share an edge without overlapping
    pub fn touches(&self, other: &Self) -> bool {
        if self.intersection(other).is_some() {
            return false;
        }
        let rows_overlap = self.top < other.bottom() && other.top < self.bottom();
        let cols_overlap = self.left < other.right() && other.left < self.right();
        (rows_overlap && (self.right() == other.left || other.right() == self.left))
            || (cols_overlap && (self.bottom() == other.top || other.bottom() == self.top))
    }
}
