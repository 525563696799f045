use bitvec::prelude::*;
use std::fmt;

use crate::spatial::grid::Region;

/// Fixed-size cell set over a grid of known dimensions
///
/// Cells are stored row-major, one bit per cell. Used as the footprint of a
/// pattern and as the visited mask during object extraction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Footprint {
    bits: BitVec,
    rows: usize,
    cols: usize,
}

impl Footprint {
    /// Create a footprint with no cells present
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            bits: bitvec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a footprint covering the whole grid
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            bits: bitvec![1; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a footprint covering one rectangle, clipped to the grid
    pub fn from_region(rows: usize, cols: usize, region: &Region) -> Self {
        let mut footprint = Self::new(rows, cols);
        for row in region.top..region.bottom().min(rows) {
            for col in region.left..region.right().min(cols) {
                footprint.insert(row, col);
            }
        }
        footprint
    }

    /// Create a footprint from explicit cells, ignoring out-of-range ones
    pub fn from_cells(rows: usize, cols: usize, cells: &[(usize, usize)]) -> Self {
        let mut footprint = Self::new(rows, cols);
        for &(row, col) in cells {
            footprint.insert(row, col);
        }
        footprint
    }

    /// Grid dimensions the footprint was built for
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Insert a cell
    pub fn insert(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.bits.set(row * self.cols + col, true);
        }
    }

    /// Test cell membership
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows
            && col < self.cols
            && self.bits.get(row * self.cols + col).as_deref() == Some(&true)
    }

    /// Intersect this footprint with another in-place
    ///
    /// Footprints of different dimensions never share cells.
    pub fn intersect_with(&mut self, other: &Self) {
        if self.dimensions() == other.dimensions() {
            self.bits &= &other.bits;
        } else {
            self.bits.fill(false);
        }
    }

    /// Create a new footprint containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Create a new footprint containing the union
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        if self.dimensions() == other.dimensions() {
            result.bits |= &other.bits;
        }
        result
    }

    /// Cells of this footprint that are 4-adjacent to a cell of `other`
    /// without belonging to it
    #[must_use]
    pub fn contact(&self, other: &Self) -> Self {
        let mut result = Self::new(self.rows, self.cols);
        if self.dimensions() != other.dimensions() {
            return result;
        }
        for (row, col) in self.cells() {
            if other.contains(row, col) {
                continue;
            }
            let touching = (row > 0 && other.contains(row - 1, col))
                || other.contains(row + 1, col)
                || (col > 0 && other.contains(row, col - 1))
                || other.contains(row, col + 1);
            if touching {
                result.insert(row, col);
            }
        }
        result
    }

    /// Test if no cells are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count cells in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// All cells in row-major order
    pub fn cells(&self) -> Vec<(usize, usize)> {
        let cols = self.cols.max(1);
        self.bits
            .iter_ones()
            .map(|index| (index / cols, index % cols))
            .collect()
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Footprint({} of {}x{} cells)",
            self.count(),
            self.rows,
            self.cols
        )
    }
}
