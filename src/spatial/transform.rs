//! Whole-grid geometric operations
//!
//! The dihedral group of the square acts on any rectangular grid; elements
//! that swap axes turn an h×w grid into a w×h grid. Rotations are clockwise.

use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::spatial::grid::{Grid, Symbol};

/// Element of the dihedral group acting on grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dihedral {
    /// No change
    Identity,
    /// Quarter turn clockwise
    Rotate90,
    /// Half turn
    Rotate180,
    /// Three quarter turns clockwise
    Rotate270,
    /// Mirror across the horizontal axis (row order reversed)
    FlipRows,
    /// Mirror across the vertical axis (column order reversed)
    FlipCols,
    /// Mirror across the main diagonal
    Transpose,
    /// Mirror across the anti-diagonal
    AntiTranspose,
}

impl Dihedral {
    /// All eight group elements, identity first
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::FlipRows,
        Self::FlipCols,
        Self::Transpose,
        Self::AntiTranspose,
    ];

    /// The seven elements that can change a grid
    pub const NON_IDENTITY: [Self; 7] = [
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::FlipRows,
        Self::FlipCols,
        Self::Transpose,
        Self::AntiTranspose,
    ];

    /// Whether the element exchanges the row and column axes
    pub const fn swaps_axes(self) -> bool {
        matches!(
            self,
            Self::Rotate90 | Self::Rotate270 | Self::Transpose | Self::AntiTranspose
        )
    }

    /// Whether applying the element keeps an h×w grid h×w
    pub const fn preserves_shape(self, rows: usize, cols: usize) -> bool {
        !self.swaps_axes() || rows == cols
    }

    /// Dimensions of the transformed grid
    pub const fn output_dimensions(self, rows: usize, cols: usize) -> (usize, usize) {
        if self.swaps_axes() {
            (cols, rows)
        } else {
            (rows, cols)
        }
    }

    /// Source coordinate in the original grid for an output coordinate
    ///
    /// `rows` and `cols` are the dimensions of the original grid.
    pub const fn source_of(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> (usize, usize) {
        match self {
            Self::Identity => (row, col),
            Self::Rotate90 => (rows - 1 - col, row),
            Self::Rotate180 => (rows - 1 - row, cols - 1 - col),
            Self::Rotate270 => (col, cols - 1 - row),
            Self::FlipRows => (rows - 1 - row, col),
            Self::FlipCols => (row, cols - 1 - col),
            Self::Transpose => (col, row),
            Self::AntiTranspose => (rows - 1 - col, cols - 1 - row),
        }
    }

    /// Element undoing this one
    pub const fn inverse(self) -> Self {
        match self {
            Self::Rotate90 => Self::Rotate270,
            Self::Rotate270 => Self::Rotate90,
            other => other,
        }
    }

    /// Number of clockwise quarter turns for pure rotations
    pub const fn quarter_turns(self) -> Option<u8> {
        match self {
            Self::Identity => Some(0),
            Self::Rotate90 => Some(1),
            Self::Rotate180 => Some(2),
            Self::Rotate270 => Some(3),
            _ => None,
        }
    }

    /// Rotation by a number of clockwise quarter turns
    pub const fn rotation(quarter_turns: u8) -> Self {
        match quarter_turns % 4 {
            0 => Self::Identity,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            _ => Self::Rotate270,
        }
    }

    /// Apply the element to any 2-D array
    ///
    /// Built from reversed-axis and transposed views; the result is always
    /// in standard layout.
    pub fn apply_array<T: Clone>(self, source: &Array2<T>) -> Array2<T> {
        let view = match self {
            Self::Identity => source.view(),
            Self::Rotate90 => source.slice(s![..;-1, ..]).reversed_axes(),
            Self::Rotate180 => source.slice(s![..;-1, ..;-1]),
            Self::Rotate270 => source.slice(s![.., ..;-1]).reversed_axes(),
            Self::FlipRows => source.slice(s![..;-1, ..]),
            Self::FlipCols => source.slice(s![.., ..;-1]),
            Self::Transpose => source.t(),
            Self::AntiTranspose => source.slice(s![..;-1, ..;-1]).reversed_axes(),
        };
        view.as_standard_layout().into_owned()
    }

    /// Apply the element to a grid
    pub fn apply(self, grid: &Grid) -> Grid {
        Grid::from_valid(self.apply_array(grid.cells()))
    }
}

impl fmt::Display for Dihedral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Rotate90 => "rotate90",
            Self::Rotate180 => "rotate180",
            Self::Rotate270 => "rotate270",
            Self::FlipRows => "flip_rows",
            Self::FlipCols => "flip_cols",
            Self::Transpose => "transpose",
            Self::AntiTranspose => "anti_transpose",
        };
        f.write_str(name)
    }
}

/// Enlarge every cell into a `row_factor` × `col_factor` block
pub fn upscale(grid: &Grid, row_factor: usize, col_factor: usize) -> Option<Grid> {
    if row_factor == 0 || col_factor == 0 {
        return None;
    }
    let shape = (grid.rows() * row_factor, grid.cols() * col_factor);
    let cells = Array2::from_shape_fn(shape, |(r, c)| {
        grid.cells()
            .get((r / row_factor, c / col_factor))
            .copied()
            .unwrap_or_default()
    });
    Some(Grid::from_valid(cells))
}

/// Repeat the whole grid `row_repeats` × `col_repeats` times
pub fn tile(grid: &Grid, row_repeats: usize, col_repeats: usize) -> Option<Grid> {
    if row_repeats == 0 || col_repeats == 0 {
        return None;
    }
    let (rows, cols) = grid.dimensions();
    let shape = (rows * row_repeats, cols * col_repeats);
    let cells = Array2::from_shape_fn(shape, |(r, c)| {
        grid.cells()
            .get((r % rows, c % cols))
            .copied()
            .unwrap_or_default()
    });
    Some(Grid::from_valid(cells))
}

/// Exact integer factors relating two sizes, if any
pub fn integer_factors(
    from: (usize, usize),
    to: (usize, usize),
) -> Option<(usize, usize)> {
    let (from_rows, from_cols) = from;
    let (to_rows, to_cols) = to;
    if from_rows == 0 || from_cols == 0 || to_rows % from_rows != 0 || to_cols % from_cols != 0 {
        return None;
    }
    Some((to_rows / from_rows, to_cols / from_cols))
}

/// Write a patch into a canvas at an offset, clipping cells that fall outside
///
/// Cells where `mask` is `false` are left untouched.
pub fn paste_masked(
    canvas: &mut Array2<Symbol>,
    patch: &Array2<Symbol>,
    mask: &Array2<bool>,
    top: isize,
    left: isize,
) {
    for ((r, c), &symbol) in patch.indexed_iter() {
        if !mask.get((r, c)).copied().unwrap_or(false) {
            continue;
        }
        let target_row = top + r as isize;
        let target_col = left + c as isize;
        if target_row < 0 || target_col < 0 {
            continue;
        }
        if let Some(cell) = canvas.get_mut((target_row as usize, target_col as usize)) {
            *cell = symbol;
        }
    }
}
