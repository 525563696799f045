//! Connected-component object extraction
//!
//! Objects are maximal connected cell sets under an adjacency mode and a
//! segmentation predicate. One extraction pass partitions every
//! non-background cell into exactly one object.

use bitvec::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::io::configuration::{DEFAULT_BACKGROUND, PALETTE_SIZE};
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::{Grid, Histogram, Region, Symbol};
use crate::spatial::transform::Dihedral;

/// Cell adjacency used when growing objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and diagonal neighbours
    Eight,
}

impl Connectivity {
    /// Neighbour offsets as (row delta, column delta)
    pub const fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::Four => &[(-1, 0), (0, -1), (0, 1), (1, 0)],
            Self::Eight => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
        }
    }
}

/// Predicate deciding whether two adjacent cells belong to the same object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segmentation {
    /// Cells must carry the same symbol
    SameSymbol,
    /// Any two non-background cells join
    Foreground,
}

/// Parameters of one extraction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtractionParams {
    /// Adjacency mode
    pub connectivity: Connectivity,
    /// Segmentation predicate
    pub segmentation: Segmentation,
    /// Symbol never assigned to an object
    pub background: Symbol,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self::new(Connectivity::Four, Segmentation::SameSymbol, DEFAULT_BACKGROUND)
    }
}

impl ExtractionParams {
    /// Create extraction parameters
    pub const fn new(
        connectivity: Connectivity,
        segmentation: Segmentation,
        background: Symbol,
    ) -> Self {
        Self {
            connectivity,
            segmentation,
            background,
        }
    }

    /// The four parameter combinations explored per grid
    pub const fn search_space(background: Symbol) -> [Self; 4] {
        [
            Self::new(Connectivity::Four, Segmentation::SameSymbol, background),
            Self::new(Connectivity::Eight, Segmentation::SameSymbol, background),
            Self::new(Connectivity::Four, Segmentation::Foreground, background),
            Self::new(Connectivity::Eight, Segmentation::Foreground, background),
        ]
    }

    const fn joins(&self, a: Symbol, b: Symbol) -> bool {
        match self.segmentation {
            Segmentation::SameSymbol => a == b,
            Segmentation::Foreground => true,
        }
    }
}

/// Shape symmetries of an object's bounding-box patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectSymmetry {
    /// Patch equals itself mirrored across the horizontal axis
    pub mirror_rows: bool,
    /// Patch equals itself mirrored across the vertical axis
    pub mirror_cols: bool,
    /// Order of rotational symmetry: 1, 2 or 4
    pub rotational_order: u8,
}

impl ObjectSymmetry {
    fn of_patch(patch: &Array2<Symbol>) -> Self {
        let invariant = |t: Dihedral| {
            let (rows, cols) = patch.dim();
            t.preserves_shape(rows, cols) && t.apply_array(patch) == *patch
        };
        let rotational_order = if invariant(Dihedral::Rotate90) {
            4
        } else if invariant(Dihedral::Rotate180) {
            2
        } else {
            1
        };
        Self {
            mirror_rows: invariant(Dihedral::FlipRows),
            mirror_cols: invariant(Dihedral::FlipCols),
            rotational_order,
        }
    }

    /// Whether the patch is invariant under a dihedral element
    pub const fn admits(&self, transform: Dihedral) -> bool {
        match transform {
            Dihedral::Identity => true,
            Dihedral::FlipRows => self.mirror_rows,
            Dihedral::FlipCols => self.mirror_cols,
            Dihedral::Rotate180 => self.rotational_order >= 2,
            Dihedral::Rotate90 | Dihedral::Rotate270 => self.rotational_order == 4,
            Dihedral::Transpose | Dihedral::AntiTranspose => false,
        }
    }
}

/// Maximal connected set of cells found by one extraction pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridObject {
    /// Position in extraction order
    pub id: usize,
    /// Member cells in row-major order
    pub cells: Vec<(usize, usize)>,
    /// Bounding box
    pub bbox: Region,
    /// Membership over the bounding box, row-major
    #[serde(skip)]
    pub mask: BitVec,
    /// Per-symbol cell counts
    pub histogram: Histogram,
    /// Mean (row, col) of member cells
    pub centroid: (f64, f64),
    /// Shape symmetries
    pub symmetry: ObjectSymmetry,
    /// Bounding-box patch, background outside the object
    #[serde(skip)]
    patch: Array2<Symbol>,
}

impl GridObject {
    fn from_cells(
        id: usize,
        grid: &Grid,
        mut cells: Vec<(usize, usize)>,
        background: Symbol,
    ) -> Self {
        cells.sort_unstable();

        let top = cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let left = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
        let bottom = cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
        let right = cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
        let bbox = Region::new(top, left, bottom - top, right - left);

        let mut mask = bitvec![0; bbox.area()];
        let mut patch = Array2::from_elem((bbox.height, bbox.width), background);
        let mut histogram = [0; PALETTE_SIZE];
        let mut row_sum = 0.0;
        let mut col_sum = 0.0;

        for &(r, c) in &cells {
            let local = (r - top, c - left);
            mask.set(local.0 * bbox.width + local.1, true);
            let Some(&symbol) = grid.cells().get((r, c)) else {
                continue;
            };
            if let Some(cell) = patch.get_mut(local) {
                *cell = symbol;
            }
            if let Some(count) = histogram.get_mut(usize::from(symbol)) {
                *count += 1;
            }
            row_sum += r as f64;
            col_sum += c as f64;
        }

        let size = cells.len().max(1) as f64;
        let symmetry = ObjectSymmetry::of_patch(&patch);

        Self {
            id,
            cells,
            bbox,
            mask,
            histogram,
            centroid: (row_sum / size, col_sum / size),
            symmetry,
            patch,
        }
    }

    /// Number of member cells
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Most frequent symbol, ties toward the smaller symbol
    pub fn dominant_symbol(&self) -> Symbol {
        let mut best = 0;
        let mut best_count = 0;
        for (symbol, &count) in self.histogram.iter().enumerate() {
            if count > best_count {
                best = symbol;
                best_count = count;
            }
        }
        best as Symbol
    }

    /// Whether every cell carries the same symbol
    pub fn is_uniform(&self) -> bool {
        self.histogram.iter().filter(|&&count| count > 0).count() == 1
    }

    /// Bounding-box patch with background outside the object
    pub const fn patch(&self) -> &Array2<Symbol> {
        &self.patch
    }

    /// Membership mask over the bounding box as a 2-D array
    pub fn shape_mask(&self) -> Array2<bool> {
        let width = self.bbox.width;
        Array2::from_shape_fn((self.bbox.height, width), |(r, c)| {
            self.mask.get(r * width + c).as_deref() == Some(&true)
        })
    }

    /// Whether two objects have identical masks
    pub fn same_shape(&self, other: &Self) -> bool {
        self.bbox.height == other.bbox.height
            && self.bbox.width == other.bbox.width
            && self.mask == other.mask
    }

    /// Cells as a footprint over a grid of the given size
    pub fn footprint(&self, rows: usize, cols: usize) -> Footprint {
        Footprint::from_cells(rows, cols, &self.cells)
    }

    /// Euclidean distance between centroids
    pub fn centroid_distance(&self, other: &Self) -> f64 {
        let dr = self.centroid.0 - other.centroid.0;
        let dc = self.centroid.1 - other.centroid.1;
        dr.hypot(dc)
    }
}

/// Partition the non-background cells of a grid into connected objects
///
/// Objects are ordered by their top-left-most cell, then by size, and ids
/// follow that order. The function is pure: repeated calls produce equal,
/// independent object sets.
pub fn extract_objects(grid: &Grid, params: &ExtractionParams) -> Vec<GridObject> {
    let (rows, cols) = grid.dimensions();
    let cells = grid.cells();
    let mut visited = Footprint::new(rows, cols);
    let mut components: Vec<Vec<(usize, usize)>> = Vec::new();

    for ((row, col), &symbol) in cells.indexed_iter() {
        if symbol == params.background || visited.contains(row, col) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![(row, col)];
        visited.insert(row, col);

        while let Some((r, c)) = stack.pop() {
            component.push((r, c));
            let Some(&current) = cells.get((r, c)) else {
                continue;
            };
            for &(dr, dc) in params.connectivity.offsets() {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                let Some(&neighbour) = cells.get((nr, nc)) else {
                    continue;
                };
                if neighbour == params.background
                    || visited.contains(nr, nc)
                    || !params.joins(current, neighbour)
                {
                    continue;
                }
                visited.insert(nr, nc);
                stack.push((nr, nc));
            }
        }

        components.push(component);
    }

    let mut objects: Vec<GridObject> = components
        .into_iter()
        .map(|component| GridObject::from_cells(0, grid, component, params.background))
        .collect();
    objects.sort_by(|a, b| {
        a.cells
            .first()
            .cmp(&b.cells.first())
            .then(a.size().cmp(&b.size()))
    });
    for (id, object) in objects.iter_mut().enumerate() {
        object.id = id;
    }
    objects
}
