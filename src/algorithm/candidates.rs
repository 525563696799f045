//! Transformation rules and candidate hypotheses
//!
//! A candidate is an ordered list of sub-rules applied left to right. Each
//! sub-rule is a pure grid-to-grid function that may refuse an input it
//! cannot handle (for example a partition that does not fit), in which case
//! the whole candidate is inapplicable to that input.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;

use crate::analysis::landmark::{largest_object, smallest_object};
use crate::analysis::mapping::{apply_table, mapping_components};
use crate::analysis::patterns::PartitionScheme;
use crate::analysis::structural::{partition, partition_objects};
use crate::spatial::grid::{Grid, PositionClass, Symbol};
use crate::spatial::objects::{
    Connectivity, ExtractionParams, GridObject, Segmentation, extract_objects,
};
use crate::spatial::transform::{Dihedral, paste_masked, tile, upscale};

/// Which objects an object rule acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectSelector {
    /// Every object
    All,
    /// Objects whose dominant symbol is this one
    Symbol(Symbol),
    /// The largest object
    Largest,
    /// The smallest object
    Smallest,
}

impl ObjectSelector {
    /// Complexity cost of the selector
    pub const fn complexity(self) -> usize {
        match self {
            Self::All => 0,
            Self::Symbol(_) | Self::Largest | Self::Smallest => 1,
        }
    }

    /// Objects picked out of an extraction
    pub fn select<'a>(self, objects: &'a [GridObject]) -> Vec<&'a GridObject> {
        match self {
            Self::All => objects.iter().collect(),
            Self::Symbol(symbol) => objects
                .iter()
                .filter(|o| o.dominant_symbol() == symbol)
                .collect(),
            Self::Largest => largest_object(objects).into_iter().collect(),
            Self::Smallest => smallest_object(objects).into_iter().collect(),
        }
    }
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Symbol(symbol) => write!(f, "symbol({symbol})"),
            Self::Largest => f.write_str("largest"),
            Self::Smallest => f.write_str("smallest"),
        }
    }
}

/// What an object rule does to each selected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectAction {
    /// Leave the object as it is
    Identity,
    /// Move by a fixed offset
    Translate {
        /// Row offset
        dr: isize,
        /// Column offset
        dc: isize,
    },
    /// Mirror in place (`FlipRows` or `FlipCols`)
    Reflect(Dihedral),
    /// Rotate clockwise by quarter turns, anchored at the top-left corner
    Rotate(u8),
    /// Paint every cell with one symbol
    Recolor(Symbol),
    /// Enlarge by an integer factor, anchored at the top-left corner
    Resize(usize),
}

impl ObjectAction {
    /// Complexity cost of the action
    pub const fn complexity(self) -> usize {
        match self {
            Self::Identity => 0,
            Self::Recolor(_) => 1,
            Self::Translate { .. } | Self::Reflect(_) | Self::Rotate(_) | Self::Resize(_) => 2,
        }
    }

    /// Transformed patch, mask and placement of an object
    fn render(self, object: &GridObject) -> (Array2<Symbol>, Array2<bool>, isize, isize) {
        let patch = object.patch().clone();
        let mask = object.shape_mask();
        let top = object.bbox.top as isize;
        let left = object.bbox.left as isize;
        match self {
            Self::Identity => (patch, mask, top, left),
            Self::Translate { dr, dc } => (patch, mask, top + dr, left + dc),
            Self::Reflect(transform) => (
                transform.apply_array(&patch),
                transform.apply_array(&mask),
                top,
                left,
            ),
            Self::Rotate(turns) => {
                let transform = Dihedral::rotation(turns);
                (
                    transform.apply_array(&patch),
                    transform.apply_array(&mask),
                    top,
                    left,
                )
            }
            Self::Recolor(symbol) => (patch.mapv(|_| symbol), mask, top, left),
            Self::Resize(factor) => {
                let factor = factor.max(1);
                let (rows, cols) = patch.dim();
                let shape = (rows * factor, cols * factor);
                (
                    Array2::from_shape_fn(shape, |(r, c)| {
                        patch.get((r / factor, c / factor)).copied().unwrap_or_default()
                    }),
                    Array2::from_shape_fn(shape, |(r, c)| {
                        mask.get((r / factor, c / factor)).copied().unwrap_or_default()
                    }),
                    top,
                    left,
                )
            }
        }
    }
}

impl fmt::Display for ObjectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("keep"),
            Self::Translate { dr, dc } => write!(f, "translate({dr},{dc})"),
            Self::Reflect(transform) => write!(f, "reflect({transform})"),
            Self::Rotate(turns) => write!(f, "rotate({})", u16::from(*turns) * 90),
            Self::Recolor(symbol) => write!(f, "recolor({symbol})"),
            Self::Resize(factor) => write!(f, "resize({factor})"),
        }
    }
}

/// One step of a transformation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubRule {
    /// Replace symbols through a table; unmapped symbols stay
    Remap(BTreeMap<Symbol, Symbol>),
    /// Replace symbols depending on the cell's position class
    PositionalRemap(BTreeMap<(PositionClass, Symbol), Symbol>),
    /// Apply a dihedral transform to the whole grid
    Global(Dihedral),
    /// Enlarge every cell into a block
    Scale {
        /// Row factor
        rows: usize,
        /// Column factor
        cols: usize,
    },
    /// Repeat the grid
    Tile {
        /// Vertical repeats
        rows: usize,
        /// Horizontal repeats
        cols: usize,
    },
    /// Fill background cells from their mirror images under a transform
    Complete {
        /// Symmetry to complete
        transform: Dihedral,
        /// Symbol considered missing
        background: Symbol,
    },
    /// Act on selected objects: erase all of them, then paint the results
    Object {
        /// Extraction parameters
        params: ExtractionParams,
        /// Object selector
        selector: ObjectSelector,
        /// Action applied to each selected object
        action: ObjectAction,
    },
    /// Transform every part of a partition in place
    PartitionWise {
        /// Partition scheme
        scheme: PartitionScheme,
        /// Transform applied per part
        inner: Dihedral,
        /// Background for separator and object detection
        background: Symbol,
    },
}

impl SubRule {
    /// Complexity cost; lower is preferred
    pub fn complexity(&self) -> usize {
        match self {
            Self::Remap(table) => mapping_components(table),
            Self::PositionalRemap(table) => 1 + table.len(),
            Self::Global(Dihedral::Identity) => 0,
            Self::Global(_) | Self::Scale { .. } | Self::Tile { .. } | Self::Complete { .. } => 2,
            Self::Object {
                selector, action, ..
            } => selector.complexity() + action.complexity(),
            Self::PartitionWise { inner, .. } => 1 + Self::Global(*inner).complexity(),
        }
    }

    /// Apply the step, `None` when it cannot handle this grid
    pub fn apply(&self, grid: &Grid) -> Option<Grid> {
        match self {
            Self::Remap(table) => Some(apply_table(grid, table)),
            Self::PositionalRemap(table) => {
                let mut cells = grid.cells().clone();
                for ((r, c), cell) in cells.indexed_iter_mut() {
                    if let Some(&to) = table.get(&(grid.position_class(r, c), *cell)) {
                        *cell = to;
                    }
                }
                Some(Grid::from_valid(cells))
            }
            Self::Global(transform) => Some(transform.apply(grid)),
            Self::Scale { rows, cols } => upscale(grid, *rows, *cols),
            Self::Tile { rows, cols } => tile(grid, *rows, *cols),
            Self::Complete {
                transform,
                background,
            } => complete_symmetry(grid, *transform, *background),
            Self::Object {
                params,
                selector,
                action,
            } => Some(apply_object_rule(grid, params, *selector, *action)),
            Self::PartitionWise {
                scheme,
                inner,
                background,
            } => apply_partition_rule(grid, *scheme, *inner, *background),
        }
    }
}

/// Fill every background cell from a non-background cell of its orbit
pub fn complete_symmetry(grid: &Grid, transform: Dihedral, background: Symbol) -> Option<Grid> {
    let (rows, cols) = grid.dimensions();
    if !transform.preserves_shape(rows, cols) {
        return None;
    }
    let cells = grid.cells();
    let completed = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let symbol = cells.get((r, c)).copied().unwrap_or(background);
        if symbol != background {
            return symbol;
        }
        let mut current = transform.source_of(r, c, rows, cols);
        while current != (r, c) {
            let candidate = cells.get(current).copied().unwrap_or(background);
            if candidate != background {
                return candidate;
            }
            current = transform.source_of(current.0, current.1, rows, cols);
        }
        symbol
    });
    Some(Grid::from_valid(completed))
}

fn apply_object_rule(
    grid: &Grid,
    params: &ExtractionParams,
    selector: ObjectSelector,
    action: ObjectAction,
) -> Grid {
    let objects = extract_objects(grid, params);
    let selected = selector.select(&objects);
    let mut canvas = grid.cells().clone();

    for object in &selected {
        for &(r, c) in &object.cells {
            if let Some(cell) = canvas.get_mut((r, c)) {
                *cell = params.background;
            }
        }
    }
    for object in &selected {
        let (patch, mask, top, left) = action.render(object);
        paste_masked(&mut canvas, &patch, &mask, top, left);
    }

    Grid::from_valid(canvas)
}

fn apply_partition_rule(
    grid: &Grid,
    scheme: PartitionScheme,
    inner: Dihedral,
    background: Symbol,
) -> Option<Grid> {
    let objects = if scheme == PartitionScheme::ObjectBoxes {
        partition_objects(grid, background)
    } else {
        Vec::new()
    };
    let parts = partition(grid, scheme, &objects, background)?;
    let source = grid.cells();
    let mut canvas = source.clone();

    for part in parts {
        if !inner.preserves_shape(part.height, part.width) {
            return None;
        }
        let (rows, cols) = (part.height, part.width);
        for r in 0..rows {
            for c in 0..cols {
                let (sr, sc) = inner.source_of(r, c, rows, cols);
                let value = *source.get((part.top + sr, part.left + sc))?;
                *canvas.get_mut((part.top + r, part.left + c))? = value;
            }
        }
    }

    Some(Grid::from_valid(canvas))
}

const fn connectivity_name(params: &ExtractionParams) -> &'static str {
    match params.connectivity {
        Connectivity::Four => "4",
        Connectivity::Eight => "8",
    }
}

const fn segmentation_name(params: &ExtractionParams) -> &'static str {
    match params.segmentation {
        Segmentation::SameSymbol => "same_symbol",
        Segmentation::Foreground => "foreground",
    }
}

impl fmt::Display for SubRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remap(table) => {
                f.write_str("remap{")?;
                for (index, (from, to)) in table.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{from}->{to}")?;
                }
                f.write_str("}")
            }
            Self::PositionalRemap(table) => {
                f.write_str("positional_remap{")?;
                for (index, ((class, from), to)) in table.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{class:?}:{from}->{to}")?;
                }
                f.write_str("}")
            }
            Self::Global(transform) => write!(f, "{transform}"),
            Self::Scale { rows, cols } => write!(f, "scale({rows}x{cols})"),
            Self::Tile { rows, cols } => write!(f, "tile({rows}x{cols})"),
            Self::Complete { transform, .. } => write!(f, "complete({transform})"),
            Self::Object {
                params,
                selector,
                action,
            } => write!(
                f,
                "objects[{}-connected {}, {selector}]: {action}",
                connectivity_name(params),
                segmentation_name(params)
            ),
            Self::PartitionWise { scheme, inner, .. } => write!(f, "per_part[{scheme}]: {inner}"),
        }
    }
}

/// Hypothesis: a sequence of sub-rules with its score
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationCandidate {
    /// Steps applied in order; empty means identity
    pub steps: Vec<SubRule>,
    /// Sum of step complexities
    pub complexity: usize,
    /// Confidence in [0, 1], set when scored
    pub confidence: f64,
    /// Discovery order, used as the final tie-breaker
    pub order: usize,
    /// Training pairs supporting the candidate
    pub supporting: usize,
}

impl TransformationCandidate {
    /// Unscored candidate
    pub fn new(steps: Vec<SubRule>, order: usize) -> Self {
        let complexity = steps.iter().map(SubRule::complexity).sum();
        Self {
            steps,
            complexity,
            confidence: 0.0,
            order,
            supporting: 0,
        }
    }

    /// Whether the candidate changes nothing
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step, `None` when any step is inapplicable
    pub fn apply(&self, grid: &Grid) -> Option<Grid> {
        self.steps
            .iter()
            .try_fold(grid.clone(), |current, step| step.apply(&current))
    }

    /// Whether the candidate maps every input exactly onto its output
    pub fn reproduces(&self, train: &[(Grid, Grid)]) -> bool {
        train
            .iter()
            .all(|(input, output)| self.apply(input).as_ref() == Some(output))
    }

    /// Ranking key: confidence, complexity, discovery order
    pub const fn rank_key(&self) -> (f64, usize, usize) {
        (self.confidence, self.complexity, self.order)
    }
}

impl fmt::Display for TransformationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("identity");
        }
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 {
                f.write_str(" then ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
