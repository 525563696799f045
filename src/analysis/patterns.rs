//! Pattern hierarchy data model
//!
//! Patterns of every level live in one flat `PatternArena` and refer to each
//! other by `PatternId`. Composite and meta patterns hold ids of their parts
//! rather than owning them, so the hierarchy is a DAG without shared
//! ownership.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::footprint::Footprint;
use crate::spatial::grid::{Region, Symbol};
use crate::spatial::objects::ObjectSymmetry;
use crate::spatial::transform::Dihedral;

/// Index of a pattern inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternId(pub u32);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Level of a pattern in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatternLevel {
    /// Directly measured on one grid or one pair
    Atomic,
    /// Combination of co-located atomic patterns
    Composite,
    /// Behaviour of a grid partition
    Structural,
    /// Consistent change across training pairs
    Meta,
}

/// Role of a grid within a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridRole {
    /// Input of a training pair
    TrainInput,
    /// Output of a training pair
    TrainOutput,
    /// Test input
    Test,
}

/// Where a pattern was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Origin {
    /// A single grid; `index` is the pair or test index
    Grid {
        /// Role of the grid
        role: GridRole,
        /// Pair index for training grids, test index for test grids
        index: usize,
    },
    /// A training pair as a whole
    Pair(usize),
    /// The whole task
    Task,
}

impl Origin {
    /// Origin of a training input grid
    pub const fn train_input(index: usize) -> Self {
        Self::Grid {
            role: GridRole::TrainInput,
            index,
        }
    }

    /// Origin of a training output grid
    pub const fn train_output(index: usize) -> Self {
        Self::Grid {
            role: GridRole::TrainOutput,
            index,
        }
    }

    /// Origin of a test input grid
    pub const fn test(index: usize) -> Self {
        Self::Grid {
            role: GridRole::Test,
            index,
        }
    }
}

/// Axis along which a grid repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Rows repeat with a period
    Rows,
    /// Columns repeat with a period
    Cols,
}

/// Object attribute followed by a progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Cell count
    Size,
    /// Bounding-box height
    Height,
    /// Bounding-box width
    Width,
    /// Dominant symbol
    Symbol,
}

/// Order in which objects are visited for a progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectOrder {
    /// By top row, then left column
    RowMajor,
    /// By left column, then top row
    ColumnMajor,
}

/// Common step of a progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Arithmetic progression with this difference
    Difference(i64),
    /// Geometric progression with this ratio
    Ratio(f64),
}

/// Vertical placement of one object relative to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalRelation {
    /// Entirely above
    Above,
    /// Entirely below
    Below,
    /// Row ranges overlap
    Overlapping,
}

/// Horizontal placement of one object relative to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalRelation {
    /// Entirely to the left
    LeftOf,
    /// Entirely to the right
    RightOf,
    /// Column ranges overlap
    Overlapping,
}

/// Summary of the salient object of a grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkDescriptor {
    /// Bounding box
    pub bbox: Region,
    /// Cell count
    pub size: usize,
    /// Dominant symbol
    pub symbol: Symbol,
    /// Whether every cell carries the dominant symbol
    pub uniform: bool,
    /// Membership over the bounding box, row-major
    pub mask: Vec<bool>,
    /// Shape symmetries
    pub symmetry: ObjectSymmetry,
}

/// How the parts of a composite pattern are related
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeRelation {
    /// Footprints share cells
    Overlapping,
    /// Footprints are 4-adjacent without sharing cells
    Adjacent,
    /// Every object is invariant under the same transform
    Objectwise(Dihedral),
}

/// Way of cutting a grid into parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartitionScheme {
    /// Four quadrants; the middle line of an odd dimension is skipped
    Quadrants,
    /// Equal horizontal bands
    RowBands(u8),
    /// Equal vertical bands
    ColumnBands(u8),
    /// Rectangles between uniform non-background lines
    Separators,
    /// Bounding boxes of the extracted objects
    ObjectBoxes,
}

impl fmt::Display for PartitionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quadrants => f.write_str("quadrants"),
            Self::RowBands(n) => write!(f, "row_bands({n})"),
            Self::ColumnBands(n) => write!(f, "column_bands({n})"),
            Self::Separators => f.write_str("separators"),
            Self::ObjectBoxes => f.write_str("object_boxes"),
        }
    }
}

/// Property measured per part of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionMeasure {
    /// Invariance of each part under a transform
    Symmetry(Dihedral),
    /// Output part equals the transformed input part
    Reproduction(Dihedral),
}

/// Property tracked from input to output by meta detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackingKey {
    /// Whole-grid invariance under a transform
    Symmetry(Dihedral),
    /// Periodicity along an axis
    Repetition(Axis),
    /// The salient object
    Landmark,
    /// Per-object invariance shared by every object
    ObjectwiseSymmetry(Dihedral),
}

/// Classified input-to-output change of a tracked property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delta {
    /// Present on both sides with the same value
    Unchanged,
    /// Moved by a fixed offset
    Translated {
        /// Row offset
        dr: isize,
        /// Column offset
        dc: isize,
    },
    /// Symbol replaced
    Recolored {
        /// Input symbol
        from: Symbol,
        /// Output symbol
        to: Symbol,
    },
    /// Enlarged by an integer factor
    Scaled {
        /// Enlargement factor
        factor: usize,
    },
    /// Absent in the input, present in the output
    Added,
    /// Present in the input, absent in the output
    Removed,
}

/// What a pattern says about its grid, pair or task
#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    /// Invariance under a dihedral element, grid- or object-scoped
    Symmetry {
        /// Transform under which the region is (nearly) invariant
        transform: Dihedral,
    },
    /// Exact periodicity of rows or columns
    Repetition {
        /// Repeating axis
        axis: Axis,
        /// Smallest period
        period: usize,
        /// Number of full repeats
        repeats: usize,
    },
    /// Regular change of an attribute along ordered objects
    Progression {
        /// Attribute followed
        attribute: Attribute,
        /// Object order
        order: ObjectOrder,
        /// Common difference or ratio
        step: Step,
    },
    /// Symbol substitution over a training pair
    ValueMapping {
        /// Source symbol to target symbol
        table: BTreeMap<Symbol, Symbol>,
    },
    /// Relative placement of two objects
    SpatialRelation {
        /// First object id
        first: usize,
        /// Second object id
        second: usize,
        /// Vertical relation of first to second
        vertical: VerticalRelation,
        /// Horizontal relation of first to second
        horizontal: HorizontalRelation,
    },
    /// The largest object of a grid
    Landmark {
        /// Object id
        object: usize,
        /// Object summary
        descriptor: LandmarkDescriptor,
    },
    /// Co-occurring atomic patterns
    Composite {
        /// Constituent atomic patterns
        parts: Vec<PatternId>,
        /// How the parts relate
        relation: CompositeRelation,
    },
    /// Property that holds per part but not on the whole
    Partition {
        /// Partition scheme
        scheme: PartitionScheme,
        /// Property measured
        measure: PartitionMeasure,
        /// Whole-grid exactness
        whole: f64,
        /// Mean per-part exactness
        per_part: f64,
    },
    /// Change of a tracked property identical in every training pair
    MetaDelta {
        /// Tracked property
        key: TrackingKey,
        /// Shared change
        delta: Delta,
        /// Per-pair patterns the change was read from
        observations: Vec<PatternId>,
    },
}

impl PatternKind {
    /// Short lowercase name of the kind
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Symmetry { .. } => "symmetry",
            Self::Repetition { .. } => "repetition",
            Self::Progression { .. } => "progression",
            Self::ValueMapping { .. } => "value_mapping",
            Self::SpatialRelation { .. } => "spatial_relation",
            Self::Landmark { .. } => "landmark",
            Self::Composite { .. } => "composite",
            Self::Partition { .. } => "partition",
            Self::MetaDelta { .. } => "meta_delta",
        }
    }

    /// Patterns this one is built from
    pub fn parts(&self) -> &[PatternId] {
        match self {
            Self::Composite { parts, .. } => parts,
            Self::MetaDelta { observations, .. } => observations,
            _ => &[],
        }
    }
}

/// A detected regularity with its provenance and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Arena index, assigned on insertion
    pub id: PatternId,
    /// Hierarchy level
    pub level: PatternLevel,
    /// What was found
    pub kind: PatternKind,
    /// Where it was found
    pub origin: Origin,
    /// Regions involved
    pub regions: Vec<Region>,
    /// Object ids involved, relative to the origin grid's extraction
    pub objects: Vec<usize>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Amount of supporting evidence (cells, repeats, objects or pairs)
    pub evidence: usize,
    /// Cells supporting the pattern, when grid-scoped
    pub footprint: Option<Footprint>,
}

impl Pattern {
    /// Create a pattern with no regions, objects or evidence yet
    pub const fn new(level: PatternLevel, kind: PatternKind, origin: Origin) -> Self {
        Self {
            id: PatternId(0),
            level,
            kind,
            origin,
            regions: Vec::new(),
            objects: Vec::new(),
            confidence: 0.0,
            evidence: 0,
            footprint: None,
        }
    }

    /// Set the regions
    #[must_use]
    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    /// Set the referenced objects
    #[must_use]
    pub fn with_objects(mut self, objects: Vec<usize>) -> Self {
        self.objects = objects;
        self
    }

    /// Set the confidence, clamped to [0, 1]
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Set the evidence count
    #[must_use]
    pub const fn with_evidence(mut self, evidence: usize) -> Self {
        self.evidence = evidence;
        self
    }

    /// Set the cell footprint
    #[must_use]
    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Whether the pattern is scoped to the whole grid rather than objects
    pub fn is_grid_scoped(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Flat storage for all patterns of one task
#[derive(Debug, Clone, Default)]
pub struct PatternArena {
    patterns: Vec<Pattern>,
}

impl PatternArena {
    /// Create an empty arena
    pub const fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Store a pattern and return its id
    pub fn insert(&mut self, mut pattern: Pattern) -> PatternId {
        let id = PatternId(self.patterns.len() as u32);
        pattern.id = id;
        self.patterns.push(pattern);
        id
    }

    /// Look up a pattern
    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.0 as usize)
    }

    /// Number of stored patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All patterns in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Patterns at one level, in insertion order
    pub fn at_level(&self, level: PatternLevel) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(move |p| p.level == level)
    }

    /// Patterns observed at one origin, in insertion order
    pub fn from_origin(&self, origin: Origin) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(move |p| p.origin == origin)
    }

    /// Resolve a list of ids, skipping unknown ones
    pub fn resolve<'a>(
        &'a self,
        ids: &'a [PatternId],
    ) -> impl Iterator<Item = &'a Pattern> + 'a {
        ids.iter().filter_map(|&id| self.get(id))
    }
}
