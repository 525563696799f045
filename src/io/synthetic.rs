//! Seeded generation of synthetic tasks with a known rule
//!
//! Each family picks a rule, draws random inputs suited to it and computes
//! the outputs by applying the rule, so every generated task is solvable by
//! construction. The same seed always yields the same tasks.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::algorithm::candidates::{ObjectAction, ObjectSelector, SubRule};
use crate::io::configuration::{DEFAULT_BACKGROUND, PALETTE_SIZE};
use crate::io::error::{Result, invalid_parameter};
use crate::io::task::{Task, TaskPair, TestCase};
use crate::spatial::grid::{Grid, Symbol};
use crate::spatial::objects::ExtractionParams;
use crate::spatial::transform::Dihedral;

const MIN_SIDE: usize = 3;
const MAX_SIDE: usize = 8;
const MAX_SCALE: usize = 3;

/// Kind of rule a synthetic task is built around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskFamily {
    /// Two symbols swap everywhere
    Recolor,
    /// The grid is mirrored top-to-bottom or left-to-right
    Mirror,
    /// The grid is rotated by a quarter, half or three-quarter turn
    Rotate,
    /// A single block moves by a small offset
    Translate,
    /// Every cell grows into a square block
    Upscale,
}

impl TaskFamily {
    /// Every family in generation order
    pub const ALL: [Self; 5] = [
        Self::Recolor,
        Self::Mirror,
        Self::Rotate,
        Self::Translate,
        Self::Upscale,
    ];
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Recolor => "recolor",
            Self::Mirror => "mirror",
            Self::Rotate => "rotate",
            Self::Translate => "translate",
            Self::Upscale => "upscale",
        };
        f.write_str(name)
    }
}

/// A generated task together with the rule that produced its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTask {
    /// Family the rule was drawn from
    pub family: TaskFamily,
    /// Rule applied to every input
    pub rule: SubRule,
    /// Training pairs and test cases with expected outputs
    pub task: Task,
}

/// Deterministic synthetic task source
pub struct TaskGenerator {
    rng: StdRng,
}

impl TaskGenerator {
    /// Create a generator from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random grid whose symbols are drawn from `palette`
    ///
    /// An empty palette yields a background-filled grid.
    pub fn random_grid(&mut self, rows: usize, cols: usize, palette: &[Symbol]) -> Grid {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cells = Array2::from_shape_fn((rows, cols), |_| {
            if palette.is_empty() {
                return DEFAULT_BACKGROUND;
            }
            let index = self.rng.random_range(0..palette.len());
            palette.get(index).copied().unwrap_or(DEFAULT_BACKGROUND)
        });
        Grid::from_valid(cells)
    }

    /// Generate one task of the given family
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `train_pairs` is zero
    pub fn generate(
        &mut self,
        family: TaskFamily,
        train_pairs: usize,
        test_cases: usize,
    ) -> Result<GeneratedTask> {
        if train_pairs == 0 {
            return Err(invalid_parameter(
                "train_pairs",
                &train_pairs,
                &"a task needs at least one training pair",
            ));
        }

        let rule = self.rule(family);
        let mut train = Vec::with_capacity(train_pairs);
        while train.len() < train_pairs {
            let input = self.input_for(family, &rule);
            if let Some(output) = rule.apply(&input) {
                train.push(TaskPair { input, output });
            }
        }
        let mut test = Vec::with_capacity(test_cases);
        while test.len() < test_cases {
            let input = self.input_for(family, &rule);
            if let Some(output) = rule.apply(&input) {
                test.push(TestCase {
                    input,
                    output: Some(output),
                });
            }
        }

        Ok(GeneratedTask {
            family,
            rule,
            task: Task { train, test },
        })
    }

    /// Generate `count` tasks cycling through every family
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `train_pairs` is zero
    pub fn generate_batch(
        &mut self,
        count: usize,
        train_pairs: usize,
    ) -> Result<Vec<GeneratedTask>> {
        TaskFamily::ALL
            .iter()
            .cycle()
            .take(count)
            .map(|&family| self.generate(family, train_pairs, 1))
            .collect()
    }

    fn side(&mut self) -> usize {
        self.rng.random_range(MIN_SIDE..=MAX_SIDE)
    }

    fn foreground(&mut self) -> Symbol {
        self.rng.random_range(1..PALETTE_SIZE) as Symbol
    }

    fn unit_step(&mut self) -> isize {
        self.rng.random_range(-1..=1_i32) as isize
    }

    fn rule(&mut self, family: TaskFamily) -> SubRule {
        match family {
            TaskFamily::Recolor => {
                let first = self.foreground();
                let mut second = self.foreground();
                while second == first {
                    second = self.foreground();
                }
                SubRule::Remap(BTreeMap::from([(first, second), (second, first)]))
            }
            TaskFamily::Mirror => {
                if self.rng.random_bool(0.5) {
                    SubRule::Global(Dihedral::FlipRows)
                } else {
                    SubRule::Global(Dihedral::FlipCols)
                }
            }
            TaskFamily::Rotate => {
                let turns = self.rng.random_range(1..=3);
                SubRule::Global(Dihedral::rotation(turns))
            }
            TaskFamily::Translate => {
                let mut offset = (0, 0);
                while offset == (0, 0) {
                    offset = (self.unit_step(), self.unit_step());
                }
                SubRule::Object {
                    params: ExtractionParams::default(),
                    selector: ObjectSelector::All,
                    action: ObjectAction::Translate {
                        dr: offset.0,
                        dc: offset.1,
                    },
                }
            }
            TaskFamily::Upscale => {
                let factor = self.rng.random_range(2..=MAX_SCALE);
                SubRule::Scale {
                    rows: factor,
                    cols: factor,
                }
            }
        }
    }

    fn input_for(&mut self, family: TaskFamily, rule: &SubRule) -> Grid {
        match (family, rule) {
            (TaskFamily::Recolor, SubRule::Remap(table)) => {
                let (rows, cols) = (self.side(), self.side());
                let mut palette: Vec<Symbol> = table.keys().copied().collect();
                palette.push(DEFAULT_BACKGROUND);
                let mut cells = self.random_grid(rows, cols, &palette).cells().clone();
                // Both swapped symbols must appear for the pair to pin the table
                for (index, symbol) in table.keys().enumerate() {
                    if let Some(cell) = cells.get_mut((0, index.min(cols - 1))) {
                        *cell = *symbol;
                    }
                }
                Grid::from_valid(cells)
            }
            (TaskFamily::Translate, SubRule::Object { action, .. }) => {
                let (dr, dc) = match action {
                    ObjectAction::Translate { dr, dc } => (*dr, *dc),
                    _ => (0, 0),
                };
                self.block_input(dr, dc)
            }
            (TaskFamily::Upscale, _) => {
                let (rows, cols) = (
                    self.rng.random_range(2..=4),
                    self.rng.random_range(2..=4),
                );
                let palette: Vec<Symbol> = (0..4).collect();
                self.random_grid(rows, cols, &palette)
            }
            _ => {
                let (rows, cols) = (self.side(), self.side());
                let palette: Vec<Symbol> = (0..PALETTE_SIZE as Symbol).collect();
                self.random_grid(rows, cols, &palette)
            }
        }
    }

    /// Background grid with one uniform block that stays inside after moving
    fn block_input(&mut self, dr: isize, dc: isize) -> Grid {
        let rows = self.side();
        let cols = self.side();
        let height = self.rng.random_range(1..=(rows - 2).max(1));
        let width = self.rng.random_range(1..=(cols - 2).max(1));
        let top_range = placement_range(rows, height, dr);
        let left_range = placement_range(cols, width, dc);
        let top = self.rng.random_range(top_range.0..=top_range.1);
        let left = self.rng.random_range(left_range.0..=left_range.1);
        let symbol = self.foreground();

        let cells = Array2::from_shape_fn((rows, cols), |(r, c)| {
            if (top..top + height).contains(&r) && (left..left + width).contains(&c) {
                symbol
            } else {
                DEFAULT_BACKGROUND
            }
        });
        Grid::from_valid(cells)
    }
}

/// Inclusive range of start positions keeping a span inside after an offset
fn placement_range(extent: usize, span: usize, offset: isize) -> (usize, usize) {
    let low = if offset < 0 { offset.unsigned_abs() } else { 0 };
    let high = extent.saturating_sub(span + offset.max(0) as usize);
    if high < low { (low, low) } else { (low, high) }
}
