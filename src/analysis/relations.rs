//! Pairwise placement of objects

use crate::analysis::detector::{AtomicDetector, GridContext};
use crate::analysis::patterns::{
    HorizontalRelation, Pattern, PatternKind, PatternLevel, VerticalRelation,
};
use crate::io::configuration::MAX_RELATION_OBJECTS;
use crate::spatial::grid::Region;

/// Vertical relation of `a` to `b`
pub const fn vertical_relation(a: &Region, b: &Region) -> VerticalRelation {
    if a.bottom() <= b.top {
        VerticalRelation::Above
    } else if b.bottom() <= a.top {
        VerticalRelation::Below
    } else {
        VerticalRelation::Overlapping
    }
}

/// Horizontal relation of `a` to `b`
pub const fn horizontal_relation(a: &Region, b: &Region) -> HorizontalRelation {
    if a.right() <= b.left {
        HorizontalRelation::LeftOf
    } else if b.right() <= a.left {
        HorizontalRelation::RightOf
    } else {
        HorizontalRelation::Overlapping
    }
}

/// Detector for the relative placement of the first few objects
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialRelationDetector;

impl AtomicDetector for SpatialRelationDetector {
    fn name(&self) -> &'static str {
        "spatial_relation"
    }

    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern> {
        let objects = context.objects();
        let objects = objects.get(..MAX_RELATION_OBJECTS).unwrap_or(objects);
        let (rows, cols) = context.grid.dimensions();
        let mut patterns = Vec::new();

        for (i, first) in objects.iter().enumerate() {
            for second in objects.iter().skip(i + 1) {
                let footprint = first
                    .footprint(rows, cols)
                    .union(&second.footprint(rows, cols));
                patterns.push(
                    Pattern::new(
                        PatternLevel::Atomic,
                        PatternKind::SpatialRelation {
                            first: first.id,
                            second: second.id,
                            vertical: vertical_relation(&first.bbox, &second.bbox),
                            horizontal: horizontal_relation(&first.bbox, &second.bbox),
                        },
                        context.origin,
                    )
                    .with_regions(vec![first.bbox, second.bbox])
                    .with_objects(vec![first.id, second.id])
                    .with_confidence(1.0)
                    .with_evidence(1)
                    .with_footprint(footprint),
                );
            }
        }

        patterns
    }
}
