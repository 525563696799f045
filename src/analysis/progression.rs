//! Arithmetic and geometric progressions across ordered objects

use crate::analysis::detector::{AtomicDetector, GridContext};
use crate::analysis::patterns::{
    Attribute, ObjectOrder, Pattern, PatternKind, PatternLevel, Step,
};
use crate::io::configuration::MIN_PROGRESSION_LENGTH;
use crate::math::sequence::{arithmetic_step, geometric_ratio};
use crate::spatial::footprint::Footprint;
use crate::spatial::objects::GridObject;

const ATTRIBUTES: [Attribute; 4] = [
    Attribute::Size,
    Attribute::Height,
    Attribute::Width,
    Attribute::Symbol,
];

fn attribute_value(object: &GridObject, attribute: Attribute) -> i64 {
    let value = match attribute {
        Attribute::Size => object.size(),
        Attribute::Height => object.bbox.height,
        Attribute::Width => object.bbox.width,
        Attribute::Symbol => usize::from(object.dominant_symbol()),
    };
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Objects sorted into the given order
pub fn ordered<'a>(objects: &'a [GridObject], order: ObjectOrder) -> Vec<&'a GridObject> {
    let mut sorted: Vec<&GridObject> = objects.iter().collect();
    match order {
        ObjectOrder::RowMajor => {
            sorted.sort_by_key(|o| (o.bbox.top, o.bbox.left, o.id));
        }
        ObjectOrder::ColumnMajor => {
            sorted.sort_by_key(|o| (o.bbox.left, o.bbox.top, o.id));
        }
    }
    sorted
}

/// Detector for regular attribute changes along object sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionDetector;

impl AtomicDetector for ProgressionDetector {
    fn name(&self) -> &'static str {
        "progression"
    }

    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern> {
        let objects = context.objects();
        if objects.len() < MIN_PROGRESSION_LENGTH {
            return Vec::new();
        }

        let (rows, cols) = context.grid.dimensions();
        let mut patterns = Vec::new();
        let mut seen_orders: Vec<Vec<usize>> = Vec::new();

        for order in [ObjectOrder::RowMajor, ObjectOrder::ColumnMajor] {
            let sequence = ordered(objects, order);
            let ids: Vec<usize> = sequence.iter().map(|o| o.id).collect();
            if seen_orders.contains(&ids) {
                continue;
            }
            seen_orders.push(ids.clone());

            let mut footprint = Footprint::new(rows, cols);
            for object in &sequence {
                for &(r, c) in &object.cells {
                    footprint.insert(r, c);
                }
            }

            for attribute in ATTRIBUTES {
                let values: Vec<i64> = sequence
                    .iter()
                    .map(|o| attribute_value(o, attribute))
                    .collect();
                let step = arithmetic_step(&values, MIN_PROGRESSION_LENGTH)
                    .map(Step::Difference)
                    .or_else(|| {
                        geometric_ratio(&values, MIN_PROGRESSION_LENGTH).map(Step::Ratio)
                    });
                let Some(step) = step else {
                    continue;
                };

                patterns.push(
                    Pattern::new(
                        PatternLevel::Atomic,
                        PatternKind::Progression {
                            attribute,
                            order,
                            step,
                        },
                        context.origin,
                    )
                    .with_regions(sequence.iter().map(|o| o.bbox).collect())
                    .with_objects(ids.clone())
                    .with_confidence(1.0)
                    .with_evidence(sequence.len())
                    .with_footprint(footprint.clone()),
                );
            }
        }

        patterns
    }
}
