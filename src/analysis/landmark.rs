//! The salient object of a grid

use crate::analysis::detector::{AtomicDetector, GridContext};
use crate::analysis::patterns::{LandmarkDescriptor, Pattern, PatternKind, PatternLevel};
use crate::spatial::objects::GridObject;

/// Largest object, ties resolved toward the lowest id
pub fn largest_object(objects: &[GridObject]) -> Option<&GridObject> {
    objects
        .iter()
        .min_by(|a, b| b.size().cmp(&a.size()).then(a.id.cmp(&b.id)))
}

/// Smallest object, ties resolved toward the lowest id
pub fn smallest_object(objects: &[GridObject]) -> Option<&GridObject> {
    objects
        .iter()
        .min_by(|a, b| a.size().cmp(&b.size()).then(a.id.cmp(&b.id)))
}

/// Summary of an object used to track it across a pair
pub fn describe(object: &GridObject) -> LandmarkDescriptor {
    LandmarkDescriptor {
        bbox: object.bbox,
        size: object.size(),
        symbol: object.dominant_symbol(),
        uniform: object.is_uniform(),
        mask: object.mask.iter().by_vals().collect(),
        symmetry: object.symmetry,
    }
}

/// Detector for the largest object
///
/// Confidence reflects how clearly the landmark stands out: 1.0 when it is
/// the only object, 0.5 when another object has the same size.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkDetector;

impl AtomicDetector for LandmarkDetector {
    fn name(&self) -> &'static str {
        "landmark"
    }

    fn detect(&self, context: &GridContext<'_>) -> Vec<Pattern> {
        let objects = context.objects();
        let Some(landmark) = largest_object(objects) else {
            return Vec::new();
        };
        let runner_up = objects
            .iter()
            .filter(|o| o.id != landmark.id)
            .map(GridObject::size)
            .max()
            .unwrap_or(0);
        let confidence = landmark.size() as f64 / (landmark.size() + runner_up) as f64;
        let (rows, cols) = context.grid.dimensions();

        vec![
            Pattern::new(
                PatternLevel::Atomic,
                PatternKind::Landmark {
                    object: landmark.id,
                    descriptor: describe(landmark),
                },
                context.origin,
            )
            .with_regions(vec![landmark.bbox])
            .with_objects(vec![landmark.id])
            .with_confidence(confidence)
            .with_evidence(landmark.size())
            .with_footprint(landmark.footprint(rows, cols)),
        ]
    }
}
