//! Similarity measures used to match objects across a training pair

use crate::io::configuration::{W_HISTOGRAM, W_IOU, W_SHAPE};
use crate::spatial::grid::Histogram;
use crate::spatial::objects::GridObject;

/// Normalized histogram intersection in [0, 1]
///
/// Sum of per-symbol minima divided by the larger total, so two histograms
/// score 1.0 only when they are identical.
pub fn histogram_intersection(a: &Histogram, b: &Histogram) -> f64 {
    let shared: usize = a.iter().zip(b.iter()).map(|(x, y)| (*x).min(*y)).sum();
    let total = a.iter().sum::<usize>().max(b.iter().sum::<usize>());
    if total == 0 {
        0.0
    } else {
        shared as f64 / total as f64
    }
}

/// 1.0 when both objects have identical masks, 0.0 otherwise
pub fn shape_match(a: &GridObject, b: &GridObject) -> f64 {
    if a.same_shape(b) { 1.0 } else { 0.0 }
}

/// Weighted correspondence score between an input and an output object
pub fn correspondence_score(input: &GridObject, output: &GridObject) -> f64 {
    W_IOU.mul_add(
        input.bbox.iou(&output.bbox),
        W_HISTOGRAM.mul_add(
            histogram_intersection(&input.histogram, &output.histogram),
            W_SHAPE * shape_match(input, output),
        ),
    )
}
