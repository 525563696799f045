//! Confidence scoring and ranking
//!
//! A score is the product of three factors in [0, 1]: how exactly the
//! hypothesis fits, how much independent corroboration it has, and how
//! simple it is. Each factor is monotone in its input, so the product is
//! non-decreasing in exactness and corroboration and non-increasing in
//! complexity.

use std::cmp::Ordering;

use crate::io::configuration::COMPLEXITY_WEIGHT;

/// Where the evidence for a hypothesis comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceBasis {
    /// Measured inside one grid or pair; needs no corroboration
    WithinGrid,
    /// Number of training pairs supporting the hypothesis
    AcrossPairs(usize),
}

/// Inputs to the scoring function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence {
    /// Source of the evidence
    pub basis: EvidenceBasis,
    /// Fraction of the evidence that agrees, in [0, 1]
    pub exactness: f64,
    /// Rule complexity cost, lower is simpler
    pub complexity: usize,
}

impl Evidence {
    /// Evidence measured inside a single grid or pair
    pub const fn within_grid(exactness: f64, complexity: usize) -> Self {
        Self {
            basis: EvidenceBasis::WithinGrid,
            exactness,
            complexity,
        }
    }

    /// Evidence corroborated by `pairs` training pairs
    pub const fn across_pairs(pairs: usize, exactness: f64, complexity: usize) -> Self {
        Self {
            basis: EvidenceBasis::AcrossPairs(pairs),
            exactness,
            complexity,
        }
    }
}

/// Corroboration factor for a basis
///
/// `1 - 2^-(n+1)` for n supporting pairs, 0 when no pair supports.
pub fn corroboration(basis: EvidenceBasis) -> f64 {
    match basis {
        EvidenceBasis::WithinGrid => 1.0,
        EvidenceBasis::AcrossPairs(0) => 0.0,
        EvidenceBasis::AcrossPairs(pairs) => {
            let exponent = i32::try_from(pairs).unwrap_or(i32::MAX - 1);
            1.0 - 0.5_f64.powi(exponent.saturating_add(1))
        }
    }
}

/// Simplicity factor for a complexity cost
pub fn simplicity(complexity: usize) -> f64 {
    1.0 / COMPLEXITY_WEIGHT.mul_add(complexity as f64, 1.0)
}

/// Score evidence into a confidence in [0, 1]
pub fn score(evidence: &Evidence) -> f64 {
    let exactness = if evidence.exactness.is_finite() {
        evidence.exactness.clamp(0.0, 1.0)
    } else {
        0.0
    };
    exactness * corroboration(evidence.basis) * simplicity(evidence.complexity)
}

/// Order two hypotheses: higher confidence first, then lower complexity,
/// then earlier discovery
pub fn rank_order(
    a: (f64, usize, usize),
    b: (f64, usize, usize),
) -> Ordering {
    let (a_confidence, a_complexity, a_order) = a;
    let (b_confidence, b_complexity, b_order) = b;
    b_confidence
        .total_cmp(&a_confidence)
        .then(a_complexity.cmp(&b_complexity))
        .then(a_order.cmp(&b_order))
}
