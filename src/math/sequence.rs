//! Progression tests over integer sequences
//!
//! Both tests require at least `min_length` values and a non-trivial step:
//! a constant sequence is neither arithmetic nor geometric here.

use num_traits::{PrimInt, Signed, ToPrimitive};

/// Common difference of an arithmetic progression
///
/// Returns `None` for sequences shorter than `min_length`, for a zero
/// difference, or when consecutive differences disagree.
pub fn arithmetic_step<T>(values: &[T], min_length: usize) -> Option<T>
where
    T: PrimInt + Signed,
{
    if values.len() < min_length.max(2) {
        return None;
    }
    let step = values.get(1)?.checked_sub(values.first()?)?;
    if step.is_zero() {
        return None;
    }
    values
        .windows(2)
        .all(|w| matches!(w, [a, b] if b.checked_sub(a) == Some(step)))
        .then_some(step)
}

/// Common ratio of a geometric progression
///
/// All values must be non-zero and each term must be an exact integer
/// multiple (or exact integer divisor) of the previous one. The ratio is
/// reported as a float so shrinking sequences yield values below one.
pub fn geometric_ratio<T>(values: &[T], min_length: usize) -> Option<f64>
where
    T: PrimInt + Signed + ToPrimitive,
{
    if values.len() < min_length.max(2) || values.iter().any(|v| v.is_zero()) {
        return None;
    }

    let first = *values.first()?;
    let second = *values.get(1)?;
    let growing = second.abs() >= first.abs();
    let (numerator, denominator) = if growing { (second, first) } else { (first, second) };
    if !(numerator % denominator).is_zero() {
        return None;
    }
    let factor = numerator / denominator;
    if factor == T::one() {
        return None;
    }

    let consistent = values.windows(2).all(|w| match w {
        [a, b] if growing => a.checked_mul(&factor) == Some(*b),
        [a, b] => b.checked_mul(&factor) == Some(*a),
        _ => false,
    });
    if !consistent {
        return None;
    }

    let factor = factor.to_f64()?;
    Some(if growing { factor } else { factor.recip() })
}
