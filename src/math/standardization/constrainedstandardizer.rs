use nalgebra::{
    DMatrix,
    DVector
};
use tracing::trace;

use crate::math::kernelerror::InvalidInputError;
use crate::math::standardization::standardization::{
    gain_from_parts,
    Standardization
};
use crate::math::strategy::Strategy;

// ─────────────────────────────────────────────
// Unit-energy standardization
// ─────────────────────────────────────────────
//
// ‖a‖ = s · sqrt(Σ (a_i / s)²)，s = max |a_i|，避免平方時溢位或下溢。
// 特殊情況（兩種策略完全相同）：
//   全零向量  → b = 0，G = 0，norm = 0
//   p = 1     → b = [sign(a_0)]，G = [[0]]，norm = |a_0|

fn validate(a: &DVector<f64>) -> Result<(), InvalidInputError> {
    if a.is_empty() {
        return Err(InvalidInputError::EmptySample);
    }
    match a.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(InvalidInputError::NonFiniteSample { index, value }),
        None => Ok(()),
    }
}

fn unit_energy_indexed(a: &DVector<f64>) -> (DVector<f64>, f64) {
    let p = a.len();
    let mut scale = 0.0_f64;
    for i in 0..p {
        let magnitude = a[i].abs();
        if magnitude > scale {
            scale = magnitude;
        }
    }
    if scale == 0.0 {
        trace!(p, "all-zero sample vector, returning zero standardization");
        return (DVector::zeros(p), 0.0);
    }
    if p == 1 {
        return (DVector::from_element(1, a[0].signum()), scale);
    }

    let mut b = DVector::zeros(p);
    let mut energy = 0.0;
    for i in 0..p {
        b[i] = a[i] / scale;
        energy += b[i] * b[i];
    }
    let root = energy.sqrt();
    for i in 0..p {
        b[i] /= root;
    }
    (b, scale * root)
}

fn unit_energy_combinators(a: &DVector<f64>) -> (DVector<f64>, f64) {
    let p = a.len();
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        trace!(p, "all-zero sample vector, returning zero standardization");
        return (DVector::zeros(p), 0.0);
    }
    if p == 1 {
        return (DVector::from_element(1, a[0].signum()), scale);
    }

    let scaled = a.map(|v| v / scale);
    let energy = scaled.iter().fold(0.0, |acc, s| acc + s * s);
    let root = energy.sqrt();
    (scaled.map(|s| s / root), scale * root)
}

fn gain_indexed(b: &DVector<f64>, norm: f64) -> DMatrix<f64> {
    let p = b.len();
    let mut gain = DMatrix::zeros(p, p);
    if norm == 0.0 || p == 1 {
        return gain;
    }
    for j in 0..p {
        for i in 0..p {
            let delta = if i == j { 1.0 } else { 0.0 };
            gain[(i, j)] = (delta - b[i] * b[j]) / norm;
        }
    }
    gain
}

/// Standardizes `a` to unit energy and reports the gain of that transform.
///
/// With `test_mode` set the `p×p` gain matrix is materialized by the selected
/// strategy itself; otherwise only the norm is kept and
/// [`Standardization::gain`] rebuilds the matrix when asked.
pub fn standardize_and_gain(
    a: &DVector<f64>,
    strategy: Strategy,
    test_mode: bool,
) -> Result<Standardization, InvalidInputError> {
    validate(a)?;
    let (b, norm) = match strategy {
        Strategy::Old => unit_energy_indexed(a),
        Strategy::New => unit_energy_combinators(a),
    };
    if !test_mode {
        return Ok(Standardization::Compact { b, norm });
    }
    let gain = match strategy {
        Strategy::Old => gain_indexed(&b, norm),
        Strategy::New => gain_from_parts(&b, norm),
    };
    Ok(Standardization::Expanded { b, gain, norm })
}
