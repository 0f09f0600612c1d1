use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::kernelerror::InvalidInputError;

/// Result of a constrained standardization.
///
/// `b = a / ‖a‖` and the gain `G = (I - b bᵀ) / ‖a‖` is the Jacobian of that
/// map. `Compact` keeps only `‖a‖` and builds `G` on demand; `Expanded` carries
/// the materialized `p×p` matrix. For an all-zero input `b`, `G` and the norm
/// are all zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Standardization {
    Compact {
        b: DVector<f64>,
        norm: f64,
    },
    Expanded {
        b: DVector<f64>,
        gain: DMatrix<f64>,
        norm: f64,
    },
}

impl Standardization {
    pub fn b(&self) -> &DVector<f64> {
        match self {
            Standardization::Compact { b, .. } => b,
            Standardization::Expanded { b, .. } => b,
        }
    }

    /// Euclidean norm of the input that was standardized.
    pub fn norm(&self) -> f64 {
        match self {
            Standardization::Compact { norm, .. } => *norm,
            Standardization::Expanded { norm, .. } => *norm,
        }
    }

    pub fn dimension(&self) -> usize {
        self.b().len()
    }

    pub fn is_degenerate(&self) -> bool {
        self.norm() == 0.0
    }

    pub fn gain(&self) -> DMatrix<f64> {
        match self {
            Standardization::Compact { b, norm } => gain_from_parts(b, *norm),
            Standardization::Expanded { gain, .. } => gain.clone(),
        }
    }

    /// Computes `G v` without materializing `G` when it is not already present.
    pub fn apply_gain(&self, v: &DVector<f64>) -> Result<DVector<f64>, InvalidInputError> {
        let p = self.dimension();
        if v.len() != p {
            return Err(InvalidInputError::DimensionMismatch { expected: p, found: v.len() });
        }
        match self {
            Standardization::Expanded { gain, .. } => Ok(gain * v),
            Standardization::Compact { b, norm } => {
                if *norm == 0.0 {
                    return Ok(DVector::zeros(p));
                }
                let projection = b.dot(v);
                Ok((v - b * projection) / *norm)
            }
        }
    }

    pub fn into_parts(self) -> (DVector<f64>, DMatrix<f64>) {
        match self {
            Standardization::Expanded { b, gain, .. } => (b, gain),
            Standardization::Compact { b, norm } => {
                let gain = gain_from_parts(&b, norm);
                (b, gain)
            }
        }
    }
}

/// `(δ_ij - b_i b_j) / norm`, or the zero matrix for the degenerate cases.
pub(crate) fn gain_from_parts(b: &DVector<f64>, norm: f64) -> DMatrix<f64> {
    let p = b.len();
    if norm == 0.0 || p == 1 {
        return DMatrix::zeros(p, p);
    }
    DMatrix::from_fn(p, p, |i, j| {
        let delta = if i == j { 1.0 } else { 0.0 };
        (delta - b[i] * b[j]) / norm
    })
}
