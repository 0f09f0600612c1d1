use nalgebra::DVector;
use thiserror::Error;
use tracing::warn;

use crate::math::kernelerror::InvalidInputError;
use crate::math::piecewisepolynomial::piecewisepolynomialtable::PiecewisePolynomialTable;
use crate::math::standardization::constrainedstandardizer::standardize_and_gain;
use crate::math::standardization::standardization::Standardization;
use crate::math::strategy::Strategy;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// The `Old` and `New` strategies produced different numbers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyMismatchError {
    #[error("evaluation at x = {x}: old strategy gave {old}, new strategy gave {new}")]
    Evaluation { x: f64, old: f64, new: f64 },

    #[error("standardized vector differs at index {index}: old {old}, new {new}")]
    StandardizedVector { index: usize, old: f64, new: f64 },

    #[error("gain matrix differs at ({row}, {column}): old {old}, new {new}")]
    Gain {
        row: usize,
        column: usize,
        old: f64,
        new: f64,
    },

    #[error("norm differs: old {old}, new {new}")]
    Norm { old: f64, new: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error(transparent)]
    Mismatch(#[from] StrategyMismatchError),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

// ─────────────────────────────────────────────
// StrategyEquivalence
// ─────────────────────────────────────────────

/// Runs a kernel under both strategies and fails when they disagree.
///
/// A zero tolerance demands exact agreement (`0.0` and `-0.0` compare equal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyEquivalence {
    tolerance: f64,
}

impl Default for StrategyEquivalence {
    fn default() -> Self {
        StrategyEquivalence::exact()
    }
}

impl StrategyEquivalence {
    pub fn exact() -> StrategyEquivalence {
        StrategyEquivalence { tolerance: 0.0 }
    }

    /// Negative or NaN tolerances fall back to exact comparison.
    pub fn with_tolerance(tolerance: f64) -> StrategyEquivalence {
        if tolerance.is_nan() || tolerance < 0.0 {
            StrategyEquivalence::exact()
        } else {
            StrategyEquivalence { tolerance }
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn agrees(&self, old: f64, new: f64) -> bool {
        old == new || (old - new).abs() <= self.tolerance
    }

    /// Returns the agreed value of the `New` strategy.
    pub fn check_evaluation(&self, table: &PiecewisePolynomialTable, x: f64) -> Result<f64, VerificationError> {
        let old = table.evaluate(x, Strategy::Old)?;
        let new = table.evaluate(x, Strategy::New)?;
        if !self.agrees(old, new) {
            warn!(x, old, new, "piecewise polynomial strategies disagree");
            return Err(StrategyMismatchError::Evaluation { x, old, new }.into());
        }
        Ok(new)
    }

    pub fn check_evaluations(&self, table: &PiecewisePolynomialTable, xs: &[f64]) -> Result<Vec<f64>, VerificationError> {
        xs.iter()
            .map(|&x| self.check_evaluation(table, x))
            .collect()
    }

    /// Compares `b`, `G` and the norm, all produced in test mode.
    pub fn check_standardization(&self, a: &DVector<f64>) -> Result<Standardization, VerificationError> {
        let old = standardize_and_gain(a, Strategy::Old, true)?;
        let new = standardize_and_gain(a, Strategy::New, true)?;

        if !self.agrees(old.norm(), new.norm()) {
            warn!(old = old.norm(), new = new.norm(), "standardization norms disagree");
            return Err(StrategyMismatchError::Norm { old: old.norm(), new: new.norm() }.into());
        }
        for (index, (&o, &n)) in old.b().iter().zip(new.b().iter()).enumerate() {
            if !self.agrees(o, n) {
                warn!(index, old = o, new = n, "standardized vectors disagree");
                return Err(StrategyMismatchError::StandardizedVector { index, old: o, new: n }.into());
            }
        }
        let old_gain = old.gain();
        let new_gain = new.gain();
        for column in 0..new_gain.ncols() {
            for row in 0..new_gain.nrows() {
                let (o, n) = (old_gain[(row, column)], new_gain[(row, column)]);
                if !self.agrees(o, n) {
                    warn!(row, column, old = o, new = n, "gain matrices disagree");
                    return Err(StrategyMismatchError::Gain { row, column, old: o, new: n }.into());
                }
            }
        }
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::piecewisepolynomial::piecewisepolynomialtable::Basis;

    #[test]
    fn tolerance_is_sanitized() {
        assert_eq!(StrategyEquivalence::with_tolerance(-1.0).tolerance(), 0.0);
        assert_eq!(StrategyEquivalence::with_tolerance(f64::NAN).tolerance(), 0.0);
        assert_eq!(StrategyEquivalence::with_tolerance(1e-12).tolerance(), 1e-12);
        assert!(StrategyEquivalence::exact().agrees(0.0, -0.0));
        assert!(!StrategyEquivalence::exact().agrees(1.0, 1.0 + f64::EPSILON));
    }

    #[test]
    fn kernel_errors_pass_through() {
        let table = PiecewisePolynomialTable::new(vec![0.0, 1.0], vec![vec![1.0]], Basis::Global).unwrap();
        assert!(matches!(
            StrategyEquivalence::exact().check_evaluation(&table, f64::NAN),
            Err(VerificationError::InvalidInput(InvalidInputError::NonFiniteQuery { .. }))
        ));
        assert_eq!(
            StrategyEquivalence::exact().check_standardization(&DVector::zeros(0)),
            Err(VerificationError::InvalidInput(InvalidInputError::EmptySample))
        );
    }
}
