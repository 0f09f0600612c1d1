use nalgebra::DVector;
use serde::{
    Deserialize,
    Serialize
};
use tracing::debug;

use crate::math::kernelerror::{
    InvalidInputError,
    MalformedTableError
};
use crate::math::piecewisepolynomial::segmentsearch::{
    biased_bisection,
    partition_search
};
use crate::math::strategy::Strategy;

// ─────────────────────────────────────────────
// Basis
// ─────────────────────────────────────────────

/// Variable in which each segment polynomial is expressed.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Basis {
    /// `p_i(x - breakpoints[i])`，即 ppform（預先計算的 measure function 皆採用此形式）
    #[default]
    #[serde(alias = "local")]
    Local,
    /// `p_i(x)`
    #[serde(alias = "global")]
    Global,
}

impl Basis {
    #[inline]
    fn abscissa(&self, x: f64, lhs_x: f64) -> f64 {
        match self {
            Basis::Local => x - lhs_x,
            Basis::Global => x,
        }
    }
}

// ─────────────────────────────────────────────
// Horner
// ─────────────────────────────────────────────
//
// 兩種寫法的運算順序完全相同（皆為 mul_add），因此結果逐位元一致。

fn horner_indexed(coefs: &[f64], t: f64) -> f64 {
    let mut result = coefs[0];
    for i in 1..coefs.len() {
        result = f64::mul_add(result, t, coefs[i]);
    }
    result
}

fn horner_fold(coefs: &[f64], t: f64) -> f64 {
    match coefs.split_first() {
        Some((&lead, rest)) => rest
            .iter()
            .fold(lead, |acc, &beta| f64::mul_add(acc, t, beta)),
        None => 0.0,
    }
}

fn compute_deriv_coefs(coefs: &[f64]) -> Vec<f64> {
    let degree = coefs.len() - 1;
    if degree == 0 {
        vec![0.0]
    } else {
        (0..degree)
            .map(|i| (degree - i) as f64 * coefs[i])
            .collect()
    }
}

// ─────────────────────────────────────────────
// PiecewisePolynomialTable
// ─────────────────────────────────────────────

/// Immutable breakpoint/coefficient table of a piecewise polynomial.
///
/// Segment `i` covers `[breakpoints[i], breakpoints[i+1])`. Its coefficients are
/// stored highest degree first. Queries outside the table are evaluated with the
/// first or last segment's polynomial.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomialTable {
    breakpoints: Vec<f64>,
    /// Row-major, `order` coefficients per segment.
    coefs: Vec<f64>,
    order: usize,
    deriv_coefs: Vec<f64>,
    deriv_order: usize,
    basis: Basis,
}

impl PiecewisePolynomialTable {
    pub fn new(
        breakpoints: Vec<f64>,
        coefficients: Vec<Vec<f64>>,
        basis: Basis,
    ) -> Result<PiecewisePolynomialTable, MalformedTableError> {
        Self::validate_breakpoints(&breakpoints)?;
        let segments = breakpoints.len() - 1;
        let order = Self::validate_coefficients(segments, &coefficients)?;

        let deriv_rows: Vec<Vec<f64>> = coefficients
            .iter()
            .map(|row| compute_deriv_coefs(row))
            .collect();
        let deriv_order = deriv_rows[0].len();

        debug!(
            segments,
            degree = order - 1,
            ?basis,
            lower = breakpoints[0],
            upper = breakpoints[segments],
            "piecewise polynomial table constructed"
        );

        Ok(PiecewisePolynomialTable {
            breakpoints,
            coefs: coefficients.concat(),
            order,
            deriv_coefs: deriv_rows.concat(),
            deriv_order,
            basis,
        })
    }

    fn validate_breakpoints(breakpoints: &[f64]) -> Result<(), MalformedTableError> {
        if breakpoints.len() < 2 {
            return Err(MalformedTableError::TooFewBreakpoints(breakpoints.len()));
        }
        for (index, &value) in breakpoints.iter().enumerate() {
            if !value.is_finite() {
                return Err(MalformedTableError::NonFiniteBreakpoint { index, value });
            }
        }
        for (index, pair) in breakpoints.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(MalformedTableError::NonIncreasingBreakpoints {
                    index: index + 1,
                    previous: pair[0],
                    value: pair[1],
                });
            }
        }
        Ok(())
    }

    fn validate_coefficients(
        segments: usize,
        coefficients: &[Vec<f64>],
    ) -> Result<usize, MalformedTableError> {
        if coefficients.len() != segments {
            return Err(MalformedTableError::SegmentCountMismatch {
                segments,
                rows: coefficients.len(),
            });
        }
        let order = coefficients[0].len();
        for (row, coefs) in coefficients.iter().enumerate() {
            if coefs.is_empty() {
                return Err(MalformedTableError::EmptyCoefficientRow { row });
            }
            if coefs.len() != order {
                return Err(MalformedTableError::RaggedCoefficients {
                    row,
                    expected: order,
                    found: coefs.len(),
                });
            }
            if let Some((column, &value)) = coefs.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(MalformedTableError::NonFiniteCoefficient { row, column, value });
            }
        }
        Ok(order)
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn segments(&self) -> usize {
        self.breakpoints.len() - 1
    }

    pub fn degree(&self) -> usize {
        self.order - 1
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn lower_bound(&self) -> f64 {
        self.breakpoints[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.breakpoints[self.segments()]
    }

    /// Coefficients of segment `i`, highest degree first.
    pub fn coefficients(&self, i: usize) -> Option<&[f64]> {
        if i < self.segments() {
            Some(&self.coefs[i * self.order..(i + 1) * self.order])
        } else {
            None
        }
    }

    fn check_query(x: f64) -> Result<(), InvalidInputError> {
        if x.is_finite() {
            Ok(())
        } else {
            Err(InvalidInputError::NonFiniteQuery { value: x })
        }
    }

    fn find_segment(&self, x: f64, strategy: Strategy) -> usize {
        match strategy {
            Strategy::Old => biased_bisection(&self.breakpoints, x),
            Strategy::New => partition_search(&self.breakpoints, x),
        }
    }

    /// Index of the segment whose polynomial is used at `x`.
    pub fn segment_index(&self, x: f64, strategy: Strategy) -> Result<usize, InvalidInputError> {
        Self::check_query(x)?;
        Ok(self.find_segment(x, strategy))
    }

    fn evaluate_rows(&self, rows: &[f64], stride: usize, x: f64, strategy: Strategy) -> f64 {
        let i = self.find_segment(x, strategy);
        let t = self.basis.abscissa(x, self.breakpoints[i]);
        let row = &rows[i * stride..(i + 1) * stride];
        match strategy {
            Strategy::Old => horner_indexed(row, t),
            Strategy::New => horner_fold(row, t),
        }
    }

    pub fn evaluate(&self, x: f64, strategy: Strategy) -> Result<f64, InvalidInputError> {
        Self::check_query(x)?;
        Ok(self.evaluate_rows(&self.coefs, self.order, x, strategy))
    }

    pub fn derivative(&self, x: f64, strategy: Strategy) -> Result<f64, InvalidInputError> {
        Self::check_query(x)?;
        Ok(self.evaluate_rows(&self.deriv_coefs, self.deriv_order, x, strategy))
    }

    /// Evaluates every point of `xs`; the first non-finite point fails the batch.
    pub fn evaluate_many(&self, xs: &[f64], strategy: Strategy) -> Result<Vec<f64>, InvalidInputError> {
        xs.iter()
            .enumerate()
            .map(|(index, &x)| {
                if x.is_finite() {
                    Ok(self.evaluate_rows(&self.coefs, self.order, x, strategy))
                } else {
                    Err(InvalidInputError::NonFiniteBatchElement { index, value: x })
                }
            })
            .collect()
    }

    pub fn evaluate_vector(
        &self,
        xs: &DVector<f64>,
        strategy: Strategy,
    ) -> Result<DVector<f64>, InvalidInputError> {
        self.evaluate_many(xs.as_slice(), strategy)
            .map(DVector::from_vec)
    }
}

/// Free-function form of [`PiecewisePolynomialTable::evaluate`].
pub fn evaluate(
    table: &PiecewisePolynomialTable,
    x: f64,
    strategy: Strategy,
) -> Result<f64, InvalidInputError> {
    table.evaluate(x, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> PiecewisePolynomialTable {
        PiecewisePolynomialTable::new(
            vec![1.0, 2.0, 3.0],
            vec![vec![2.0, 0.0], vec![-1.0, 5.0]],
            Basis::Global,
        )
        .unwrap()
    }

    #[test]
    fn two_line_table_values() {
        let table = two_lines();
        for strategy in Strategy::ALL {
            assert_eq!(table.evaluate(1.5, strategy), Ok(3.0));
            assert_eq!(table.evaluate(2.0, strategy), Ok(3.0));
            assert_eq!(table.evaluate(0.5, strategy), Ok(1.0));
            assert_eq!(table.evaluate(3.0, strategy), Ok(2.0));
            assert_eq!(evaluate(&table, 4.0, strategy), Ok(1.0));
        }
    }

    #[test]
    fn local_basis_shifts_by_segment_start() {
        // p_0(t) = t^2 on [0, 1)，p_1(t) = 2t + 1 on [1, 3]
        let table = PiecewisePolynomialTable::new(
            vec![0.0, 1.0, 3.0],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 1.0]],
            Basis::Local,
        )
        .unwrap();
        for strategy in Strategy::ALL {
            assert_eq!(table.evaluate(0.5, strategy), Ok(0.25));
            assert_eq!(table.evaluate(2.0, strategy), Ok(3.0));
            assert_eq!(table.evaluate(-1.0, strategy), Ok(1.0));
            assert_eq!(table.derivative(0.5, strategy), Ok(1.0));
            assert_eq!(table.derivative(2.5, strategy), Ok(2.0));
        }
    }

    #[test]
    fn constant_segments_have_zero_derivative() {
        let table = PiecewisePolynomialTable::new(
            vec![0.0, 1.0],
            vec![vec![7.5]],
            Basis::Local,
        )
        .unwrap();
        assert_eq!(table.degree(), 0);
        assert_eq!(table.evaluate(0.3, Strategy::Old), Ok(7.5));
        assert_eq!(table.derivative(0.3, Strategy::New), Ok(0.0));
    }

    #[test]
    fn rejects_malformed_tables() {
        assert_eq!(
            PiecewisePolynomialTable::new(vec![1.0], vec![], Basis::Local),
            Err(MalformedTableError::TooFewBreakpoints(1))
        );
        assert_eq!(
            PiecewisePolynomialTable::new(vec![1.0, 1.0], vec![vec![1.0]], Basis::Local),
            Err(MalformedTableError::NonIncreasingBreakpoints { index: 1, previous: 1.0, value: 1.0 })
        );
        assert!(matches!(
            PiecewisePolynomialTable::new(vec![0.0, f64::NAN], vec![vec![1.0]], Basis::Local),
            Err(MalformedTableError::NonFiniteBreakpoint { index: 1, .. })
        ));
        assert_eq!(
            PiecewisePolynomialTable::new(vec![0.0, 1.0, 2.0], vec![vec![1.0]], Basis::Local),
            Err(MalformedTableError::SegmentCountMismatch { segments: 2, rows: 1 })
        );
        assert_eq!(
            PiecewisePolynomialTable::new(vec![0.0, 1.0, 2.0], vec![vec![1.0, 2.0], vec![1.0]], Basis::Local),
            Err(MalformedTableError::RaggedCoefficients { row: 1, expected: 2, found: 1 })
        );
        assert_eq!(
            PiecewisePolynomialTable::new(vec![0.0, 1.0], vec![vec![]], Basis::Local),
            Err(MalformedTableError::EmptyCoefficientRow { row: 0 })
        );
        assert!(matches!(
            PiecewisePolynomialTable::new(vec![0.0, 1.0], vec![vec![1.0, f64::INFINITY]], Basis::Local),
            Err(MalformedTableError::NonFiniteCoefficient { row: 0, column: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_queries() {
        let table = two_lines();
        assert!(matches!(
            table.evaluate(f64::NAN, Strategy::Old),
            Err(InvalidInputError::NonFiniteQuery { .. })
        ));
        assert_eq!(
            table.evaluate(f64::INFINITY, Strategy::New),
            Err(InvalidInputError::NonFiniteQuery { value: f64::INFINITY })
        );
        assert_eq!(
            table.evaluate_many(&[1.5, f64::NEG_INFINITY], Strategy::New),
            Err(InvalidInputError::NonFiniteBatchElement { index: 1, value: f64::NEG_INFINITY })
        );
    }

    #[test]
    fn batch_matches_pointwise() {
        let table = two_lines();
        let xs = DVector::from_vec(vec![0.0, 1.0, 1.75, 2.0, 2.5, 3.5]);
        let batch = table.evaluate_vector(&xs, Strategy::Old).unwrap();
        for (x, v) in xs.iter().zip(batch.iter()) {
            assert_eq!(table.evaluate(*x, Strategy::New).unwrap(), *v);
        }
    }

    #[test]
    fn accessors() {
        let table = two_lines();
        assert_eq!(table.segments(), 2);
        assert_eq!(table.degree(), 1);
        assert_eq!(table.lower_bound(), 1.0);
        assert_eq!(table.upper_bound(), 3.0);
        assert_eq!(table.coefficients(1), Some(&[-1.0, 5.0][..]));
        assert_eq!(table.coefficients(2), None);
        assert_eq!(table.segment_index(2.0, Strategy::Old), Ok(1));
    }
}
