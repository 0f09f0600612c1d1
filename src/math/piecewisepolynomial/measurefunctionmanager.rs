use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::manager::manager::Manager;
use crate::manager::managererror::ManagerError;
use crate::math::kernelerror::MalformedTableError;
use crate::math::piecewisepolynomial::piecewisepolynomialtable::{
    Basis,
    PiecewisePolynomialTable
};

/// ppform record as stored in the precomputed measure-function artifact.
///
/// `pieces` and `order` are optional; when given they must agree with `coefs`.
#[derive(Deserialize)]
struct PiecewisePolynomialJsonProp {
    breaks: Vec<f64>,
    coefs: Vec<Vec<f64>>,
    #[serde(default)]
    basis: Basis,
    pieces: Option<usize>,
    order: Option<usize>
}

#[derive(Deserialize)]
struct MeasureFunctionJsonProp {
    name: String,
    pp: PiecewisePolynomialJsonProp
}

fn check_declared(
    field: &'static str,
    declared: Option<usize>,
    actual: usize,
) -> Result<(), MalformedTableError> {
    match declared {
        Some(declared) if declared != actual => Err(MalformedTableError::DeclaredShapeMismatch {
            field,
            declared,
            actual,
        }),
        _ => Ok(()),
    }
}

fn table_from_json_prop(pp: PiecewisePolynomialJsonProp) -> Result<PiecewisePolynomialTable, MalformedTableError> {
    check_declared("pieces", pp.pieces, pp.coefs.len())?;
    if let Some(first_row) = pp.coefs.first() {
        check_declared("order", pp.order, first_row.len())?;
    }
    PiecewisePolynomialTable::new(pp.breaks, pp.coefs, pp.basis)
}

fn get_measure_function_from_json(json_value: serde_json::Value) -> Result<Arc<PiecewisePolynomialTable>, ManagerError> {
    let json_prop: MeasureFunctionJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
    let name = json_prop.name;
    let table = table_from_json_prop(json_prop.pp)
        .map_err(|source| ManagerError::MalformedTable { name: name.clone(), source })?;
    debug!(name = %name, segments = table.segments(), "measure function loaded");
    Ok(Arc::new(table))
}

pub type MeasureFunctionManager = Manager<Arc<PiecewisePolynomialTable>>;

pub fn new_measure_function_manager() -> MeasureFunctionManager {
    Manager::new(get_measure_function_from_json)
}
