use std::cell::{
    Cell,
    Ref,
    RefCell
};
use std::fs::File;
use std::io::BufReader;

use nalgebra::DVector;
use serde::Deserialize;
use tracing::info;

use crate::manager::managererror::ManagerError;
use crate::manager::manager::IManager;
use crate::math::kernelerror::InvalidInputError;
use crate::math::piecewisepolynomial::measurefunctionmanager::{
    new_measure_function_manager,
    MeasureFunctionManager
};
use crate::math::piecewisepolynomial::piecewisepolynomialtable::PiecewisePolynomialTable;
use crate::math::standardization::constrainedstandardizer;
use crate::math::standardization::standardization::Standardization;
use crate::math::strategy::Strategy;
use crate::verification::strategyequivalence::StrategyEquivalence;


#[derive(Deserialize)]
struct ConfigurationJsonProp {
    #[serde(default)]
    evaluation_strategy: Strategy,
    #[serde(default)]
    standardization_strategy: Strategy,
    #[serde(default)]
    verification_tolerance: f64,
    #[serde(default)]
    measure_function: Vec<serde_json::Value>
}

pub struct Configuration {
    evaluation_strategy: Cell<Strategy>,
    standardization_strategy: Cell<Strategy>,
    verification_tolerance: Cell<f64>,
    measure_function_manager_cell: RefCell<MeasureFunctionManager>
}


impl Configuration {
    pub fn new() -> Configuration {
        Configuration {
            evaluation_strategy: Cell::new(Strategy::default()),
            standardization_strategy: Cell::new(Strategy::default()),
            verification_tolerance: Cell::new(0.0),
            measure_function_manager_cell: RefCell::new(new_measure_function_manager())
        }
    }

    pub fn evaluation_strategy(&self) -> Strategy {
        self.evaluation_strategy.get()
    }

    pub fn set_evaluation_strategy(&self, strategy: Strategy) {
        self.evaluation_strategy.set(strategy);
    }

    pub fn standardization_strategy(&self) -> Strategy {
        self.standardization_strategy.get()
    }

    pub fn set_standardization_strategy(&self, strategy: Strategy) {
        self.standardization_strategy.set(strategy);
    }

    pub fn verification_tolerance(&self) -> f64 {
        self.verification_tolerance.get()
    }

    pub fn strategy_equivalence(&self) -> StrategyEquivalence {
        StrategyEquivalence::with_tolerance(self.verification_tolerance.get())
    }

    pub fn measure_function_manager(&self) -> Ref<'_, MeasureFunctionManager> {
        self.measure_function_manager_cell.borrow()
    }

    /// Evaluates `table` at `x` with the configured evaluation strategy.
    pub fn evaluate(&self, table: &PiecewisePolynomialTable, x: f64) -> Result<f64, InvalidInputError> {
        table.evaluate(x, self.evaluation_strategy.get())
    }

    /// Standardizes `a` with the configured standardization strategy.
    pub fn standardize_and_gain(&self, a: &DVector<f64>, test_mode: bool) -> Result<Standardization, InvalidInputError> {
        constrainedstandardizer::standardize_and_gain(a, self.standardization_strategy.get(), test_mode)
    }

    /// Loads a configuration document. Nothing changes unless every record loads.
    pub fn from_json_value(&self, json_value: serde_json::Value) -> Result<(), ManagerError> {
        let json_prop: ConfigurationJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
        let measure_function_manager = self.measure_function_manager_cell.borrow();
        measure_function_manager.insert_obj_from_json_vec(&json_prop.measure_function)?;
        self.evaluation_strategy.set(json_prop.evaluation_strategy);
        self.standardization_strategy.set(json_prop.standardization_strategy);
        self.verification_tolerance.set(json_prop.verification_tolerance);
        info!(
            evaluation_strategy = %json_prop.evaluation_strategy,
            standardization_strategy = %json_prop.standardization_strategy,
            measure_functions = measure_function_manager.len(),
            "configuration loaded"
        );
        Ok(())
    }

    pub fn from_json_str(&self, json: &str) -> Result<(), ManagerError> {
        let json_value: serde_json::Value = serde_json::from_str(json)?;
        self.from_json_value(json_value)
    }

    pub fn from_reader(&self, file_path: String) -> Result<(), ManagerError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_value: serde_json::Value = serde_json::from_reader(reader)?;
        self.from_json_value(json_value)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}
