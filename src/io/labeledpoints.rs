use nalgebra::Vector3;
use serde::{
    Deserialize,
    Serialize
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum PointType {
    Unknown,
    Landmark,
}

/// Labeled 3D positions sharing one unit and one coordinate-system tag.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoints {
    crs: String,
    units: String,
    labels: Vec<String>,
    positions: Vec<Vector3<f64>>,
    types: Vec<PointType>,
}

impl LabeledPoints {
    pub fn new(crs: String, units: String) -> LabeledPoints {
        LabeledPoints {
            crs,
            units,
            labels: Vec::new(),
            positions: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn push(&mut self, label: String, position: Vector3<f64>, point_type: PointType) {
        self.labels.push(label);
        self.positions.push(position);
        self.types.push(point_type);
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn types(&self) -> &[PointType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First point carrying `label`.
    pub fn get(&self, label: &str) -> Option<(&Vector3<f64>, PointType)> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| (&self.positions[i], self.types[i]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector3<f64>, PointType)> + '_ {
        self.labels
            .iter()
            .zip(self.positions.iter())
            .zip(self.types.iter())
            .map(|((label, position), point_type)| (label.as_str(), position, *point_type))
    }
}
