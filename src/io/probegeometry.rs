use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    Read
};
use std::path::Path;

use nalgebra::{
    Matrix3,
    Vector3
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::io::labeledpoints::{
    LabeledPoints,
    PointType
};

pub const DIGPTS_CRS: &str = "digitized";
pub const DEFAULT_DIGPTS_UNITS: &str = "mm";

#[derive(Error, Debug)]
pub enum ProbeGeometryError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),

    #[error("more than one unit found: {0:?}")]
    InconsistentUnits(Vec<String>),

    #[error("no markup declares coordinate units")]
    MissingUnits,

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("control point '{label}' has {found} orientation values, expected 9")]
    InvalidOrientation { label: String, found: usize },
}

// ─────────────────────────────────────────────
// Markups JSON
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct MarkupsJsonProp {
    markups: Vec<MarkupJsonProp>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkupJsonProp {
    coordinate_units: String,
    #[serde(default)]
    control_points: Vec<ControlPointJsonProp>
}

#[derive(Deserialize)]
struct ControlPointJsonProp {
    label: String,
    position: [f64; 3],
    orientation: Vec<f64>
}

/// Rotates `position` into the markup frame: `pᵀ O`, `O` read row-major.
fn oriented_position(control_point: &ControlPointJsonProp) -> Result<Vector3<f64>, ProbeGeometryError> {
    if control_point.orientation.len() != 9 {
        return Err(ProbeGeometryError::InvalidOrientation {
            label: control_point.label.clone(),
            found: control_point.orientation.len(),
        });
    }
    let orientation = Matrix3::from_row_slice(&control_point.orientation);
    Ok(orientation.tr_mul(&Vector3::from(control_point.position)))
}

pub fn read_mrk_json_from_reader<R: Read>(reader: R, crs: &str) -> Result<LabeledPoints, ProbeGeometryError> {
    let json_prop: MarkupsJsonProp = serde_json::from_reader(reader)?;

    let mut units: Vec<String> = Vec::new();
    for markup in json_prop.markups.iter() {
        if !units.contains(&markup.coordinate_units) {
            units.push(markup.coordinate_units.clone());
        }
    }
    if units.len() > 1 {
        return Err(ProbeGeometryError::InconsistentUnits(units));
    }
    let unit = units.pop().ok_or(ProbeGeometryError::MissingUnits)?;

    let mut points = LabeledPoints::new(crs.to_owned(), unit);
    for markup in json_prop.markups.iter() {
        for control_point in markup.control_points.iter() {
            let position = oriented_position(control_point)?;
            points.push(control_point.label.clone(), position, PointType::Landmark);
        }
    }
    debug!(points = points.len(), units = points.units(), "markups parsed");
    Ok(points)
}

/// Reads landmarks from a Slicer markups (`.mrk.json`) file.
pub fn read_mrk_json<P: AsRef<Path>>(path: P, crs: &str) -> Result<LabeledPoints, ProbeGeometryError> {
    let file = File::open(path)?;
    read_mrk_json_from_reader(BufReader::new(file), crs)
}

// ─────────────────────────────────────────────
// Digitizer text
// ─────────────────────────────────────────────

fn parse_digpts_line(number: usize, line: &str) -> Result<(String, Vector3<f64>), ProbeGeometryError> {
    let malformed = |reason: String| ProbeGeometryError::MalformedLine { line: number, reason };

    let (label, coords) = line
        .split_once(':')
        .ok_or_else(|| malformed("missing ':' between label and coordinates".to_owned()))?;
    let values = coords
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|error| malformed(format!("invalid coordinate '{}': {}", token, error)))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    if values.len() != 3 {
        return Err(malformed(format!("expected 3 coordinates, found {}", values.len())));
    }
    Ok((label.trim().to_owned(), Vector3::new(values[0], values[1], values[2])))
}

/// Parses `label: x y z` lines. Blank lines are skipped.
pub fn read_digpts_from_reader<R: BufRead>(reader: R, units: &str) -> Result<LabeledPoints, ProbeGeometryError> {
    let mut points = LabeledPoints::new(DIGPTS_CRS.to_owned(), units.to_owned());
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (label, position) = parse_digpts_line(index + 1, trimmed)?;
        points.push(label, position, PointType::Unknown);
    }
    debug!(points = points.len(), units, "digitized points parsed");
    Ok(points)
}

pub fn read_digpts<P: AsRef<Path>>(path: P, units: &str) -> Result<LabeledPoints, ProbeGeometryError> {
    let file = File::open(path)?;
    read_digpts_from_reader(BufReader::new(file), units)
}
