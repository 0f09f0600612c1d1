use serde::Deserialize;
use thiserror::Error;

use crate::math::kernelerror::MalformedTableError;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),

    #[error("measure function '{name}' is malformed: {source}")]
    MalformedTable {
        name: String,
        #[source]
        source: MalformedTableError,
    },

    #[error("key '{0}' not found")]
    NameNotFoundError(String),

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("key '{0}' defined more than once")]
    DuplicateName(String),
}

impl ManagerError {
    pub fn from_json_or_json_parse_error<T>(json_value: serde_json::Value) -> Result<T, Self>
    where
        T: for<'a> Deserialize<'a>,
    {
        serde_json::from_value(json_value).map_err(ManagerError::JsonParseError)
    }

    pub fn map_elem_not_found(name: &str) -> ManagerError {
        ManagerError::NameNotFoundError(name.to_owned())
    }
}
