use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;

/// Selects which of the two interchangeable implementations a kernel runs.
///
/// Both variants honour the same numerical contract; the choice never changes
/// an observable result, only the internal method used to reach it.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Strategy {
    /// Index loops and a hand-written biased bisection.
    #[serde(alias = "old")]
    Old,
    /// Slice/iterator combinators and `partition_point`.
    #[default]
    #[serde(alias = "new")]
    New,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Old, Strategy::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Old => "old",
            Strategy::New => "new",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy '{0}', expected 'old' or 'new'")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Strategy::Old),
            "new" => Ok(Strategy::New),
            _ => Err(ParseStrategyError(s.to_owned())),
        }
    }
}
