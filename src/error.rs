//! Error types for dataset loading and solving.

use std::path::PathBuf;

/// Reasons a solve request can fail.
///
/// Validation variants are raised while normalizing the configuration, before
/// any linear program is built. The rest abort the multi-pass solve as a whole.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// A numeric field is not a number or is negative.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: &'static str },

    /// The same item is both an input and a production target.
    #[error("cannot have {item} as both input and output")]
    ConflictingIO { item: String },

    /// Two maximize targets share a priority.
    #[error("two target items have the same maximization priority ({priority})")]
    DuplicatePriority { priority: f64 },

    #[error("no outputs set")]
    NoOutputsSpecified,

    /// A recipe-mode target names a recipe that is not enabled.
    #[error("cannot target disabled recipe {recipe}")]
    DisabledRecipeTargeted { recipe: String },

    /// The output mode is neither a known mode nor a recipe producing the item.
    #[error("invalid output mode '{mode}' for {item}")]
    InvalidOutputMode { item: String, mode: String },

    /// The rate targets cannot be met with the available inputs.
    #[error("no possible solution")]
    Infeasible,

    /// A maximize target has nothing limiting its output.
    #[error("solution is unbounded")]
    Unbounded,

    #[error("solution is empty")]
    EmptySolution,

    /// The LP backend failed without a definite status.
    #[error("solver failure: {0}")]
    Solver(String),
}

impl SolverError {
    pub(crate) fn not_a_number(field: impl Into<String>) -> Self {
        SolverError::InvalidValue {
            field: field.into(),
            reason: "not a number",
        }
    }

    pub(crate) fn negative(field: impl Into<String>) -> Self {
        SolverError::InvalidValue {
            field: field.into(),
            reason: "negative number",
        }
    }
}

/// Errors that can occur while loading the static game data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A data file could not be read.
    #[error("failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },

    /// A data file is not valid JSON for its table.
    #[error("parse error in {file}: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },

    /// A recipe runs in a building that is not in the dataset.
    #[error("recipe {recipe} is produced in unknown building {building}")]
    UnknownBuilding { recipe: String, building: String },
}
