use crate::*;
use std::backtrace::Backtrace;
use thiserror::Error;

/// [`MatchReplayErrorVariant`] enumerates the failures that can surface while
/// loading a match or exporting its state. Playback itself never produces
/// these: malformed events and out-of-range requests are recovered in place.
#[derive(Error, Debug, Clone)]
pub enum MatchReplayErrorVariant {
    #[error("Entity id {entity_id} appears more than once in the roster")]
    DuplicateEntityId { entity_id: EntityId },

    #[error("Home and away teams share the id {team_id}")]
    DuplicateTeamId { team_id: TeamId },

    #[error("Tick interval must be a positive number of seconds, got {interval}")]
    InvalidTickInterval { interval: f64 },

    #[error("Invalid replay configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Mirror field {field} has {actual} entries, expected {expected}")]
    MirrorShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Mirror index {index} is out of range for {rows} rows")]
    MirrorIndexOutOfRange { index: usize, rows: usize },

    #[error("Error converting float")]
    FloatConversionError,

    #[error("Collected rows have inconsistent widths: expected {expected}, found {found}")]
    InconsistentRowWidth { expected: usize, found: usize },

    #[error("JSON error: {0}")]
    Json(String),

    #[error(transparent)]
    NDArrayShapeError(#[from] ::ndarray::ShapeError),
}

/// [`MatchReplayError`] pairs a [`MatchReplayErrorVariant`] with the backtrace
/// captured where it was raised.
#[derive(Debug)]
pub struct MatchReplayError {
    pub backtrace: Backtrace,
    pub variant: MatchReplayErrorVariant,
}

impl MatchReplayError {
    pub fn new(variant: MatchReplayErrorVariant) -> Self {
        Self {
            backtrace: Backtrace::capture(),
            variant,
        }
    }

    pub fn new_result<T>(variant: MatchReplayErrorVariant) -> Result<T, Self> {
        Err(Self::new(variant))
    }
}

impl std::fmt::Display for MatchReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.variant)
    }
}

impl std::error::Error for MatchReplayError {}

impl From<::ndarray::ShapeError> for MatchReplayError {
    fn from(error: ::ndarray::ShapeError) -> Self {
        Self::new(MatchReplayErrorVariant::NDArrayShapeError(error))
    }
}

impl From<serde_json::Error> for MatchReplayError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(MatchReplayErrorVariant::Json(error.to_string()))
    }
}

#[allow(clippy::result_large_err)]
pub type MatchReplayResult<T> = Result<T, MatchReplayError>;
