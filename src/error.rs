// Error types shared by the loader, the views and the report writers.
//
// Cell-level coercion problems never show up here: they become missing
// values inside the fact table. Only whole-source failures and bad view
// selections are errors.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// A source file could not be read or parsed. Fatal for the session.
    #[error("Failed to load {source_name} source '{}': {reason}", path.display())]
    Load {
        source_name: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// A source file is readable but lacks a column every row needs.
    #[error("{source_name} source '{}' has no '{column}' column", path.display())]
    MissingColumn {
        source_name: &'static str,
        path: PathBuf,
        column: String,
    },

    #[error("Unknown waste fraction '{measure}' (expected one of the QRESIDUOS_* fractions)")]
    InvalidMeasure { measure: String },

    #[error("Periods {requested:?} not both present in scope (available: {available:?})")]
    PeriodUnavailable {
        requested: (i32, i32),
        available: Vec<i32>,
    },

    #[error("Failed to write '{}': {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

impl ReportError {
    pub fn load(source_name: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ReportError::Load {
            source_name,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ReportError::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Load failures abort every view; everything else only affects the
    /// view that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReportError::Load { .. } | ReportError::MissingColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
