use sea_orm::{ColumnFromStrErr, DbErr};
use thiserror::Error;

/// Errors surfaced by the test tools.
///
/// Database and column-resolution failures pass through unchanged from
/// SeaORM; everything else is a usage or configuration error local to the
/// call that triggered it. There are no retries.
#[derive(Debug, Error)]
pub enum Error {
    /// A sequence-valued factory field whose length disagrees with the
    /// length fixed by the first sequence-valued field.
    #[error(
        "factory field `{field}` has {actual} values, expected {expected} (length fixed by `{anchor}`)"
    )]
    SequenceLengthMismatch {
        anchor: String,
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A single-instance accessor was used on a factory describing several.
    #[error("factory describes {count} instances where exactly one was requested")]
    NotSingular { count: usize },

    #[error(transparent)]
    UnknownColumn(#[from] ColumnFromStrErr),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Profile log error: {0}")]
    ProfileLog(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
