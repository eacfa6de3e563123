//! Import failure taxonomy.
//!
//! [`ImportError`] aborts a whole batch and reaches the process boundary.
//! [`RowError`] only ever aborts a single row; the orchestrator logs it and
//! moves on.

use crate::store::StoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read `{}`: {source}", .path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{}` must contain a header line and at least one data row", .path.display())]
    EmptyOrHeaderOnlyFile { path: PathBuf },
    #[error("failed to connect to store: {0}")]
    Connect(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("city `{0}` is not one of the supported cities")]
    UnknownCity(String),
    #[error("invalid {field} `{value}`: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to store {entity}: {source}")]
    EntityCreate {
        entity: &'static str,
        #[source]
        source: StoreError,
    },
}

impl RowError {
    pub(crate) fn parse(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        RowError::Parse {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn entity(entity: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| RowError::EntityCreate { entity, source }
    }
}
