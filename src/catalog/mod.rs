//! Album, band and song operations as the screens see them: list with
//! search, create, edit and delete, with submitted forms validated first.

mod forms;
mod manager;

pub use forms::{
    AlbumForm, BandForm, LikedSongForm, SongForm, ALBUM_ID_FIELD, BAND_ID_FIELD, COUNTRY_FIELD,
    DURATION_FIELD, FORM_YEAR_FIELD, ID_FIELD, NAME_FIELD, RELEASE_YEAR_FIELD, SONG_ID_FIELD,
    TITLE_FIELD,
};
pub use manager::{matches_search, CatalogManager, SongPickers};

use crate::catalog_store::{FieldError, ValidationError, ValidationErrors};
use thiserror::Error;

/// Outcome of a catalog or liked-song operation that did not succeed.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ValidationError> for OperationError {
    fn from(error: ValidationError) -> Self {
        OperationError::Validation(error.into())
    }
}

/// Whether a storage failure came from a violated SQLite constraint, such
/// as a foreign key whose target was deleted after it was checked.
pub(crate) fn is_constraint_violation(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<rusqlite::Error>()
            .and_then(rusqlite::Error::sqlite_error_code)
            == Some(rusqlite::ErrorCode::ConstraintViolation)
    })
}

impl OperationError {
    /// Field errors to show on a re-rendered form, empty for other failures.
    pub fn form_errors(&self) -> Vec<FieldError> {
        match self {
            OperationError::Validation(errors) => errors.field_errors(),
            _ => vec![],
        }
    }
}
