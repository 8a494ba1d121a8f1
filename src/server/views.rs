//! JSON shapes returned to the screens.

use crate::catalog::OperationError;
use crate::catalog_store::{FieldError, PickerOption};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// `?searchString=` of the list screens.
#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(rename = "searchString")]
    pub search_string: Option<String>,
}

impl SearchQuery {
    pub fn search(&self) -> Option<&str> {
        self.search_string.as_deref()
    }
}

/// A form as shown to the user: the submitted values, what was wrong with
/// them and the choices of its select lists.
#[derive(Serialize, Debug)]
pub struct FormView<F, P = ()> {
    pub form: F,
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickers: Option<P>,
}

impl<F: Serialize, P: Serialize> FormView<F, P> {
    pub fn new(form: F, pickers: Option<P>) -> Self {
        FormView {
            form,
            errors: vec![],
            pickers,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[derive(Serialize, Debug)]
pub struct LikedSongPickers {
    pub songs: Vec<PickerOption>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        match self {
            OperationError::Validation(errors) => {
                debug!("Rejected submission: {}", errors);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors.field_errors())).into_response()
            }
            OperationError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: self.to_string(),
                }),
            )
                .into_response(),
            OperationError::Storage(err) => {
                error!("Storage failure: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Shows `form` again with its field errors when `error` is a validation
/// failure, otherwise responds with the error itself.
pub fn rerender_form<F, P, L>(error: OperationError, form: F, load_pickers: L) -> Response
where
    F: Serialize,
    P: Serialize,
    L: FnOnce() -> Result<Option<P>, OperationError>,
{
    match error {
        OperationError::Validation(errors) => match load_pickers() {
            Ok(pickers) => FormView::new(form, pickers)
                .with_errors(errors.field_errors())
                .into_response_with_status(StatusCode::UNPROCESSABLE_ENTITY),
            Err(err) => err.into_response(),
        },
        other => other.into_response(),
    }
}

/// 303 to a list screen.
pub fn redirect_to(location: &str) -> Response {
    Redirect::to(location).into_response()
}
