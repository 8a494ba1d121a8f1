//! Permission checks that run in front of a group of routes.
//!
//! Each guard resolves the [`Session`] once, rejects the request with 403 when
//! there is no session or it lacks the permission, and otherwise stores the
//! session in the request extensions for the handler to pick up.

use super::session::Session;
use crate::user::Permission;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

async fn require(
    permission: Permission,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if !session.has_permission(permission) {
        debug!(
            "User {} lacks {:?} for {}",
            session.user_id,
            permission,
            request.uri()
        );
        return StatusCode::FORBIDDEN.into_response();
    }
    request.extensions_mut().insert(session);
    next.run(request).await
}

pub async fn require_access_catalog(session: Session, request: Request, next: Next) -> Response {
    require(Permission::AccessCatalog, session, request, next).await
}

pub async fn require_edit_catalog(session: Session, request: Request, next: Next) -> Response {
    require(Permission::EditCatalog, session, request, next).await
}

pub async fn require_like_content(session: Session, request: Request, next: Next) -> Response {
    require(Permission::LikeContent, session, request, next).await
}
