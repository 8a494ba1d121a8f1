//! `/LikedSongs` screens. Every handler acts on the session's user only.

use super::guards::require_like_content;
use super::session::Session;
use super::state::{GuardedUserManager, ServerState};
use super::views::{redirect_to, rerender_form, FormView, LikedSongPickers, SearchQuery};
use crate::catalog::LikedSongForm;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

const LIKED_SONGS_INDEX: &str = "/LikedSongs/Index";
const LIKED_SONGS_LIST: &str = "/LikedSongs/All";

fn list_liked_songs(
    session: &Session,
    user_manager: &GuardedUserManager,
    search: Option<&str>,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .list_liked_songs(&session.user_id, search)
    {
        Ok(songs) => Json(songs).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn index(session: Session, State(user_manager): State<GuardedUserManager>) -> Response {
    list_liked_songs(&session, &user_manager, None)
}

async fn all(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Query(query): Query<SearchQuery>,
) -> Response {
    list_liked_songs(&session, &user_manager, query.search())
}

async fn add_form(State(user_manager): State<GuardedUserManager>) -> Response {
    match user_manager.lock().unwrap().liked_song_pickers() {
        Ok(songs) => FormView::new(LikedSongForm::default(), Some(LikedSongPickers { songs }))
            .into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

async fn add(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Form(form): Form<LikedSongForm>,
) -> Response {
    let user_manager = user_manager.lock().unwrap();
    match user_manager.add_liked_song(&session.user_id, &form) {
        Ok(_) => redirect_to(LIKED_SONGS_INDEX),
        Err(err) => rerender_form(err, form, || {
            user_manager
                .liked_song_pickers()
                .map(|songs| Some(LikedSongPickers { songs }))
        }),
    }
}

async fn remove_confirm(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(song_id): Path<i64>,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .get_liked_song(&session.user_id, song_id)
    {
        Ok(song) => Json(song).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn remove(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(song_id): Path<i64>,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .remove_liked_song(&session.user_id, song_id)
    {
        Ok(()) => redirect_to(LIKED_SONGS_LIST),
        Err(err) => err.into_response(),
    }
}

pub fn make_liked_songs_routes(state: ServerState) -> Router {
    Router::new()
        .route("/Index", get(index))
        .route("/All", get(all))
        .route("/Add", get(add_form).post(add))
        .route("/Remove/{songId}", get(remove_confirm))
        .route("/RemoveConfirmed/{songId}", post(remove))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_like_content,
        ))
        .with_state(state)
}
