//! `/Albums`, `/Bands` and `/Songs` screens.

use super::guards::{require_access_catalog, require_edit_catalog};
use super::state::{GuardedCatalogManager, ServerState};
use super::views::{redirect_to, rerender_form, FormView, SearchQuery};
use crate::catalog::{AlbumForm, BandForm, SongForm};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

const ALBUMS_LIST: &str = "/Albums/All";
const BANDS_LIST: &str = "/Bands/All";
const SONGS_LIST: &str = "/Songs/All";

// =============================================================================
// Albums
// =============================================================================

async fn list_albums(
    State(catalog): State<GuardedCatalogManager>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match catalog.list_albums(query.search()) {
        Ok(albums) => Json(albums).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn album_create_form() -> Response {
    FormView::<_, ()>::new(AlbumForm::default(), None).into_response_with_status(StatusCode::OK)
}

async fn create_album(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<AlbumForm>,
) -> Response {
    match catalog.create_album(&form) {
        Ok(_) => redirect_to(ALBUMS_LIST),
        Err(err) => rerender_form(err, form, || Ok(None::<()>)),
    }
}

async fn album_edit_form(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.get_album(id) {
        Ok(album) => FormView::<_, ()>::new(AlbumForm::from(&album), None)
            .into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

async fn edit_album(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<AlbumForm>,
) -> Response {
    match catalog.edit_album(&form) {
        Ok(_) => redirect_to(ALBUMS_LIST),
        Err(err) => rerender_form(err, form, || Ok(None::<()>)),
    }
}

async fn album_delete_confirm(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.get_album(id) {
        Ok(album) => Json(album).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_album(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.delete_album(id) {
        Ok(()) => redirect_to(ALBUMS_LIST),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Bands
// =============================================================================

async fn list_bands(
    State(catalog): State<GuardedCatalogManager>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match catalog.list_bands(query.search()) {
        Ok(bands) => Json(bands).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn band_create_form() -> Response {
    FormView::<_, ()>::new(BandForm::default(), None).into_response_with_status(StatusCode::OK)
}

async fn create_band(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<BandForm>,
) -> Response {
    match catalog.create_band(&form) {
        Ok(_) => redirect_to(BANDS_LIST),
        Err(err) => rerender_form(err, form, || Ok(None::<()>)),
    }
}

async fn band_edit_form(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.get_band(id) {
        Ok(band) => FormView::<_, ()>::new(BandForm::from(&band), None)
            .into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

async fn edit_band(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<BandForm>,
) -> Response {
    match catalog.edit_band(&form) {
        Ok(_) => redirect_to(BANDS_LIST),
        Err(err) => rerender_form(err, form, || Ok(None::<()>)),
    }
}

async fn band_delete_confirm(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.get_band(id) {
        Ok(band) => Json(band).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_band(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.delete_band(id) {
        Ok(()) => redirect_to(BANDS_LIST),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Songs
// =============================================================================

async fn list_songs(
    State(catalog): State<GuardedCatalogManager>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match catalog.list_songs(query.search()) {
        Ok(songs) => Json(songs).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn song_create_form(State(catalog): State<GuardedCatalogManager>) -> Response {
    match catalog.song_pickers() {
        Ok(pickers) => FormView::new(SongForm::default(), Some(pickers))
            .into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

async fn create_song(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<SongForm>,
) -> Response {
    match catalog.create_song(&form) {
        Ok(_) => redirect_to(SONGS_LIST),
        Err(err) => rerender_form(err, form, || catalog.song_pickers().map(Some)),
    }
}

async fn song_edit_form(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    let song = match catalog.get_song(id) {
        Ok(song) => song,
        Err(err) => return err.into_response(),
    };
    match catalog.song_pickers() {
        Ok(pickers) => FormView::new(SongForm::from(&song), Some(pickers))
            .into_response_with_status(StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

async fn edit_song(
    State(catalog): State<GuardedCatalogManager>,
    Form(form): Form<SongForm>,
) -> Response {
    match catalog.edit_song(&form) {
        Ok(_) => redirect_to(SONGS_LIST),
        Err(err) => rerender_form(err, form, || catalog.song_pickers().map(Some)),
    }
}

async fn song_delete_confirm(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.get_song_listing(id) {
        Ok(song) => Json(song).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_song(
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<i64>,
) -> Response {
    match catalog.delete_song(id) {
        Ok(()) => redirect_to(SONGS_LIST),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Routers
// =============================================================================

pub fn make_album_routes(state: ServerState) -> Router {
    let public_routes: Router<ServerState> = Router::new().route("/All", get(list_albums));

    let admin_routes: Router<ServerState> = Router::new()
        .route("/Create", get(album_create_form).post(create_album))
        .route("/Edit/{id}", get(album_edit_form))
        .route("/Edit", post(edit_album))
        .route("/Delete/{id}", get(album_delete_confirm))
        .route("/DeleteConfirmed/{id}", post(delete_album))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_edit_catalog,
        ));

    public_routes.merge(admin_routes).with_state(state)
}

pub fn make_band_routes(state: ServerState) -> Router {
    let public_routes: Router<ServerState> = Router::new().route("/All", get(list_bands));

    let admin_routes: Router<ServerState> = Router::new()
        .route("/Create", get(band_create_form).post(create_band))
        .route("/Edit/{id}", get(band_edit_form))
        .route("/Edit", post(edit_band))
        .route("/Delete/{id}", get(band_delete_confirm))
        .route("/DeleteConfirmed/{id}", post(delete_band))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_edit_catalog,
        ));

    public_routes.merge(admin_routes).with_state(state)
}

pub fn make_song_routes(state: ServerState) -> Router {
    let listing_routes: Router<ServerState> = Router::new()
        .route("/All", get(list_songs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_catalog,
        ));

    let admin_routes: Router<ServerState> = Router::new()
        .route("/Create", get(song_create_form).post(create_song))
        .route("/Edit/{id}", get(song_edit_form))
        .route("/Edit", post(edit_song))
        .route("/Delete/{id}", get(song_delete_confirm))
        .route("/DeleteConfirmed/{id}", post(delete_song))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_edit_catalog,
        ));

    listing_routes.merge(admin_routes).with_state(state)
}
