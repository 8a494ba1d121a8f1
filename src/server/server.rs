use anyhow::{Context, Result};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, error, info};

use crate::catalog::CatalogManager;
use crate::catalog_store::CatalogStore;
use crate::user::UserManager;
use axum_extra::extract::cookie::{Cookie, SameSite};

use axum::{
    body::Body,
    extract::State,
    http::{header, response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::catalog_routes::{make_album_routes, make_band_routes, make_song_routes};
use super::liked_songs_routes::make_liked_songs_routes;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::{log_requests, state::*, ServerConfig};
use crate::user::auth::AuthTokenValue;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for {}", body.user_handle);
    let auth_token = match user_manager
        .lock()
        .unwrap()
        .login(&body.user_handle, &body.password)
    {
        Ok(Some(auth_token)) => auth_token,
        Ok(None) => return StatusCode::FORBIDDEN.into_response(),
        Err(err) => {
            error!("Error with auth token generation: {:#}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cookie_value = match HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly",
        COOKIE_SESSION_TOKEN_KEY, auth_token.value.0
    )) {
        Ok(value) => value,
        Err(err) => {
            error!("Could not build session cookie: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let response_body = LoginSuccessResponse {
        token: auth_token.value.0,
    };
    info!("User {} logged in", body.user_handle);
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie_value)],
        Json(response_body),
    )
        .into_response()
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let locked_manager = user_manager.lock().unwrap();
    match locked_manager.delete_auth_token(&session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
                .same_site(SameSite::Lax)
                .build();

            match response::Builder::new()
                .status(StatusCode::OK)
                .header(header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
            {
                Ok(response) => response,
                Err(err) => {
                    error!("Could not build logout response: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Err(err) => {
            debug!("Logout failed: {}", err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        catalog_store: Arc<dyn CatalogStore>,
        user_manager: GuardedUserManager,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_manager: Arc::new(CatalogManager::new(catalog_store)),
            user_manager,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog_store: Arc<dyn CatalogStore>,
    user_manager: GuardedUserManager,
) -> Result<Router> {
    let state = ServerState::new(config, catalog_store, user_manager);

    let account_routes: Router = Router::new()
        .route("/Login", post(login))
        .route("/Logout", get(logout))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let app: Router = home_router
        .nest("/Account", account_routes)
        .nest("/Albums", make_album_routes(state.clone()))
        .nest("/Bands", make_band_routes(state.clone()))
        .nest("/Songs", make_song_routes(state.clone()))
        .nest("/LikedSongs", make_liked_songs_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    catalog_store: Arc<dyn CatalogStore>,
    user_manager: UserManager,
    config: ServerConfig,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalog_store, Arc::new(Mutex::new(user_manager)))?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
