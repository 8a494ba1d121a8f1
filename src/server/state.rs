use axum::extract::FromRef;

use crate::catalog::CatalogManager;
use crate::user::UserManager;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogManager = Arc<CatalogManager>;
pub type GuardedUserManager = Arc<Mutex<UserManager>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog_manager: GuardedCatalogManager,
    pub user_manager: GuardedUserManager,
    pub version: String,
}

impl FromRef<ServerState> for GuardedCatalogManager {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
