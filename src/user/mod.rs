pub mod auth;
pub mod permissions;
pub mod schema;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, UserAuthCredentials, UsernamePasswordCredentials};
pub use permissions::{Permission, UserRole};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::UserManager;
pub use user_models::LikedSongListing;
pub use user_store::{LikedSongsStore, UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
