use super::auth::{AuthToken, AuthTokenValue, UserAuthCredentials};
use super::permissions::{Permission, UserRole};
use super::user_models::LikedSongListing;
use anyhow::Result;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the user's authentication credentials given the user handle.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>>;

    /// Replaces the user's password credentials, or removes them when
    /// `username_password` is None.
    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token.
    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns all user's authentication tokens.
    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>>;
}

pub trait LikedSongsStore: Send + Sync {
    /// Returns the songs liked by the user, ordered by song id.
    fn get_liked_songs(&self, user_id: &str) -> Result<Vec<LikedSongListing>>;

    /// Returns Ok(None) if the user never liked the song.
    fn get_liked_song(&self, user_id: &str, song_id: i64) -> Result<Option<LikedSongListing>>;

    /// Records the like. Returns false if the pair was already present.
    fn insert_liked_song(&self, user_id: &str, song_id: i64) -> Result<bool>;

    /// Returns false if there was nothing to remove.
    fn delete_liked_song(&self, user_id: &str, song_id: i64) -> Result<bool>;
}

pub trait UserStore:
    UserAuthTokenStore + UserAuthCredentialsStore + LikedSongsStore + Send + Sync
{
    /// Creates a new user and returns the user id.
    fn create_user(&self, user_handle: &str) -> Result<String>;

    /// Returns all users' handles.
    fn get_all_user_handles(&self) -> Result<Vec<String>>;

    /// Returns a user's id given the user handle.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, user_handle: &str) -> Result<Option<String>>;

    /// Returns all roles assigned to a user.
    fn get_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>>;

    /// Assigns a role to a user, assigning it twice is a no-op.
    fn add_user_role(&self, user_id: &str, role: UserRole) -> Result<()>;

    /// Removes a role from a user.
    fn remove_user_role(&self, user_id: &str, role: UserRole) -> Result<()>;

    /// Union of the permissions of every role the user holds.
    fn resolve_user_permissions(&self, user_id: &str) -> Result<Vec<Permission>>;
}
