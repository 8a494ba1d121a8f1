use crate::catalog::{
    is_constraint_violation, matches_search, LikedSongForm, OperationError, SONG_ID_FIELD,
};
use crate::catalog_store::{
    required_id, CatalogStore, PickerOption, ValidationError, ValidationErrors, SONG_REFERENCE,
};

use super::{
    auth::SongifyHasher,
    permissions::{Permission, UserRole},
    user_models::LikedSongListing,
    AuthToken, AuthTokenValue, UserAuthCredentials, UserStore, UsernamePasswordCredentials,
};
use anyhow::{bail, Context, Result};
use std::{sync::Arc, time::SystemTime};
use tracing::{debug, info};

pub struct UserManager {
    catalog_store: Arc<dyn CatalogStore>,
    user_store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(catalog_store: Arc<dyn CatalogStore>, user_store: Arc<dyn UserStore>) -> Self {
        Self {
            catalog_store,
            user_store,
        }
    }

    /// Creates a user holding `role` and returns its id.
    pub fn add_user<T: AsRef<str>>(&self, user_handle: T, role: UserRole) -> Result<String> {
        let user_handle = user_handle.as_ref().trim();
        if user_handle.is_empty() {
            bail!("The user handle cannot be empty.")
        }

        if self.user_store.get_user_id(user_handle)?.is_some() {
            bail!("User handle already exists.");
        }

        let user_id = self.user_store.create_user(user_handle)?;
        self.user_store.add_user_role(&user_id, role)?;
        Ok(user_id)
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        self.user_store.get_user_auth_token(value)
    }

    pub fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        self.user_store
            .update_user_auth_token_last_used_timestamp(value)
    }

    pub fn generate_auth_token(&self, credentials: &UserAuthCredentials) -> Result<AuthToken> {
        let token = AuthToken {
            user_id: credentials.user_id.clone(),
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    /// Verifies the password of `user_handle` and issues a fresh token.
    /// Returns Ok(None) when the handle is unknown, has no password or the
    /// password does not match.
    pub fn login(&self, user_handle: &str, password: &str) -> Result<Option<AuthToken>> {
        let credentials = match self.user_store.get_user_auth_credentials(user_handle)? {
            Some(credentials) => credentials,
            None => {
                debug!("Login attempt for unknown handle {}", user_handle);
                return Ok(None);
            }
        };
        let verified = match credentials.username_password.as_ref() {
            Some(password_credentials) => password_credentials.verify(password)?,
            None => false,
        };
        if !verified {
            return Ok(None);
        }
        self.generate_auth_token(&credentials).map(Some)
    }

    fn create_hashed_password(
        user_id: String,
        password: String,
    ) -> Result<UsernamePasswordCredentials> {
        let hasher = SongifyHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(UsernamePasswordCredentials {
            user_id,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
            last_tried: None,
            last_used: None,
        })
    }

    pub fn create_password_credentials(&self, user_handle: &str, password: String) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        if credentials.username_password.is_some() {
            bail!("User with handle {} already has password credentials method. Maybe you want to modify it?", user_handle);
        }

        credentials.username_password = Some(Self::create_hashed_password(
            credentials.user_id.clone(),
            password,
        )?);
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn update_password_credentials(&self, user_handle: &str, password: String) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        if credentials.username_password.is_none() {
            bail!(
                "Cannot update password of user with handle {} since it never had one.",
                user_handle
            );
        }
        credentials.username_password = Some(Self::create_hashed_password(
            credentials.user_id.clone(),
            password,
        )?);
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn delete_password_credentials(&self, user_handle: &str) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        credentials.username_password = None;
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn get_user_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>> {
        self.user_store.get_user_auth_credentials(user_handle)
    }

    /// Deletes a token, refusing to touch tokens owned by someone else.
    pub fn delete_auth_token(&self, user_id: &str, token_value: &AuthTokenValue) -> Result<()> {
        let token = match self.user_store.get_user_auth_token(token_value)? {
            Some(token) => token,
            None => bail!("Did not find auth token {}", token_value.0),
        };
        if token.user_id != user_id {
            bail!(
                "Tried to delete auth token {}, but the authenticated user {} was not the owner {} of the token.",
                token_value.0,
                user_id,
                token.user_id
            );
        }
        self.user_store.delete_user_auth_token(token_value)?;
        Ok(())
    }

    pub fn get_user_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        self.user_store.get_all_user_auth_tokens(user_handle)
    }

    pub fn get_all_user_handles(&self) -> Result<Vec<String>> {
        self.user_store.get_all_user_handles()
    }

    pub fn get_user_id(&self, user_handle: &str) -> Result<Option<String>> {
        self.user_store.get_user_id(user_handle)
    }

    pub fn get_user_permissions(&self, user_id: &str) -> Result<Vec<Permission>> {
        self.user_store.resolve_user_permissions(user_id)
    }

    pub fn get_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>> {
        self.user_store.get_user_roles(user_id)
    }

    pub fn add_user_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        self.user_store.add_user_role(user_id, role)
    }

    pub fn remove_user_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        self.user_store.remove_user_role(user_id, role)
    }

    /// Grants Admin (and revokes User) to every user whose handle ends with
    /// `suffix`. Returns how many users were promoted.
    pub fn promote_admins_with_suffix(&self, suffix: &str) -> Result<usize> {
        if suffix.is_empty() {
            return Ok(0);
        }
        let mut promoted = 0;
        for handle in self.user_store.get_all_user_handles()? {
            if !handle.ends_with(suffix) {
                continue;
            }
            let user_id = match self.user_store.get_user_id(&handle)? {
                Some(user_id) => user_id,
                None => continue,
            };
            let roles = self.user_store.get_user_roles(&user_id)?;
            if roles.contains(&UserRole::Admin) && !roles.contains(&UserRole::User) {
                continue;
            }
            self.user_store.add_user_role(&user_id, UserRole::Admin)?;
            self.user_store.remove_user_role(&user_id, UserRole::User)?;
            info!("Promoted {} to {}", handle, UserRole::Admin);
            promoted += 1;
        }
        Ok(promoted)
    }

    // =========================================================================
    // Liked songs
    // =========================================================================

    pub fn list_liked_songs(
        &self,
        user_id: &str,
        search: Option<&str>,
    ) -> Result<Vec<LikedSongListing>, OperationError> {
        let liked = self.user_store.get_liked_songs(user_id)?;
        Ok(liked
            .into_iter()
            .filter(|listing| matches_search(&listing.song_title, search))
            .collect())
    }

    /// Songs the user can pick from when liking one.
    pub fn liked_song_pickers(&self) -> Result<Vec<PickerOption>, OperationError> {
        Ok(self.catalog_store.song_options()?)
    }

    /// Likes a song on behalf of `user_id`. Liking the same song twice fails
    /// validation with [`ValidationError::AlreadyLiked`].
    pub fn add_liked_song(
        &self,
        user_id: &str,
        form: &LikedSongForm,
    ) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let song_id = required_id(&mut errors, SONG_ID_FIELD, form.song_id.as_deref());
        if let Some(song_id) = song_id {
            if !self.catalog_store.reference_exists(&SONG_REFERENCE, song_id)? {
                errors.push(ValidationError::ForeignKeyViolation {
                    field: SONG_ID_FIELD,
                    id: song_id,
                });
            }
        }
        errors.into_result()?;
        let song_id = match song_id {
            Some(song_id) => song_id,
            None => return Err(ValidationError::Required { field: SONG_ID_FIELD }.into()),
        };

        let inserted = match self.user_store.insert_liked_song(user_id, song_id) {
            Ok(inserted) => inserted,
            Err(err) if is_constraint_violation(&err) => {
                if self.catalog_store.reference_exists(&SONG_REFERENCE, song_id)? {
                    return Err(err.into());
                }
                return Err(ValidationError::ForeignKeyViolation {
                    field: SONG_ID_FIELD,
                    id: song_id,
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };
        if !inserted {
            return Err(ValidationError::AlreadyLiked {
                field: SONG_ID_FIELD,
                song_id,
            }
            .into());
        }
        debug!("User {} liked song {}", user_id, song_id);
        Ok(song_id)
    }

    pub fn get_liked_song(
        &self,
        user_id: &str,
        song_id: i64,
    ) -> Result<LikedSongListing, OperationError> {
        self.user_store
            .get_liked_song(user_id, song_id)?
            .ok_or(OperationError::NotFound {
                entity: "LikedSong",
                id: song_id,
            })
    }

    pub fn remove_liked_song(&self, user_id: &str, song_id: i64) -> Result<(), OperationError> {
        if self.user_store.delete_liked_song(user_id, song_id)? {
            debug!("User {} unliked song {}", user_id, song_id);
            Ok(())
        } else {
            Err(OperationError::NotFound {
                entity: "LikedSong",
                id: song_id,
            })
        }
    }
}
