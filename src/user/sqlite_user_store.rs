use super::auth::{
    AuthToken, AuthTokenValue, SongifyHasher, UserAuthCredentials, UsernamePasswordCredentials,
};
use super::permissions::{Permission, UserRole};
use super::schema::{
    AUTH_TOKENS_TABLE_V_0, LIKED_SONGS_TABLE_V_0, USERS_TABLE_V_0, USER_PASSWORD_CREDENTIALS_V_0,
    USER_ROLES_TABLE_V_0,
};
use super::user_models::LikedSongListing;
use super::user_store::{LikedSongsStore, UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
use crate::sqlite_persistence::SharedConnection;
use anyhow::{Context, Result};
use rusqlite::{params, Row};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::SystemTime;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: SharedConnection,
}

impl SqliteUserStore {
    pub fn new(conn: SharedConnection) -> Self {
        SqliteUserStore { conn }
    }

    fn parse_auth_token_row(row: &Row) -> rusqlite::Result<AuthToken> {
        Ok(AuthToken {
            user_id: row.get(0)?,
            value: AuthTokenValue(row.get(1)?),
            created: system_time_from_column_result(row.get(2)?),
            last_used: row
                .get::<usize, Option<i64>>(3)?
                .map(system_time_from_column_result),
        })
    }

    fn parse_liked_song_row(row: &Row) -> rusqlite::Result<LikedSongListing> {
        Ok(LikedSongListing {
            song_id: row.get(0)?,
            song_title: row.get(1)?,
        })
    }
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(value as u64)
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        let user_id = Uuid::new_v4().to_string();
        conn.execute(
            &format!(
                "INSERT INTO {} (id, handle) VALUES (?1, ?2)",
                USERS_TABLE_V_0.name
            ),
            params![user_id, user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        debug!("Created user {} with id {}", user_handle, user_id);
        Ok(user_id)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT handle FROM {} ORDER BY handle ASC",
            USERS_TABLE_V_0.name
        ))?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {} WHERE handle = ?1",
            USERS_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![user_handle], |row| row.get(0)) {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT role FROM {} WHERE user_id = ?1 ORDER BY role ASC",
            USER_ROLES_TABLE_V_0.name
        ))?;
        let roles = stmt
            .query_map(params![user_id], |row| row.get::<usize, String>(0))?
            .collect::<Result<Vec<String>, _>>()?
            .into_iter()
            .filter_map(|role| {
                let parsed = UserRole::from_str(&role);
                if parsed.is_none() {
                    warn!("Ignoring unknown role {} of user {}", role, user_id);
                }
                parsed
            })
            .collect();
        Ok(roles)
    }

    fn add_user_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, role) VALUES (?1, ?2)",
                USER_ROLES_TABLE_V_0.name
            ),
            params![user_id, role.to_string()],
        )
        .with_context(|| format!("Failed to add role {} to user {}", role, user_id))?;
        Ok(())
    }

    fn remove_user_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND role = ?2",
                USER_ROLES_TABLE_V_0.name
            ),
            params![user_id, role.to_string()],
        )?;
        Ok(())
    }

    fn resolve_user_permissions(&self, user_id: &str) -> Result<Vec<Permission>> {
        let mut permissions = HashSet::new();
        for role in self.get_user_roles(user_id)? {
            permissions.extend(role.permissions().iter().copied());
        }
        Ok(permissions.into_iter().collect())
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
            AUTH_TOKENS_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![value.0], Self::parse_auth_token_row) {
            Ok(token) => Ok(Some(token)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let token = match self.get_user_auth_token(token)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE value = ?1",
                AUTH_TOKENS_TABLE_V_0.name
            ),
            params![token.value.0],
        )?;
        Ok(Some(token))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET last_used = cast(strftime('%s','now') as int) WHERE value = ?1",
                AUTH_TOKENS_TABLE_V_0.name
            ),
            params![token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (value, user_id) VALUES (?1, ?2)",
                AUTH_TOKENS_TABLE_V_0.name
            ),
            params![token.value.0, token.user_id],
        )
        .with_context(|| format!("Failed to add auth token for user {}", token.user_id))?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, value, created, last_used FROM {} WHERE user_id = (SELECT id FROM {} WHERE handle = ?1)",
            AUTH_TOKENS_TABLE_V_0.name, USERS_TABLE_V_0.name
        ))?;
        let rows = stmt
            .query_map(params![user_handle], Self::parse_auth_token_row)?
            .collect::<Result<Vec<AuthToken>, _>>()?;
        Ok(rows)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>> {
        let user_id = match self.get_user_id(user_handle)? {
            Some(user_id) => user_id,
            None => return Ok(None),
        };
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, salt, hash, hasher, created, last_tried, last_used FROM {} WHERE user_id = ?1",
            USER_PASSWORD_CREDENTIALS_V_0.name
        ))?;

        let password_credentials = match stmt.query_row(params![user_id], |row| {
            let hasher_name: String = row.get(3)?;
            let hasher = SongifyHasher::from_str(&hasher_name).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    3,
                    "hasher".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;
            Ok(UsernamePasswordCredentials {
                user_id: row.get(0)?,
                salt: row.get(1)?,
                hash: row.get(2)?,
                hasher,
                created: system_time_from_column_result(row.get(4)?),
                last_tried: row
                    .get::<usize, Option<i64>>(5)?
                    .map(system_time_from_column_result),
                last_used: row
                    .get::<usize, Option<i64>>(6)?
                    .map(system_time_from_column_result),
            })
        }) {
            Ok(credentials) => Some(credentials),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read credentials of {}", user_handle))
            }
        };

        Ok(Some(UserAuthCredentials {
            user_id,
            username_password: password_credentials,
        }))
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let user_id = credentials.user_id;
        match credentials.username_password.as_ref() {
            Some(password_credentials) => {
                let updated = conn.execute(
                    &format!(
                        "UPDATE {} SET salt = ?1, hash = ?2, hasher = ?3 WHERE user_id = ?4",
                        USER_PASSWORD_CREDENTIALS_V_0.name
                    ),
                    params![
                        password_credentials.salt,
                        password_credentials.hash,
                        password_credentials.hasher.to_string(),
                        user_id
                    ],
                )?;
                if updated == 0 {
                    conn.execute(
                        &format!(
                            "INSERT INTO {} (salt, hash, hasher, user_id) VALUES (?1, ?2, ?3, ?4)",
                            USER_PASSWORD_CREDENTIALS_V_0.name
                        ),
                        params![
                            password_credentials.salt,
                            password_credentials.hash,
                            password_credentials.hasher.to_string(),
                            user_id
                        ],
                    )?;
                }
            }
            None => {
                conn.execute(
                    &format!(
                        "DELETE FROM {} WHERE user_id = ?1",
                        USER_PASSWORD_CREDENTIALS_V_0.name
                    ),
                    params![user_id],
                )?;
            }
        };
        Ok(())
    }
}

impl LikedSongsStore for SqliteUserStore {
    fn get_liked_songs(&self, user_id: &str) -> Result<Vec<LikedSongListing>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT l.song_id, s.title FROM {} l JOIN songs s ON s.id = l.song_id WHERE l.user_id = ?1 ORDER BY l.song_id ASC",
            LIKED_SONGS_TABLE_V_0.name
        ))?;
        let rows = stmt
            .query_map(params![user_id], Self::parse_liked_song_row)?
            .collect::<Result<Vec<LikedSongListing>, _>>()?;
        Ok(rows)
    }

    fn get_liked_song(&self, user_id: &str, song_id: i64) -> Result<Option<LikedSongListing>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT l.song_id, s.title FROM {} l JOIN songs s ON s.id = l.song_id WHERE l.user_id = ?1 AND l.song_id = ?2",
            LIKED_SONGS_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![user_id, song_id], Self::parse_liked_song_row) {
            Ok(listing) => Ok(Some(listing)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_liked_song(&self, user_id: &str, song_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                &format!(
                    "INSERT INTO {} (user_id, song_id) VALUES (?1, ?2) ON CONFLICT (user_id, song_id) DO NOTHING",
                    LIKED_SONGS_TABLE_V_0.name
                ),
                params![user_id, song_id],
            )
            .with_context(|| format!("Failed to like song {} for user {}", song_id, user_id))?;
        Ok(inserted > 0)
    }

    fn delete_liked_song(&self, user_id: &str, song_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND song_id = ?2",
                LIKED_SONGS_TABLE_V_0.name
            ),
            params![user_id, song_id],
        )?;
        Ok(deleted > 0)
    }
}
