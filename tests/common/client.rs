//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per Songify screen. Redirects are
//! not followed so tests can assert on the 303 and its `Location`.
//!
//! When routes or form fields change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::{redirect::Policy, Response};
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in with the given credentials
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, handle: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(handle, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            handle,
            response.text().await
        );

        client
    }

    /// Creates a client pre-authenticated as a regular user
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_USER, TEST_PASS).await
    }

    /// Creates a client pre-authenticated as an admin user
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::authenticated_as(base_url, ADMIN_USER, ADMIN_PASS).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path`
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST `fields` as an URL-encoded form to `path`
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn list(&self, path: &str, search: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(search) = search {
            request = request.query(&[("searchString", search)]);
        }
        request.send().await.expect("List request failed")
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    /// POST /Account/Login
    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.client
            .post(self.url("/Account/Login"))
            .json(&json!({
                "user_handle": handle,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /Account/Logout
    pub async fn logout(&self) -> Response {
        self.get("/Account/Logout").await
    }

    // ========================================================================
    // Albums
    // ========================================================================

    /// GET /Albums/All
    pub async fn list_albums(&self, search: Option<&str>) -> Response {
        self.list("/Albums/All", search).await
    }

    /// POST /Albums/Create
    pub async fn create_album(&self, title: &str, release_year: &str) -> Response {
        self.post_form(
            "/Albums/Create",
            &[("Title", title), ("ReleaseYear", release_year)],
        )
        .await
    }

    /// POST /Albums/Edit
    pub async fn edit_album(&self, id: &str, title: &str, release_year: &str) -> Response {
        self.post_form(
            "/Albums/Edit",
            &[("Id", id), ("Title", title), ("ReleaseYear", release_year)],
        )
        .await
    }

    /// GET /Albums/Delete/{id}
    pub async fn album_delete_confirm(&self, id: i64) -> Response {
        self.get(&format!("/Albums/Delete/{}", id)).await
    }

    /// POST /Albums/DeleteConfirmed/{id}
    pub async fn delete_album(&self, id: i64) -> Response {
        self.post_form(&format!("/Albums/DeleteConfirmed/{}", id), &[])
            .await
    }

    // ========================================================================
    // Bands
    // ========================================================================

    /// GET /Bands/All
    pub async fn list_bands(&self, search: Option<&str>) -> Response {
        self.list("/Bands/All", search).await
    }

    /// POST /Bands/Create
    pub async fn create_band(&self, name: &str, form_year: &str, country: &str) -> Response {
        self.post_form(
            "/Bands/Create",
            &[("Name", name), ("FormYear", form_year), ("Country", country)],
        )
        .await
    }

    /// POST /Bands/DeleteConfirmed/{id}
    pub async fn delete_band(&self, id: i64) -> Response {
        self.post_form(&format!("/Bands/DeleteConfirmed/{}", id), &[])
            .await
    }

    // ========================================================================
    // Songs
    // ========================================================================

    /// GET /Songs/All
    pub async fn list_songs(&self, search: Option<&str>) -> Response {
        self.list("/Songs/All", search).await
    }

    /// POST /Songs/Create
    pub async fn create_song(
        &self,
        title: &str,
        duration: &str,
        album_id: &str,
        band_id: &str,
    ) -> Response {
        self.post_form(
            "/Songs/Create",
            &[
                ("Title", title),
                ("Duration", duration),
                ("AlbumId", album_id),
                ("BandId", band_id),
            ],
        )
        .await
    }

    /// POST /Songs/Edit
    pub async fn edit_song(
        &self,
        id: &str,
        title: &str,
        duration: &str,
        album_id: &str,
        band_id: &str,
    ) -> Response {
        self.post_form(
            "/Songs/Edit",
            &[
                ("Id", id),
                ("Title", title),
                ("Duration", duration),
                ("AlbumId", album_id),
                ("BandId", band_id),
            ],
        )
        .await
    }

    /// POST /Songs/DeleteConfirmed/{id}
    pub async fn delete_song(&self, id: i64) -> Response {
        self.post_form(&format!("/Songs/DeleteConfirmed/{}", id), &[])
            .await
    }

    // ========================================================================
    // Liked Songs
    // ========================================================================

    /// GET /LikedSongs/Index
    pub async fn liked_songs_index(&self) -> Response {
        self.get("/LikedSongs/Index").await
    }

    /// GET /LikedSongs/All
    pub async fn list_liked_songs(&self, search: Option<&str>) -> Response {
        self.list("/LikedSongs/All", search).await
    }

    /// GET /LikedSongs/Add
    pub async fn like_song_form(&self) -> Response {
        self.get("/LikedSongs/Add").await
    }

    /// POST /LikedSongs/Add
    pub async fn like_song(&self, song_id: i64) -> Response {
        let song_id = song_id.to_string();
        self.post_form("/LikedSongs/Add", &[("SongId", &song_id)])
            .await
    }

    /// GET /LikedSongs/Remove/{songId}
    pub async fn unlike_song_confirm(&self, song_id: i64) -> Response {
        self.get(&format!("/LikedSongs/Remove/{}", song_id)).await
    }

    /// POST /LikedSongs/RemoveConfirmed/{songId}
    pub async fn unlike_song(&self, song_id: i64) -> Response {
        self.post_form(&format!("/LikedSongs/RemoveConfirmed/{}", song_id), &[])
            .await
    }
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
