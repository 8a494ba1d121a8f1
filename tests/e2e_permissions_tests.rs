//! End-to-end tests for role based access control
//!
//! Admins edit the catalog, regular users like songs, and the album and
//! band lists are open to everyone.

mod common;

use common::*;
use reqwest::StatusCode;

const ADMIN_GETS: &[&str] = &[
    "/Albums/Create",
    "/Albums/Edit/1",
    "/Albums/Delete/1",
    "/Bands/Create",
    "/Bands/Edit/1",
    "/Bands/Delete/1",
    "/Songs/Create",
    "/Songs/Edit/1",
    "/Songs/Delete/1",
];

const LIKED_SONGS_GETS: &[&str] = &[
    "/LikedSongs/Index",
    "/LikedSongs/All",
    "/LikedSongs/Add",
    "/LikedSongs/Remove/1",
];

// =============================================================================
// Unauthenticated Access Tests
// =============================================================================

#[tokio::test]
async fn test_unauthenticated_can_list_albums_and_bands() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(client.get_home().await.status(), StatusCode::OK);
    assert_eq!(client.list_albums(None).await.status(), StatusCode::OK);
    assert_eq!(client.list_bands(Some("rock")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_cannot_list_songs() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.list_songs(None).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_unauthenticated_cannot_edit_or_like() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for path in ADMIN_GETS.iter().chain(LIKED_SONGS_GETS.iter()) {
        assert_eq!(
            client.get(path).await.status(),
            StatusCode::FORBIDDEN,
            "{}",
            path
        );
    }
    assert_eq!(
        client.create_album("Sneaky", "2000").await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(client.like_song(SONG_1_ID).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_session_token_is_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/Songs/All", server.base_url))
        .header("Authorization", "not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Regular User Access Tests
// =============================================================================

#[tokio::test]
async fn test_regular_user_can_list_songs_and_like() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    assert_eq!(client.list_songs(None).await.status(), StatusCode::OK);
    for path in LIKED_SONGS_GETS.iter().take(3) {
        assert_eq!(client.get(path).await.status(), StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn test_regular_user_cannot_edit_catalog() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    for path in ADMIN_GETS {
        assert_eq!(
            client.get(path).await.status(),
            StatusCode::FORBIDDEN,
            "{}",
            path
        );
    }

    assert_eq!(
        client.create_album("Sneaky", "2000").await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        client.delete_album(ALBUM_1_ID).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(server.catalog_store.get_albums_count().unwrap(), 2);
}

// =============================================================================
// Admin Access Tests
// =============================================================================

#[tokio::test]
async fn test_admin_can_open_every_edit_screen() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_admin(server.base_url.clone()).await;

    for path in ADMIN_GETS {
        assert_eq!(client.get(path).await.status(), StatusCode::OK, "{}", path);
    }
    assert_eq!(client.list_songs(None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_like_songs() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_admin(server.base_url.clone()).await;

    for path in LIKED_SONGS_GETS {
        assert_eq!(
            client.get(path).await.status(),
            StatusCode::FORBIDDEN,
            "{}",
            path
        );
    }
    assert_eq!(client.like_song(SONG_1_ID).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_changes_apply_to_existing_sessions() {
    use songify_server::user::UserRole;

    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;
    assert_eq!(
        client.get("/Albums/Create").await.status(),
        StatusCode::FORBIDDEN
    );

    let user_id = server.user_id(TEST_USER);
    server
        .user_manager
        .lock()
        .unwrap()
        .add_user_role(&user_id, UserRole::Admin)
        .unwrap();

    // Holding both roles grants both sets of permissions.
    assert_eq!(client.get("/Albums/Create").await.status(), StatusCode::OK);
    assert_eq!(client.liked_songs_index().await.status(), StatusCode::OK);
}
