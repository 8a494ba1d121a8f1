//! Shared constants for end-to-end tests
//!
//! When the seeded users or catalog change, update only this file.

#![allow(dead_code)]

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// A second regular user, to check that liked songs stay per user
pub const OTHER_USER: &str = "otheruser";

pub const OTHER_PASS: &str = "otherpass123";

/// Admin test user handle
pub const ADMIN_USER: &str = "admin";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Seeded Catalog
// ============================================================================

pub const ALBUM_1_ID: i64 = 1;
pub const ALBUM_1_TITLE: &str = "Rock Album";
pub const ALBUM_1_YEAR: i64 = 2021;

pub const ALBUM_2_ID: i64 = 2;
pub const ALBUM_2_TITLE: &str = "Pop Album";
pub const ALBUM_2_YEAR: i64 = 2023;

pub const BAND_1_ID: i64 = 1;
pub const BAND_1_NAME: &str = "The Rockers";

pub const BAND_2_ID: i64 = 2;
pub const BAND_2_NAME: &str = "Pop Stars";

/// "Thunder Road" on Rock Album by The Rockers
pub const SONG_1_ID: i64 = 1;
pub const SONG_1_TITLE: &str = "Thunder Road";

/// "Sunny Day" on Pop Album by Pop Stars
pub const SONG_2_ID: i64 = 2;
pub const SONG_2_TITLE: &str = "Sunny Day";

/// "Rock Anthem" on Rock Album by The Rockers
pub const SONG_3_ID: i64 = 3;
pub const SONG_3_TITLE: &str = "Rock Anthem";

/// An id no seeded row uses
pub const MISSING_ID: i64 = 999;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
