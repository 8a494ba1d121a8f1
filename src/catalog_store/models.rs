//! Catalog rows and the projections handed out to views.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub release_year: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub id: i64,
    pub name: String,
    pub form_year: i64,
    pub country: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    /// Length in seconds
    pub duration: i64,
    pub album_id: i64,
    pub band_id: i64,
}

/// Validated album fields, the mutable part of an [`Album`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumFields {
    pub title: String,
    pub release_year: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandFields {
    pub name: String,
    pub form_year: i64,
    pub country: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongFields {
    pub title: String,
    pub duration: i64,
    pub album_id: i64,
    pub band_id: i64,
}

/// A song joined with the display names of its album and band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongListing {
    pub id: i64,
    pub title: String,
    pub duration: i64,
    pub album_id: i64,
    pub album_title: String,
    pub band_id: i64,
    pub band_name: String,
}

/// One entry of a select list: the referenced id and the text shown for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerOption {
    pub id: i64,
    pub label: String,
}
