//! Submitted forms, as posted by the album, band, song and liked-song screens.
//!
//! Every field arrives as an optional string so that a malformed value can be
//! reported next to its field instead of rejecting the whole request.

use crate::catalog_store::{
    required_id, required_non_negative, required_text, Album, AlbumFields, Band, BandFields,
    FormField, Song, SongFields, ValidationErrors,
};
use serde::{Deserialize, Serialize};

pub const ID_FIELD: FormField = FormField::new("Id", "Id");
pub const TITLE_FIELD: FormField = FormField::new("Title", "Title");
pub const RELEASE_YEAR_FIELD: FormField = FormField::new("ReleaseYear", "Release Year");
pub const NAME_FIELD: FormField = FormField::new("Name", "Name");
pub const FORM_YEAR_FIELD: FormField = FormField::new("FormYear", "Form Year");
pub const COUNTRY_FIELD: FormField = FormField::new("Country", "Country");
pub const DURATION_FIELD: FormField = FormField::new("Duration", "Duration");
pub const ALBUM_ID_FIELD: FormField = FormField::new("AlbumId", "Album");
pub const BAND_ID_FIELD: FormField = FormField::new("BandId", "Band");
pub const SONG_ID_FIELD: FormField = FormField::new("SongId", "Song");

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlbumForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub release_year: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BandForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub form_year: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SongForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<String>,
    pub album_id: Option<String>,
    pub band_id: Option<String>,
}

/// The liked song to add. The owner always comes from the session, a posted
/// `UserId` is dropped during deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LikedSongForm {
    pub song_id: Option<String>,
}

impl AlbumForm {
    pub fn validate(&self, errors: &mut ValidationErrors) -> Option<AlbumFields> {
        let title = required_text(errors, TITLE_FIELD, self.title.as_deref());
        let release_year =
            required_non_negative(errors, RELEASE_YEAR_FIELD, self.release_year.as_deref());
        Some(AlbumFields {
            title: title?,
            release_year: release_year?,
        })
    }

    pub fn validate_id(&self, errors: &mut ValidationErrors) -> Option<i64> {
        required_id(errors, ID_FIELD, self.id.as_deref())
    }
}

impl From<&Album> for AlbumForm {
    fn from(album: &Album) -> Self {
        AlbumForm {
            id: Some(album.id.to_string()),
            title: Some(album.title.clone()),
            release_year: Some(album.release_year.to_string()),
        }
    }
}

impl BandForm {
    pub fn validate(&self, errors: &mut ValidationErrors) -> Option<BandFields> {
        let name = required_text(errors, NAME_FIELD, self.name.as_deref());
        let form_year = required_non_negative(errors, FORM_YEAR_FIELD, self.form_year.as_deref());
        let country = required_text(errors, COUNTRY_FIELD, self.country.as_deref());
        Some(BandFields {
            name: name?,
            form_year: form_year?,
            country: country?,
        })
    }

    pub fn validate_id(&self, errors: &mut ValidationErrors) -> Option<i64> {
        required_id(errors, ID_FIELD, self.id.as_deref())
    }
}

impl From<&Band> for BandForm {
    fn from(band: &Band) -> Self {
        BandForm {
            id: Some(band.id.to_string()),
            name: Some(band.name.clone()),
            form_year: Some(band.form_year.to_string()),
            country: Some(band.country.clone()),
        }
    }
}

impl SongForm {
    /// Field-level checks only, album and band existence is up to the caller.
    pub fn validate(&self, errors: &mut ValidationErrors) -> Option<SongFields> {
        let title = required_text(errors, TITLE_FIELD, self.title.as_deref());
        let duration = required_non_negative(errors, DURATION_FIELD, self.duration.as_deref());
        let album_id = required_id(errors, ALBUM_ID_FIELD, self.album_id.as_deref());
        let band_id = required_id(errors, BAND_ID_FIELD, self.band_id.as_deref());
        Some(SongFields {
            title: title?,
            duration: duration?,
            album_id: album_id?,
            band_id: band_id?,
        })
    }

    pub fn validate_id(&self, errors: &mut ValidationErrors) -> Option<i64> {
        required_id(errors, ID_FIELD, self.id.as_deref())
    }
}

impl From<&Song> for SongForm {
    fn from(song: &Song) -> Self {
        SongForm {
            id: Some(song.id.to_string()),
            title: Some(song.title.clone()),
            duration: Some(song.duration.to_string()),
            album_id: Some(song.album_id.to_string()),
            band_id: Some(song.band_id.to_string()),
        }
    }
}
