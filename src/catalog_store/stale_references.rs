//! A store whose first reference checks answer from a stale view, so a row
//! can vanish between validation and the write that depends on it.

use super::models::{
    Album, AlbumFields, Band, BandFields, PickerOption, Song, SongFields, SongListing,
};
use super::reference::ReferenceRule;
use super::trait_def::CatalogStore;
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct StaleReferences {
    inner: Arc<dyn CatalogStore>,
    stale_checks: AtomicUsize,
}

impl StaleReferences {
    /// The next `stale_checks` calls to `reference_exists` report true.
    pub fn new(inner: Arc<dyn CatalogStore>, stale_checks: usize) -> Self {
        StaleReferences {
            inner,
            stale_checks: AtomicUsize::new(stale_checks),
        }
    }
}

impl CatalogStore for StaleReferences {
    fn list_albums(&self) -> Result<Vec<Album>> {
        self.inner.list_albums()
    }

    fn get_album(&self, id: i64) -> Result<Option<Album>> {
        self.inner.get_album(id)
    }

    fn insert_album(&self, fields: &AlbumFields) -> Result<i64> {
        self.inner.insert_album(fields)
    }

    fn update_album(&self, id: i64, fields: &AlbumFields) -> Result<bool> {
        self.inner.update_album(id, fields)
    }

    fn delete_album(&self, id: i64) -> Result<bool> {
        self.inner.delete_album(id)
    }

    fn list_bands(&self) -> Result<Vec<Band>> {
        self.inner.list_bands()
    }

    fn get_band(&self, id: i64) -> Result<Option<Band>> {
        self.inner.get_band(id)
    }

    fn insert_band(&self, fields: &BandFields) -> Result<i64> {
        self.inner.insert_band(fields)
    }

    fn update_band(&self, id: i64, fields: &BandFields) -> Result<bool> {
        self.inner.update_band(id, fields)
    }

    fn delete_band(&self, id: i64) -> Result<bool> {
        self.inner.delete_band(id)
    }

    fn list_songs(&self) -> Result<Vec<SongListing>> {
        self.inner.list_songs()
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        self.inner.get_song(id)
    }

    fn get_song_listing(&self, id: i64) -> Result<Option<SongListing>> {
        self.inner.get_song_listing(id)
    }

    fn insert_song(&self, fields: &SongFields) -> Result<i64> {
        self.inner.insert_song(fields)
    }

    fn update_song(&self, id: i64, fields: &SongFields) -> Result<bool> {
        self.inner.update_song(id, fields)
    }

    fn delete_song(&self, id: i64) -> Result<bool> {
        self.inner.delete_song(id)
    }

    fn album_options(&self) -> Result<Vec<PickerOption>> {
        self.inner.album_options()
    }

    fn band_options(&self) -> Result<Vec<PickerOption>> {
        self.inner.band_options()
    }

    fn song_options(&self) -> Result<Vec<PickerOption>> {
        self.inner.song_options()
    }

    fn reference_exists(&self, rule: &ReferenceRule, value: i64) -> Result<bool> {
        let stale = self
            .stale_checks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(true);
        }
        self.inner.reference_exists(rule, value)
    }

    fn get_albums_count(&self) -> Result<usize> {
        self.inner.get_albums_count()
    }

    fn get_bands_count(&self) -> Result<usize> {
        self.inner.get_bands_count()
    }

    fn get_songs_count(&self) -> Result<usize> {
        self.inner.get_songs_count()
    }
}
