use super::forms::{AlbumForm, BandForm, SongForm, ALBUM_ID_FIELD, BAND_ID_FIELD};
use super::{is_constraint_violation, OperationError};
use crate::catalog_store::{
    Album, Band, CatalogStore, PickerOption, Song, SongFields, SongListing, ValidationError,
    ValidationErrors, ALBUM_REFERENCE, BAND_REFERENCE,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Case-insensitive substring match, a missing or empty search matches all.
pub fn matches_search(text: &str, search: Option<&str>) -> bool {
    match search {
        Some(search) if !search.is_empty() => {
            text.to_lowercase().contains(&search.to_lowercase())
        }
        _ => true,
    }
}

/// Choices offered by the song form.
#[derive(Clone, Debug, Serialize)]
pub struct SongPickers {
    pub albums: Vec<PickerOption>,
    pub bands: Vec<PickerOption>,
}

pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
}

impl CatalogManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        CatalogManager { store }
    }

    // =========================================================================
    // Albums
    // =========================================================================

    pub fn list_albums(&self, search: Option<&str>) -> Result<Vec<Album>, OperationError> {
        let albums = self.store.list_albums()?;
        Ok(albums
            .into_iter()
            .filter(|a| matches_search(&a.title, search))
            .collect())
    }

    pub fn get_album(&self, id: i64) -> Result<Album, OperationError> {
        self.store
            .get_album(id)?
            .ok_or(OperationError::NotFound { entity: "Album", id })
    }

    pub fn create_album(&self, form: &AlbumForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let fields = form.validate(&mut errors);
        let fields = match (errors.into_result(), fields) {
            (Ok(()), Some(fields)) => fields,
            (result, _) => return Err(invalid(result)),
        };
        let id = self.store.insert_album(&fields)?;
        info!("Created album {} ({})", id, fields.title);
        Ok(id)
    }

    pub fn edit_album(&self, form: &AlbumForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let id = form.validate_id(&mut errors);
        let fields = form.validate(&mut errors);
        let (id, fields) = match (errors.into_result(), id, fields) {
            (Ok(()), Some(id), Some(fields)) => (id, fields),
            (result, _, _) => return Err(invalid(result)),
        };
        if !self.store.update_album(id, &fields)? {
            return Err(OperationError::NotFound { entity: "Album", id });
        }
        info!("Updated album {}", id);
        Ok(id)
    }

    pub fn delete_album(&self, id: i64) -> Result<(), OperationError> {
        if !self.store.delete_album(id)? {
            return Err(OperationError::NotFound { entity: "Album", id });
        }
        info!("Deleted album {}", id);
        Ok(())
    }

    // =========================================================================
    // Bands
    // =========================================================================

    pub fn list_bands(&self, search: Option<&str>) -> Result<Vec<Band>, OperationError> {
        let bands = self.store.list_bands()?;
        Ok(bands
            .into_iter()
            .filter(|b| matches_search(&b.name, search))
            .collect())
    }

    pub fn get_band(&self, id: i64) -> Result<Band, OperationError> {
        self.store
            .get_band(id)?
            .ok_or(OperationError::NotFound { entity: "Band", id })
    }

    pub fn create_band(&self, form: &BandForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let fields = form.validate(&mut errors);
        let fields = match (errors.into_result(), fields) {
            (Ok(()), Some(fields)) => fields,
            (result, _) => return Err(invalid(result)),
        };
        let id = self.store.insert_band(&fields)?;
        info!("Created band {} ({})", id, fields.name);
        Ok(id)
    }

    pub fn edit_band(&self, form: &BandForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let id = form.validate_id(&mut errors);
        let fields = form.validate(&mut errors);
        let (id, fields) = match (errors.into_result(), id, fields) {
            (Ok(()), Some(id), Some(fields)) => (id, fields),
            (result, _, _) => return Err(invalid(result)),
        };
        if !self.store.update_band(id, &fields)? {
            return Err(OperationError::NotFound { entity: "Band", id });
        }
        info!("Updated band {}", id);
        Ok(id)
    }

    pub fn delete_band(&self, id: i64) -> Result<(), OperationError> {
        if !self.store.delete_band(id)? {
            return Err(OperationError::NotFound { entity: "Band", id });
        }
        info!("Deleted band {}", id);
        Ok(())
    }

    // =========================================================================
    // Songs
    // =========================================================================

    pub fn list_songs(&self, search: Option<&str>) -> Result<Vec<SongListing>, OperationError> {
        let songs = self.store.list_songs()?;
        Ok(songs
            .into_iter()
            .filter(|s| matches_search(&s.title, search))
            .collect())
    }

    pub fn get_song(&self, id: i64) -> Result<Song, OperationError> {
        self.store
            .get_song(id)?
            .ok_or(OperationError::NotFound { entity: "Song", id })
    }

    /// The song with its album and band names, as shown before deleting it.
    pub fn get_song_listing(&self, id: i64) -> Result<SongListing, OperationError> {
        self.store
            .get_song_listing(id)?
            .ok_or(OperationError::NotFound { entity: "Song", id })
    }

    pub fn song_pickers(&self) -> Result<SongPickers, OperationError> {
        Ok(SongPickers {
            albums: self.store.album_options()?,
            bands: self.store.band_options()?,
        })
    }

    pub fn create_song(&self, form: &SongForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let fields = form.validate(&mut errors);
        self.check_song_references(&mut errors, fields.as_ref())?;
        let fields = match (errors.into_result(), fields) {
            (Ok(()), Some(fields)) => fields,
            (result, _) => return Err(invalid(result)),
        };
        let id = match self.store.insert_song(&fields) {
            Ok(id) => id,
            Err(err) if is_constraint_violation(&err) => {
                return Err(self.vanished_references(&fields, err))
            }
            Err(err) => return Err(err.into()),
        };
        info!("Created song {} ({})", id, fields.title);
        Ok(id)
    }

    pub fn edit_song(&self, form: &SongForm) -> Result<i64, OperationError> {
        let mut errors = ValidationErrors::new();
        let id = form.validate_id(&mut errors);
        let fields = form.validate(&mut errors);
        self.check_song_references(&mut errors, fields.as_ref())?;
        let (id, fields) = match (errors.into_result(), id, fields) {
            (Ok(()), Some(id), Some(fields)) => (id, fields),
            (result, _, _) => return Err(invalid(result)),
        };
        let updated = match self.store.update_song(id, &fields) {
            Ok(updated) => updated,
            Err(err) if is_constraint_violation(&err) => {
                return Err(self.vanished_references(&fields, err))
            }
            Err(err) => return Err(err.into()),
        };
        if !updated {
            return Err(OperationError::NotFound { entity: "Song", id });
        }
        info!("Updated song {}", id);
        Ok(id)
    }

    pub fn delete_song(&self, id: i64) -> Result<(), OperationError> {
        if !self.store.delete_song(id)? {
            return Err(OperationError::NotFound { entity: "Song", id });
        }
        info!("Deleted song {}", id);
        Ok(())
    }

    fn check_song_references(
        &self,
        errors: &mut ValidationErrors,
        fields: Option<&SongFields>,
    ) -> Result<(), OperationError> {
        let Some(fields) = fields else {
            return Ok(());
        };
        if !self
            .store
            .reference_exists(&ALBUM_REFERENCE, fields.album_id)?
        {
            errors.push(ValidationError::ForeignKeyViolation {
                field: ALBUM_ID_FIELD,
                id: fields.album_id,
            });
        }
        if !self.store.reference_exists(&BAND_REFERENCE, fields.band_id)? {
            errors.push(ValidationError::ForeignKeyViolation {
                field: BAND_ID_FIELD,
                id: fields.band_id,
            });
        }
        Ok(())
    }

    /// A song write hit a foreign key failure after its references were
    /// checked: report whichever album or band is gone now.
    fn vanished_references(&self, fields: &SongFields, cause: anyhow::Error) -> OperationError {
        let mut errors = ValidationErrors::new();
        if let Err(err) = self.check_song_references(&mut errors, Some(fields)) {
            return err;
        }
        match errors.into_result() {
            Err(errors) => OperationError::Validation(errors),
            Ok(()) => OperationError::Storage(cause),
        }
    }
}

/// Turns a failed collection into an error. Fields only come back as `None`
/// after pushing an error, so an `Ok` here means nothing was recorded.
fn invalid(result: Result<(), ValidationErrors>) -> OperationError {
    match result {
        Err(errors) => OperationError::Validation(errors),
        Ok(()) => OperationError::Validation(ValidationErrors::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::stale_references::StaleReferences;
    use crate::catalog_store::SqliteCatalogStore;
    use crate::database::open_in_memory;

    fn create_manager() -> CatalogManager {
        let store = SqliteCatalogStore::new(open_in_memory().unwrap());
        CatalogManager::new(Arc::new(store))
    }

    fn album_form(title: &str, year: &str) -> AlbumForm {
        AlbumForm {
            id: None,
            title: Some(title.to_string()),
            release_year: Some(year.to_string()),
        }
    }

    fn band_form(name: &str) -> BandForm {
        BandForm {
            id: None,
            name: Some(name.to_string()),
            form_year: Some("1999".to_string()),
            country: Some("UK".to_string()),
        }
    }

    fn song_form(title: &str, album_id: i64, band_id: i64) -> SongForm {
        SongForm {
            id: None,
            title: Some(title.to_string()),
            duration: Some("180".to_string()),
            album_id: Some(album_id.to_string()),
            band_id: Some(band_id.to_string()),
        }
    }

    fn validation_fields(error: OperationError) -> Vec<&'static str> {
        match error {
            OperationError::Validation(errors) => {
                errors.field_errors().iter().map(|e| e.field).collect()
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn search_matches_substrings_ignoring_case() {
        assert!(matches_search("Rock Album", Some("rock")));
        assert!(matches_search("Rock Album", Some("ALB")));
        assert!(matches_search("Rock Album", None));
        assert!(matches_search("Rock Album", Some("")));
        assert!(!matches_search("Pop Album", Some("Rock")));
    }

    #[test]
    fn list_with_search_returns_matching_subset() {
        let manager = create_manager();
        manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        manager.create_album(&album_form("Pop Album", "2023")).unwrap();

        let all = manager.list_albums(None).unwrap();
        assert_eq!(all.len(), 2);

        let rock = manager.list_albums(Some("Rock")).unwrap();
        assert_eq!(rock.len(), 1);
        assert_eq!(rock[0].title, "Rock Album");
        assert!(all.contains(&rock[0]));

        assert_eq!(manager.list_albums(Some("album")).unwrap(), all);
    }

    #[test]
    fn create_album_collects_all_errors() {
        let manager = create_manager();
        let error = manager
            .create_album(&AlbumForm::default())
            .unwrap_err();
        assert_eq!(validation_fields(error), vec!["Title", "ReleaseYear"]);
        assert!(manager.list_albums(None).unwrap().is_empty());
    }

    #[test]
    fn edit_unknown_album_is_not_found_and_mutates_nothing() {
        let manager = create_manager();
        let id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();

        let mut form = album_form("Renamed", "2000");
        form.id = Some((id + 1).to_string());
        assert!(matches!(
            manager.edit_album(&form),
            Err(OperationError::NotFound { entity: "Album", .. })
        ));
        assert_eq!(manager.get_album(id).unwrap().title, "Rock Album");
    }

    #[test]
    fn edit_validates_before_looking_up_the_row() {
        let manager = create_manager();
        let mut form = album_form("", "2000");
        form.id = Some("999".to_string());
        assert_eq!(
            validation_fields(manager.edit_album(&form).unwrap_err()),
            vec!["Title"]
        );

        form.id = None;
        form.title = Some("Named".to_string());
        assert_eq!(
            validation_fields(manager.edit_album(&form).unwrap_err()),
            vec!["Id"]
        );
    }

    #[test]
    fn edit_band_overwrites_fields_and_keeps_id() {
        let manager = create_manager();
        let id = manager.create_band(&band_form("The Testers")).unwrap();

        let mut form = band_form("The Reviewers");
        form.id = Some(id.to_string());
        form.country = Some("IE".to_string());
        assert_eq!(manager.edit_band(&form).unwrap(), id);

        let band = manager.get_band(id).unwrap();
        assert_eq!(band.id, id);
        assert_eq!(band.name, "The Reviewers");
        assert_eq!(band.country, "IE");
        assert_eq!(band.form_year, 1999);
    }

    #[test]
    fn delete_removes_row_and_reports_missing_ids() {
        let manager = create_manager();
        let id = manager.create_band(&band_form("The Testers")).unwrap();

        manager.delete_band(id).unwrap();
        assert!(manager.list_bands(None).unwrap().is_empty());
        assert!(matches!(
            manager.delete_band(id),
            Err(OperationError::NotFound { .. })
        ));
        assert!(matches!(
            manager.get_band(id),
            Err(OperationError::NotFound { .. })
        ));
    }

    #[test]
    fn create_song_with_existing_references() {
        let manager = create_manager();
        let album_id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        let band_id = manager.create_band(&band_form("The Testers")).unwrap();

        let id = manager
            .create_song(&song_form("Opening", album_id, band_id))
            .unwrap();
        let songs = manager.list_songs(None).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, id);
        assert_eq!(songs[0].album_title, "Rock Album");
        assert_eq!(songs[0].band_name, "The Testers");
        assert_eq!(manager.get_song(id).unwrap().duration, 180);
    }

    #[test]
    fn create_song_with_missing_band_persists_nothing() {
        let manager = create_manager();
        let album_id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();

        let error = manager
            .create_song(&song_form("Opening", album_id, 77))
            .unwrap_err();
        match error {
            OperationError::Validation(errors) => {
                assert_eq!(
                    errors.errors(),
                    &[ValidationError::ForeignKeyViolation {
                        field: BAND_ID_FIELD,
                        id: 77
                    }]
                );
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert!(manager.list_songs(None).unwrap().is_empty());
    }

    #[test]
    fn edit_song_rechecks_references() {
        let manager = create_manager();
        let album_id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        let band_id = manager.create_band(&band_form("The Testers")).unwrap();
        let id = manager
            .create_song(&song_form("Opening", album_id, band_id))
            .unwrap();

        let mut form = song_form("Opening", album_id + 10, band_id);
        form.id = Some(id.to_string());
        assert_eq!(
            validation_fields(manager.edit_song(&form).unwrap_err()),
            vec!["AlbumId"]
        );
        assert_eq!(manager.get_song(id).unwrap().album_id, album_id);
    }

    #[test]
    fn song_pickers_list_albums_and_bands() {
        let manager = create_manager();
        manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        manager.create_band(&band_form("The Testers")).unwrap();

        let pickers = manager.song_pickers().unwrap();
        assert_eq!(pickers.albums[0].label, "Rock Album");
        assert_eq!(pickers.bands[0].label, "The Testers");
    }

    #[test]
    fn create_song_reports_band_deleted_after_check() {
        let store: Arc<dyn CatalogStore> =
            Arc::new(SqliteCatalogStore::new(open_in_memory().unwrap()));
        let manager = CatalogManager::new(store.clone());
        let album_id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        let band_id = manager.create_band(&band_form("The Testers")).unwrap();
        manager.delete_band(band_id).unwrap();

        let stale = CatalogManager::new(Arc::new(StaleReferences::new(store, 2)));
        assert_eq!(
            validation_fields(
                stale
                    .create_song(&song_form("Opening", album_id, band_id))
                    .unwrap_err()
            ),
            vec!["BandId"]
        );
        assert!(manager.list_songs(None).unwrap().is_empty());
    }

    #[test]
    fn edit_song_reports_album_deleted_after_check() {
        let store: Arc<dyn CatalogStore> =
            Arc::new(SqliteCatalogStore::new(open_in_memory().unwrap()));
        let manager = CatalogManager::new(store.clone());
        let album_id = manager.create_album(&album_form("Rock Album", "2021")).unwrap();
        let gone_album_id = manager.create_album(&album_form("Pop Album", "2023")).unwrap();
        let band_id = manager.create_band(&band_form("The Testers")).unwrap();
        let id = manager
            .create_song(&song_form("Opening", album_id, band_id))
            .unwrap();
        manager.delete_album(gone_album_id).unwrap();

        let stale = CatalogManager::new(Arc::new(StaleReferences::new(store, 2)));
        let mut form = song_form("Opening", gone_album_id, band_id);
        form.id = Some(id.to_string());
        assert_eq!(
            validation_fields(stale.edit_song(&form).unwrap_err()),
            vec!["AlbumId"]
        );
        assert_eq!(manager.get_song(id).unwrap().album_id, album_id);
    }
}
