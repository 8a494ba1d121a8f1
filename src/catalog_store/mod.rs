mod models;
mod reference;
pub mod schema;
#[cfg(test)]
pub(crate) mod stale_references;
mod store;
mod trait_def;
mod validation;

pub use models::*;
pub use reference::{
    ReferenceRule, UnknownReference, ALBUM_REFERENCE, BAND_REFERENCE, KNOWN_REFERENCES,
    SONG_REFERENCE,
};
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
pub use validation::{
    required_id, required_non_negative, required_text, FieldError, FormField, ValidationError,
    ValidationErrors,
};
