mod connection;
mod versioned_schema;

pub use connection::{open_in_memory_database, open_versioned_database, SharedConnection};
pub use versioned_schema::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
