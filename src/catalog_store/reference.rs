//! Existence checks for values that point at another catalog row.
//!
//! A [`ReferenceRule`] can only be built for a known (table, column) pair, so
//! the identifiers that end up in the query text always come from
//! [`KNOWN_REFERENCES`] and the checked value is always a bound parameter.

use std::fmt;

/// Every (table, column) pair a reference may point at.
pub const KNOWN_REFERENCES: &[(&str, &str)] = &[("albums", "id"), ("bands", "id"), ("songs", "id")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference {
    pub table: String,
    pub column: String,
}

impl fmt::Display for UnknownReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown reference target {}.{}", self.table, self.column)
    }
}

impl std::error::Error for UnknownReference {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRule {
    table: &'static str,
    column: &'static str,
}

pub const ALBUM_REFERENCE: ReferenceRule = ReferenceRule {
    table: "albums",
    column: "id",
};

pub const BAND_REFERENCE: ReferenceRule = ReferenceRule {
    table: "bands",
    column: "id",
};

pub const SONG_REFERENCE: ReferenceRule = ReferenceRule {
    table: "songs",
    column: "id",
};

impl ReferenceRule {
    /// Resolves `table`/`column` (case-insensitive) against [`KNOWN_REFERENCES`].
    pub fn new(table: &str, column: &str) -> Result<Self, UnknownReference> {
        KNOWN_REFERENCES
            .iter()
            .find(|(t, c)| t.eq_ignore_ascii_case(table) && c.eq_ignore_ascii_case(column))
            .map(|&(t, c)| ReferenceRule {
                table: t,
                column: c,
            })
            .ok_or_else(|| UnknownReference {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    /// The counting query, with the checked value as `?1`.
    pub fn count_query(&self) -> String {
        format!(
            "SELECT COUNT(1) FROM {} WHERE {} = ?1",
            self.table, self.column
        )
    }
}
