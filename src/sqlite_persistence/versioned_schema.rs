use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

/// A column as declared in code. Built with [`sqlite_column!`].
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<&'static str>,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// (index name, column)
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

/// One row of `PRAGMA table_info`.
struct ColumnInfo {
    name: String,
    sql_type: String,
    non_null: bool,
    default_value: Option<String>,
    is_primary_key: bool,
}

/// One row of `PRAGMA foreign_key_list`.
struct ForeignKeyInfo {
    from_column: String,
    to_table: String,
    to_column: String,
    on_delete: String,
}

impl Table {
    fn primary_key_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name)
            .collect()
    }

    fn column_definition(column: &Column, inline_primary_key: bool) -> String {
        let mut definition = format!("{} {}", column.name, column.sql_type.as_sql());
        if column.is_primary_key && inline_primary_key {
            definition.push_str(" PRIMARY KEY");
        }
        if column.non_null {
            definition.push_str(" NOT NULL");
        }
        if column.is_unique {
            definition.push_str(" UNIQUE");
        }
        if let Some(default_value) = column.default_value {
            definition.push_str(&format!(" DEFAULT {}", default_value));
        }
        if let Some(fk) = column.foreign_key {
            definition.push_str(&format!(
                " REFERENCES {}({}) ON DELETE {}",
                fk.foreign_table,
                fk.foreign_column,
                fk.on_delete.as_sql()
            ));
        }
        definition
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        // More than one key column means a table-level composite key.
        let primary_key_columns = self.primary_key_columns();
        let composite_key = primary_key_columns.len() > 1;

        let mut definitions: Vec<String> = self
            .columns
            .iter()
            .map(|column| Self::column_definition(column, !composite_key))
            .collect();
        if composite_key {
            definitions.push(format!("PRIMARY KEY ({})", primary_key_columns.join(", ")));
        }
        for unique_constraint in self.unique_constraints {
            definitions.push(format!("UNIQUE ({})", unique_constraint.join(", ")));
        }

        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, definitions.join(", ")),
            [],
        )
        .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, column_name),
                [],
            )
            .with_context(|| format!("Failed to create index {}", index_name))?;
        }
        Ok(())
    }

    fn read_columns(&self, conn: &Connection) -> Result<Vec<ColumnInfo>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get(4)?,
                    // 1-based position inside the key, 0 when not part of it
                    is_primary_key: row.get::<_, i32>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read columns of table {}", self.name))?;
        Ok(columns)
    }

    fn validate_columns(&self, conn: &Connection) -> Result<()> {
        let actual_columns = self.read_columns(conn)?;

        let actual_names: Vec<&str> = actual_columns.iter().map(|c| c.name.as_str()).collect();
        let expected_names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        if actual_names != expected_names {
            bail!(
                "Table {} has columns [{}], expected [{}]",
                self.name,
                actual_names.join(", "),
                expected_names.join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            let check = |what: &str, matches: bool, expected_value: String, actual_value: String| {
                if matches {
                    Ok(())
                } else {
                    Err(anyhow!(
                        "Table {} column {} {} mismatch: expected {}, got {}",
                        self.name,
                        expected.name,
                        what,
                        expected_value,
                        actual_value
                    ))
                }
            };

            check(
                "type",
                actual.sql_type.eq_ignore_ascii_case(expected.sql_type.as_sql()),
                expected.sql_type.as_sql().to_string(),
                actual.sql_type.clone(),
            )?;
            check(
                "non-null",
                actual.non_null == expected.non_null,
                expected.non_null.to_string(),
                actual.non_null.to_string(),
            )?;
            // SQLite may report the default wrapped in parentheses.
            let actual_default = actual.default_value.as_deref().map(strip_parentheses);
            let expected_default = expected.default_value.map(strip_parentheses);
            check(
                "default value",
                actual_default == expected_default,
                format!("{:?}", expected.default_value),
                format!("{:?}", actual.default_value),
            )?;
            check(
                "primary key",
                actual.is_primary_key == expected.is_primary_key,
                expected.is_primary_key.to_string(),
                actual.is_primary_key.to_string(),
            )?;
        }
        Ok(())
    }

    fn validate_indices(&self, conn: &Connection) -> Result<()> {
        for (index_name, _column) in self.indices {
            let index_count: i64 = conn.query_row(
                "SELECT COUNT(1) FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                params![index_name, self.name],
                |row| row.get(0),
            )?;
            if index_count == 0 {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }

        if self.unique_constraints.is_empty() {
            return Ok(());
        }

        // Unique constraints are backed by unique indices.
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_index_names = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .filter(|(_, unique)| *unique == 1)
            .map(|(name, _)| name);

        let mut unique_column_sets: Vec<Vec<String>> = vec![];
        for index_name in unique_index_names {
            let mut stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut columns = stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            columns.sort();
            unique_column_sets.push(columns);
        }

        for constraint in self.unique_constraints {
            let mut expected: Vec<&str> = constraint.to_vec();
            expected.sort();
            let present = unique_column_sets.iter().any(|columns| columns == &expected);
            if !present {
                bail!(
                    "Table {} is missing unique constraint on columns ({})",
                    self.name,
                    constraint.join(", ")
                );
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", self.name))?;
        let actual_fks = stmt
            .query_map([], |row| {
                Ok(ForeignKeyInfo {
                    to_table: row.get(2)?,
                    from_column: row.get(3)?,
                    to_column: row.get(4)?,
                    on_delete: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for column in self.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let expected_sql = format!(
                "REFERENCES {}({}) ON DELETE {}",
                expected.foreign_table,
                expected.foreign_column,
                expected.on_delete.as_sql()
            );

            match actual_fks.iter().find(|fk| fk.from_column == column.name) {
                None => bail!(
                    "Table {} column {} is missing foreign key: expected {}",
                    self.name,
                    column.name,
                    expected_sql
                ),
                Some(actual)
                    if actual.to_table != expected.foreign_table
                        || actual.to_column != expected.foreign_column
                        || actual.on_delete != expected.on_delete.as_sql() =>
                {
                    bail!(
                        "Table {} column {} has foreign key mismatch: expected {}, got REFERENCES {}({}) ON DELETE {}",
                        self.name,
                        column.name,
                        expected_sql,
                        actual.to_table,
                        actual.to_column,
                        actual.on_delete
                    )
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn strip_parentheses(s: &str) -> &str {
    s.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s)
}

/// The full set of tables of one database version. `migration` brings a
/// database from the previous version to this one.
pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate_columns(conn)?;
            table.validate_indices(conn)?;
            table.validate_foreign_keys(conn)?;
        }
        Ok(())
    }
}
