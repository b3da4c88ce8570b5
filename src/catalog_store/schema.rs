//! SQLite schema for the movie catalog database.
//!
//! A single `movies` table keyed by `(title, year)`. SQLite treats NULLs as
//! distinct inside UNIQUE constraints, so the year is stored as non-null text
//! (empty when absent) next to a `has_year` flag. The constraint then covers
//! `(title, year, has_year)`, which keeps a missing year apart from an empty
//! one.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

pub const MOVIES_TABLE: Table = Table {
    name: "movies",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Text, non_null = true),
        sqlite_column!("has_year", &SqlType::Integer, non_null = true),
        sqlite_column!("rated", &SqlType::Text),
        sqlite_column!("released", &SqlType::Text),
        sqlite_column!("runtime", &SqlType::Text),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("director", &SqlType::Text),
        sqlite_column!("writer", &SqlType::Text),
        sqlite_column!("actors", &SqlType::Text),
        sqlite_column!("plot", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_movies_title", "title")],
    unique_constraints: &[&["title", "year", "has_year"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MOVIES_TABLE],
}];
