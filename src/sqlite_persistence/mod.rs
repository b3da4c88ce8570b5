//! Declarative SQLite schema description shared by the catalog database.

mod versioned_schema;

pub use versioned_schema::{
    read_schema_version, Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
