//! SQLite-backed catalog store.
//!
//! Writes go through a single connection behind a mutex, so the existence
//! check of `insert_if_absent` and the insert itself can never interleave
//! with another writer. Reads are spread over a small pool of read-only
//! connections; with WAL journaling they see every committed insert without
//! waiting for the writer.

use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::error::{CatalogError, CatalogResult, StorageError};
use crate::movie::{Movie, MovieField};
use crate::sqlite_persistence::read_schema_version;
use anyhow::{bail, Context};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, types::Type, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const SELECT_MOVIE_COLUMNS: &str = "SELECT title, year, has_year, rated, released, runtime, \
     genre, director, writer, actors, plot FROM movies";

const INSERT_MOVIE: &str = "INSERT INTO movies \
     (title, year, has_year, rated, released, runtime, genre, director, writer, actors, plot) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// Optional text columns, in the order they follow `has_year` in
/// `SELECT_MOVIE_COLUMNS` and `INSERT_MOVIE`.
const OPTIONAL_COLUMNS: [MovieField; 8] = [
    MovieField::Rated,
    MovieField::Released,
    MovieField::Runtime,
    MovieField::Genre,
    MovieField::Director,
    MovieField::Writer,
    MovieField::Actors,
    MovieField::Plot,
];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed catalog store.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

/// Creates the schema in an empty database, otherwise checks that the
/// database was created by this crate at the current schema version.
fn create_or_validate_schema(conn: &Connection) -> anyhow::Result<()> {
    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    match read_schema_version(conn)? {
        None => bail!("Database was not created by movie-catalog (no schema version found)"),
        Some(version) if version != latest_version => bail!(
            "Unsupported catalog schema version {} (expected {})",
            version,
            latest_version
        ),
        Some(_) => {}
    }

    latest_schema
        .validate(conn)
        .context("Catalog database schema does not match")
}

/// Registers `fold_case(text)`, a Unicode-aware lowercase. SQLite's built-in
/// `lower()` only folds ASCII letters.
fn register_fold_case(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Encodes the year half of the key: the stored text plus the presence flag.
fn year_key(year: Option<&str>) -> (&str, bool) {
    (year.unwrap_or(""), year.is_some())
}

fn parse_movie_row(row: &Row) -> rusqlite::Result<Movie> {
    let mut values: HashMap<MovieField, String> = HashMap::new();
    values.insert(MovieField::Title, row.get(0)?);
    if row.get::<_, i64>(2)? != 0 {
        values.insert(MovieField::Year, row.get(1)?);
    }
    for (offset, field) in OPTIONAL_COLUMNS.iter().enumerate() {
        if let Some(value) = row.get::<_, Option<String>>(3 + offset)? {
            values.insert(*field, value);
        }
    }
    Movie::from_field_lookup(|field| values.remove(&field)).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, "empty movie title".into())
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl SqliteCatalogStore {
    /// Opens (creating if needed) the catalog database at `db_path`.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent reads (at least 1 is used)
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> CatalogResult<Self> {
        let db_path = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        write_conn.busy_timeout(BUSY_TIMEOUT)?;

        create_or_validate_schema(&write_conn)
            .map_err(|e| StorageError::Schema(format!("{:?}: {:#}", db_path, e)))?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let movie_count: i64 = write_conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
        info!("Opened movie catalog at {:?}: {} movies", db_path, movie_count);

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(BUSY_TIMEOUT)?;
            register_fold_case(&read_conn)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn lock(conn: &Mutex<Connection>) -> CatalogResult<MutexGuard<'_, Connection>> {
        conn.lock()
            .map_err(|_| CatalogError::Storage(StorageError::LockPoisoned))
    }

    /// Runs an insert statement for `movie`, returning the number of rows added.
    fn execute_insert(conn: &Connection, sql: &str, movie: &Movie) -> rusqlite::Result<usize> {
        let (year, has_year) = year_key(movie.year());
        let mut stmt = conn.prepare_cached(sql)?;
        stmt.execute(params![
            movie.title(),
            year,
            has_year,
            movie.rated(),
            movie.released(),
            movie.runtime(),
            movie.genre(),
            movie.director(),
            movie.writer(),
            movie.actors(),
            movie.plot(),
        ])
    }

    fn query_movies(&self, sql: &str, fragment: &str) -> CatalogResult<Vec<Movie>> {
        let conn = self.get_read_conn();
        let conn = Self::lock(&conn)?;
        let mut stmt = conn.prepare_cached(sql)?;
        let movies = stmt
            .query_map(params![fragment], parse_movie_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn insert(&self, movie: &Movie) -> CatalogResult<()> {
        let conn = Self::lock(&self.write_conn)?;
        match Self::execute_insert(&conn, INSERT_MOVIE, movie) {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(CatalogError::DuplicateKey {
                title: movie.title().to_string(),
                year: movie.year().map(str::to_string),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_if_absent(&self, movie: &Movie) -> CatalogResult<bool> {
        let conn = Self::lock(&self.write_conn)?;
        let sql = format!("{} ON CONFLICT(title, year, has_year) DO NOTHING", INSERT_MOVIE);
        let inserted = Self::execute_insert(&conn, &sql, movie)? > 0;
        if !inserted {
            debug!("Movie {} already in catalog, not inserted", movie.key());
        }
        Ok(inserted)
    }

    fn get(&self, title: &str, year: Option<&str>) -> CatalogResult<Option<Movie>> {
        let (year, has_year) = year_key(year);
        let conn = self.get_read_conn();
        let conn = Self::lock(&conn)?;
        let mut stmt = conn.prepare_cached(&format!(
            "{} WHERE title = ?1 AND year = ?2 AND has_year = ?3",
            SELECT_MOVIE_COLUMNS
        ))?;
        let movie = stmt
            .query_row(params![title, year, has_year], parse_movie_row)
            .optional()?;
        Ok(movie)
    }

    fn search_by_title(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.query_movies(
            &format!(
                "{} WHERE instr(fold_case(title), fold_case(?1)) > 0 ORDER BY rowid",
                SELECT_MOVIE_COLUMNS
            ),
            fragment,
        )
    }

    fn search_by_actor(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.query_movies(
            &format!(
                "{} WHERE ?1 = '' OR instr(fold_case(actors), fold_case(?1)) > 0 ORDER BY rowid",
                SELECT_MOVIE_COLUMNS
            ),
            fragment,
        )
    }

    fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        let conn = self.get_read_conn();
        let conn = Self::lock(&conn)?;
        let mut stmt = conn.prepare_cached(&format!("{} ORDER BY rowid", SELECT_MOVIE_COLUMNS))?;
        let movies = stmt
            .query_map([], parse_movie_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    }

    fn count(&self) -> CatalogResult<usize> {
        let conn = self.get_read_conn();
        let conn = Self::lock(&conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> CatalogResult<usize> {
        let conn = Self::lock(&self.write_conn)?;
        let deleted = conn.execute("DELETE FROM movies", [])?;
        info!("Cleared movie catalog ({} movies deleted)", deleted);
        Ok(deleted)
    }
}
