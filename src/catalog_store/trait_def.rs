//! CatalogStore trait definition.

use crate::error::CatalogResult;
use crate::movie::Movie;

/// Keyed storage of movie records.
///
/// The store owns the persisted records; every movie it returns is an
/// independent copy. At most one record exists per `(title, year)` key.
pub trait CatalogStore: Send + Sync {
    /// Inserts a movie, failing with `CatalogError::DuplicateKey` if its key
    /// is already present. Meant for bulk loads; callers that need dedup
    /// should use [`CatalogStore::insert_if_absent`].
    fn insert(&self, movie: &Movie) -> CatalogResult<()>;

    /// Inserts a movie unless its key is already present.
    /// Returns whether an insert happened. The existence check and the insert
    /// are atomic with respect to concurrent callers.
    fn insert_if_absent(&self, movie: &Movie) -> CatalogResult<bool>;

    /// Applies `insert_if_absent` to each movie in order, returning how many
    /// were actually inserted. Each movie is committed on its own, so an error
    /// leaves earlier inserts in place.
    fn insert_all_if_absent(&self, movies: &[Movie]) -> CatalogResult<usize> {
        let mut inserted = 0;
        for movie in movies {
            if self.insert_if_absent(movie)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Exact lookup on both title and year.
    fn get(&self, title: &str, year: Option<&str>) -> CatalogResult<Option<Movie>>;

    /// Case-insensitive substring match on titles. An empty fragment matches
    /// everything.
    fn search_by_title(&self, fragment: &str) -> CatalogResult<Vec<Movie>>;

    /// Case-insensitive substring match on the raw actors text. An empty
    /// fragment matches everything.
    fn search_by_actor(&self, fragment: &str) -> CatalogResult<Vec<Movie>>;

    /// All movies, in storage order.
    fn get_all(&self) -> CatalogResult<Vec<Movie>>;

    fn count(&self) -> CatalogResult<usize>;

    /// Removes every record, returning how many were deleted.
    fn clear(&self) -> CatalogResult<usize>;
}
