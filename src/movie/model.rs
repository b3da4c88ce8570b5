//! The canonical movie record and its identity rules.

use crate::error::{CatalogError, CatalogResult};
use serde::Serialize;
use std::fmt;

/// The recognized movie attributes, keyed by the names used both in import
/// files and in remote service responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovieField {
    Title,
    Year,
    Rated,
    Released,
    Runtime,
    Genre,
    Director,
    Writer,
    Actors,
    Plot,
}

impl MovieField {
    pub const ALL: [MovieField; 10] = [
        MovieField::Title,
        MovieField::Year,
        MovieField::Rated,
        MovieField::Released,
        MovieField::Runtime,
        MovieField::Genre,
        MovieField::Director,
        MovieField::Writer,
        MovieField::Actors,
        MovieField::Plot,
    ];

    /// Key as written in import text and service responses (case-sensitive).
    pub fn key(&self) -> &'static str {
        match self {
            MovieField::Title => "Title",
            MovieField::Year => "Year",
            MovieField::Rated => "Rated",
            MovieField::Released => "Released",
            MovieField::Runtime => "Runtime",
            MovieField::Genre => "Genre",
            MovieField::Director => "Director",
            MovieField::Writer => "Writer",
            MovieField::Actors => "Actors",
            MovieField::Plot => "Plot",
        }
    }

    /// Exact, case-sensitive match. `"title"` is not `Title`.
    pub fn from_key(key: &str) -> Option<Self> {
        MovieField::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Identity of a movie in the catalog: `(title, year)` compared exactly.
///
/// A missing year is a key component of its own: it equals only another
/// missing year, never `Some("")`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieKey {
    pub title: String,
    pub year: Option<String>,
}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year.as_deref().unwrap_or("N/A"))
    }
}

/// A movie record. Immutable once built; only `title` is required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Movie {
    title: String,
    year: Option<String>,
    rated: Option<String>,
    released: Option<String>,
    runtime: Option<String>,
    genre: Option<String>,
    director: Option<String>,
    writer: Option<String>,
    actors: Option<String>,
    plot: Option<String>,
}

macro_rules! optional_field {
    ($getter:ident, $setter:ident) => {
        pub fn $getter(&self) -> Option<&str> {
            self.$getter.as_deref()
        }

        pub fn $setter(mut self, value: impl Into<String>) -> Self {
            self.$getter = Some(value.into());
            self
        }
    };
}

impl Movie {
    /// Creates a movie with only its title set.
    pub fn new(title: impl Into<String>) -> CatalogResult<Self> {
        let title = title.into();
        if title.is_empty() {
            return Err(CatalogError::InvalidRecord(
                "title must not be empty".to_string(),
            ));
        }
        Ok(Movie {
            title,
            year: None,
            rated: None,
            released: None,
            runtime: None,
            genre: None,
            director: None,
            writer: None,
            actors: None,
            plot: None,
        })
    }

    /// Builds a movie from any key/value source, mapping every recognized
    /// field. Fields the source does not provide stay absent.
    ///
    /// Returns `None` if the source has no non-empty `Title`.
    pub fn from_field_lookup<F>(mut lookup: F) -> Option<Self>
    where
        F: FnMut(MovieField) -> Option<String>,
    {
        let title = lookup(MovieField::Title).filter(|t| !t.is_empty())?;
        Some(Movie {
            title,
            year: lookup(MovieField::Year),
            rated: lookup(MovieField::Rated),
            released: lookup(MovieField::Released),
            runtime: lookup(MovieField::Runtime),
            genre: lookup(MovieField::Genre),
            director: lookup(MovieField::Director),
            writer: lookup(MovieField::Writer),
            actors: lookup(MovieField::Actors),
            plot: lookup(MovieField::Plot),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    optional_field!(year, with_year);
    optional_field!(rated, with_rated);
    optional_field!(released, with_released);
    optional_field!(runtime, with_runtime);
    optional_field!(genre, with_genre);
    optional_field!(director, with_director);
    optional_field!(writer, with_writer);
    optional_field!(actors, with_actors);
    optional_field!(plot, with_plot);

    /// Value of a field by name. `Title` is always present.
    pub fn get(&self, field: MovieField) -> Option<&str> {
        match field {
            MovieField::Title => Some(&self.title),
            MovieField::Year => self.year(),
            MovieField::Rated => self.rated(),
            MovieField::Released => self.released(),
            MovieField::Runtime => self.runtime(),
            MovieField::Genre => self.genre(),
            MovieField::Director => self.director(),
            MovieField::Writer => self.writer(),
            MovieField::Actors => self.actors(),
            MovieField::Plot => self.plot(),
        }
    }

    pub fn key(&self) -> MovieKey {
        MovieKey {
            title: self.title.clone(),
            year: self.year.clone(),
        }
    }

    /// Two movies are duplicates iff their `(title, year)` keys are equal.
    pub fn is_duplicate_of(&self, other: &Movie) -> bool {
        self.title == other.title && self.year == other.year
    }

    /// Multi-line detail card, one `Key: value` line per field with the plot
    /// set apart at the end.
    pub fn details(&self) -> String {
        let mut out = String::new();
        for field in MovieField::ALL {
            if field == MovieField::Plot {
                out.push('\n');
            }
            out.push_str(field.key());
            out.push_str(": ");
            out.push_str(self.get(field).unwrap_or("N/A"));
            if field != MovieField::Plot {
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year().unwrap_or("N/A"))
    }
}
