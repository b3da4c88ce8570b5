//! Shared constants for integration tests
//!
//! Import texts use the default first-token capture unless their name says
//! otherwise, so multi-word values only appear where that is the point.

/// Two identical blocks: one movie added, one skipped.
pub const INCEPTION_TWICE: &str = "Title: Inception\nYear: 2010\n\nTitle: Inception\nYear: 2010\n";

/// Three movies in the loose key/value formats the importer accepts, plus a
/// block with no title.
pub const SAMPLE_IMPORT: &str = r#"Title: Inception
Year: 2010
Director: Nolan
Actors: DiCaprio

"Title": "Heat",
"Year": "1995",
"Actors": "Pacino",

Year: 1999
Director: Nobody


title: ignored
Title:Ran
Year :1985
Genre: Drama
"#;

/// Number of titled blocks in `SAMPLE_IMPORT`.
pub const SAMPLE_IMPORT_MOVIES: usize = 3;

/// Multi-word values, meant for `ValueCapture::WholeLine`.
pub const WHOLE_LINE_IMPORT: &str = "Title: Batman Begins\r\nYear: 2005\r\nActors: Christian Bale, Michael Caine\r\n\r\nTitle: \"The Dark Knight\",\r\nYear: 2008\r\n";

pub const NOT_FOUND_DETAIL: &str = "Movie not found!";
