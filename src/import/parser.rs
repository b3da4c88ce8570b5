//! Tolerant parser for movie import text.
//!
//! Import files hold one movie per block, blocks being separated by blank
//! lines. Each line of a block may carry a `Key: value` pair, loosely
//! JSON-flavoured: quotes around key and value and a trailing comma are all
//! optional. Anything that does not look like a recognized pair is ignored.

use crate::movie::{Movie, MovieField};
use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::str::Lines;
use tracing::debug;

lazy_static! {
    // A value ends at the first space, comma or quote, so multi-word values
    // keep only their first token. Existing import files rely on this.
    static ref FIRST_TOKEN_PAIR: Regex =
        Regex::new(r#""?([A-Za-z0-9_]+)"?\s*:\s*"?([^" ,]+)"?,?"#).unwrap();
    static ref WHOLE_LINE_PAIR: Regex =
        Regex::new(r#""?([A-Za-z0-9_]+)"?\s*:(.*)$"#).unwrap();
}

/// How much of a line is taken as the value of a `Key: value` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ValueCapture {
    /// Value stops at the first space, comma or quote.
    #[default]
    FirstToken,
    /// Value is the rest of the line, minus one pair of surrounding quotes
    /// and a trailing comma.
    WholeLine,
}

/// Iterator over the blocks of an import text.
///
/// Runs of blank (whitespace-only) lines count as a single separator, and the
/// last block is yielded even without a trailing blank line.
pub struct Blocks<'a> {
    lines: Lines<'a>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = Vec::new();
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    return Some(block);
                }
            } else {
                block.push(line);
            }
        }
        if block.is_empty() {
            None
        } else {
            Some(block)
        }
    }
}

pub fn split_blocks(text: &str) -> Blocks<'_> {
    Blocks {
        lines: text.lines(),
    }
}

/// Extracts the `(key, value)` pair of a single line, if any.
fn match_pair(line: &str, capture: ValueCapture) -> Option<(&str, String)> {
    match capture {
        ValueCapture::FirstToken => {
            let caps = FIRST_TOKEN_PAIR.captures(line)?;
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str().trim().to_string();
            Some((key, value))
        }
        ValueCapture::WholeLine => {
            let caps = WHOLE_LINE_PAIR.captures(line)?;
            let key = caps.get(1)?.as_str();
            let raw = caps.get(2)?.as_str().trim();
            let raw = raw.strip_suffix(',').unwrap_or(raw).trim_end();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            if value.is_empty() {
                return None;
            }
            Some((key, value.to_string()))
        }
    }
}

/// Parses one block into a movie. Blocks without a `Title` yield `None`.
pub fn parse_block(lines: &[&str], capture: ValueCapture) -> Option<Movie> {
    let mut fields: HashMap<MovieField, String> = HashMap::new();
    for line in lines {
        if let Some((key, value)) = match_pair(line, capture) {
            if let Some(field) = MovieField::from_key(key) {
                // Later lines win over earlier ones for the same key
                fields.insert(field, value);
            }
        }
    }
    Movie::from_field_lookup(|field| fields.remove(&field))
}

/// Lazily parses every block of `text` into movies, dropping blocks that have
/// no title.
pub fn parse_movies(text: &str, capture: ValueCapture) -> impl Iterator<Item = Movie> + '_ {
    split_blocks(text).filter_map(move |block| {
        let movie = parse_block(&block, capture);
        if movie.is_none() {
            debug!("Skipping import block without a Title ({} lines)", block.len());
        }
        movie
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(text: &str, capture: ValueCapture) -> Vec<String> {
        parse_movies(text, capture)
            .map(|m| m.title().to_string())
            .collect()
    }

    #[test]
    fn test_blocks_split_on_blank_runs() {
        let text = "a: 1\nb: 2\n\n\n   \nc: 3\n\t\nd: 4";
        let blocks: Vec<_> = split_blocks(text).collect();
        assert_eq!(blocks, vec![vec!["a: 1", "b: 2"], vec!["c: 3"], vec!["d: 4"]]);
    }

    #[test]
    fn test_blocks_ignore_leading_blank_lines_and_crlf() {
        let text = "\r\n\r\nTitle: Heat\r\nYear: 1995\r\n\r\nTitle: Ran\r\n";
        let blocks: Vec<_> = split_blocks(text).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], vec!["Title: Heat", "Year: 1995"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(parse_movies("", ValueCapture::FirstToken).count(), 0);
        assert_eq!(parse_movies("\n \n\n", ValueCapture::FirstToken).count(), 0);
    }

    #[test]
    fn test_parses_plain_and_json_like_lines() {
        let text = r#"Title: Inception
Year: 2010
"Rated": "PG-13",
  "Director" : "Nolan",
Genre:Action"#;
        let movies: Vec<_> = parse_movies(text, ValueCapture::FirstToken).collect();
        assert_eq!(movies.len(), 1);
        let movie = &movies[0];
        assert_eq!(movie.title(), "Inception");
        assert_eq!(movie.year(), Some("2010"));
        assert_eq!(movie.rated(), Some("PG-13"));
        assert_eq!(movie.director(), Some("Nolan"));
        assert_eq!(movie.genre(), Some("Action"));
        assert_eq!(movie.plot(), None);
    }

    #[test]
    fn test_last_block_without_trailing_blank_line_is_kept() {
        let text = "Title: Heat\nYear: 1995\n\nTitle: Ran\nYear: 1985";
        assert_eq!(titles(text, ValueCapture::FirstToken), vec!["Heat", "Ran"]);
    }

    #[test]
    fn test_block_without_title_is_dropped() {
        let text = "Year: 1999\nPlot: nothing\n\ngarbage line\n\nTitle: Heat\n";
        assert_eq!(titles(text, ValueCapture::FirstToken), vec!["Heat"]);
    }

    #[test]
    fn test_keys_are_case_sensitive_and_unknown_keys_ignored() {
        let text = "title: lower\nimdbID: tt123\nTitle: Upper\nYEAR: 2000";
        let movie = parse_movies(text, ValueCapture::FirstToken).next().unwrap();
        assert_eq!(movie.title(), "Upper");
        assert_eq!(movie.year(), None);
    }

    #[test]
    fn test_first_token_truncates_multi_word_values() {
        let text = "Title: The Dark Knight\nPlot: \"When the menace known as the Joker\"\nActors: Christian Bale, Heath Ledger";
        let movie = parse_movies(text, ValueCapture::FirstToken).next().unwrap();
        assert_eq!(movie.title(), "The");
        assert_eq!(movie.plot(), Some("When"));
        assert_eq!(movie.actors(), Some("Christian"));
    }

    #[test]
    fn test_whole_line_keeps_multi_word_values() {
        let text = "\"Title\": \"The Dark Knight\",\nPlot: A thief: who steals\nActors: Christian Bale, Heath Ledger\nRated:   ";
        let movie = parse_movies(text, ValueCapture::WholeLine).next().unwrap();
        assert_eq!(movie.title(), "The Dark Knight");
        assert_eq!(movie.plot(), Some("A thief: who steals"));
        assert_eq!(movie.actors(), Some("Christian Bale, Heath Ledger"));
        assert_eq!(movie.rated(), None);
    }

    #[test]
    fn test_later_value_overrides_earlier_one() {
        let text = "Title: First\nYear: 2001\nTitle: Second";
        let movie = parse_movies(text, ValueCapture::FirstToken).next().unwrap();
        assert_eq!(movie.title(), "Second");
        assert_eq!(movie.year(), Some("2001"));
    }

    #[test]
    fn test_parsing_is_restartable() {
        let text = "Title: A\n\nTitle: B\n\nTitle: C";
        let first: Vec<_> = parse_movies(text, ValueCapture::FirstToken).collect();
        let second: Vec<_> = parse_movies(text, ValueCapture::FirstToken).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
