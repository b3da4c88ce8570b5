mod parser;

pub use parser::{parse_block, parse_movies, split_blocks, Blocks, ValueCapture};
