mod model;

pub use model::{Movie, MovieField, MovieKey};
