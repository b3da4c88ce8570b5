//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestCatalog, INCEPTION_TWICE};
//!
//! #[test]
//! fn test_import() {
//!     let catalog = TestCatalog::new();
//!     let summary = catalog.service.import_from_text(INCEPTION_TWICE).unwrap();
//!     assert_eq!(summary.added, 1);
//! }
//! ```

#![allow(dead_code, unused_imports)]

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{fields, FailingStore, FakeFetcher, TestCatalog};
pub use server::{StubOmdbServer, StubResponse};
