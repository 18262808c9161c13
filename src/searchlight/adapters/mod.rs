//! Ready-made search targets.
//!
//! - [`collection`]: filter an in-memory `Vec` of records. Handy for tests,
//!   fixtures, and small datasets that never touch a database.

pub mod collection;
