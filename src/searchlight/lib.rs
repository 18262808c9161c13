//! # Searchlight Architecture
//!
//! Searchlight is a small framework for **search objects**: a class declares
//! named search options, binds itself to a query target, and defines one
//! search method per option. An instance is built from raw option values and,
//! on demand, produces a narrowed query by running exactly the search methods
//! whose options carry a real value.
//!
//! Searchlight does not build queries. It decides *which* user-supplied search
//! methods run and *when*; what they do to the query belongs to the target.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Declaration (registry.rs, accessors.rs)                    │
//! │  - SearchClass: options, target binding, search methods     │
//! │  - Inheritance resolved by walking the class chain          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Instance (search.rs, validate.rs)                          │
//! │  - Validates raw options, exposes get / set / is            │
//! │  - Runs search methods once, memoizes the query             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Target (target.rs, adapters/)                              │
//! │  - Supplies the unfiltered query, optional auto searches    │
//! │  - Collection: in-memory reference implementation           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Truth
//!
//! An option *takes part in a search* unless it is blank (`Nil` or a
//! whitespace-only string). An option *reads as true* through `is()` unless it
//! coerces to false (`Nil`, `false`, `0`, `"0"`, `"false"`, blank strings).
//! So `false`, `0` and `"0"` do trigger their search method, yet read as
//! false. See [`predicates`].
//!
//! ## Example
//!
//! ```
//! use searchlight::adapters::collection::Collection;
//! use searchlight::{Search, SearchClass};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let accounts = Collection::new(vec![
//!     json!({"business_name": "Rod's Meat Shack", "paid_amount": 50}),
//!     json!({"business_name": "Bobby's Bakery", "paid_amount": 10}),
//! ])
//! .with_columns(["business_name"]);
//!
//! let class = SearchClass::new("AccountSearch");
//! class
//!     .search_on(Rc::new(accounts))
//!     .searches(["business_name", "paid_amount"]);
//!
//! let mut search = Search::new(&class, [("business_name", "Rod's Meat Shack")])?;
//! assert_eq!(search.results()?.len(), 1);
//! # Ok::<(), searchlight::SearchError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`registry`]: `SearchClass`, the declaration surface
//! - [`accessors`]: generated and hand-written option accessors
//! - [`validate`]: option validation at construction
//! - [`search`]: `Search`, the instance and search runner
//! - [`predicates`]: `is_blank` and `boolean_coerce`
//! - [`value`]: `OptionValue`, the raw value container
//! - [`target`]: the `SearchTarget` collaborator trait
//! - [`adapters`]: ready-made targets
//! - [`config`]: configuration
//! - [`error`]: error types

pub mod accessors;
pub mod adapters;
pub mod config;
pub mod error;
pub mod predicates;
pub mod registry;
pub mod search;
pub mod target;
pub mod validate;
pub mod value;

pub use config::SearchlightConfig;
pub use error::{Result, SearchError};
pub use predicates::{boolean_coerce, is_blank};
pub use registry::SearchClass;
pub use search::{Search, SearchFn};
pub use target::SearchTarget;
pub use value::OptionValue;
