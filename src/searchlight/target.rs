//! # Search Targets
//!
//! A search class is bound to a target with `search_on`. The target is the
//! query-producing collaborator: it hands out the initial, unfiltered query
//! object that search methods then narrow. Searchlight never builds queries
//! itself, so anything can be a target: an ORM model, an HTTP query builder,
//! or the in-memory [`crate::adapters::collection::Collection`].

use crate::error::Result;
use crate::search::SearchFn;

/// Abstract interface for query targets.
pub trait SearchTarget {
    /// The query object type search methods narrow.
    type Query;

    /// The initial "all records" query.
    fn all(&self) -> Result<Self::Query>;

    /// A default search method for `option`, used when the search class
    /// defines none for it. Targets that know their own columns can filter
    /// on them without any hand-written search method.
    fn auto_search(&self, _option: &str) -> Option<SearchFn<Self::Query>> {
        None
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Query object that records every narrowing call made on it.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RecordingQuery {
        pub source: String,
        pub called_methods: Vec<String>,
    }

    impl RecordingQuery {
        pub fn call(mut self, method: impl Into<String>) -> Self {
            self.called_methods.push(method.into());
            self
        }
    }

    /// Target producing [`RecordingQuery`] values and counting `all()` calls.
    #[derive(Debug, Default)]
    pub struct MockTarget {
        pub name: String,
        pub all_calls: Cell<usize>,
    }

    impl MockTarget {
        pub fn new(name: impl Into<String>) -> Rc<Self> {
            Rc::new(Self {
                name: name.into(),
                all_calls: Cell::new(0),
            })
        }
    }

    impl SearchTarget for MockTarget {
        type Query = RecordingQuery;

        fn all(&self) -> Result<RecordingQuery> {
            self.all_calls.set(self.all_calls.get() + 1);
            Ok(RecordingQuery {
                source: self.name.clone(),
                called_methods: Vec::new(),
            })
        }
    }
}
