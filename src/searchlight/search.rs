//! # Search Instances
//!
//! A [`Search`] is one use of a search class: a set of option values plus the
//! query built from them.
//!
//! ## Lifecycle
//!
//! 1. **Construction** validates the supplied options against the class
//!    (see [`crate::validate`]) and assigns them through their setters.
//! 2. **First `results()` call** runs the search:
//!    - start a fresh running query: a copy of the one given to
//!      [`Search::set_query`], else the target's unfiltered query;
//!    - for each declared option, in declared order, find its search method
//!      (nearest explicit definition, else the target's auto search);
//!    - invoke it only if the option's value is not blank;
//!    - move the finished query into the results slot.
//! 3. **Later `results()` calls** return the results slot without running
//!    anything again.
//!
//! Search methods narrow the running query through [`Search::query`] or
//! [`Search::replace_query`]. What "narrowing" means is up to the target.
//!
//! The running query and the results are separate slots. The results slot is
//! written once, by a successful run; touching the running query afterwards
//! never changes it. A failed run drops its running query and leaves the
//! instance un-run, so a retry starts again from the starting query.
//!
//! ## Threading
//!
//! Instances are single-threaded and `!Send`. The results slot is not guarded,
//! so sharing one instance across threads is not supported.

use crate::accessors::Resolved;
use crate::error::{Result, SearchError};
use crate::predicates::{boolean_coerce, is_blank};
use crate::registry::SearchClass;
use crate::target::SearchTarget;
use crate::validate;
use crate::value::OptionValue;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// A search method: narrows the running query using the instance's options.
pub type SearchFn<Q> = Rc<dyn Fn(&mut Search<Q>) -> Result<()>>;

/// Produces the starting query given to [`Search::set_query`].
type StartFn<Q> = Rc<dyn Fn() -> Q>;

pub struct Search<Q> {
    class: Rc<SearchClass<Q>>,
    values: HashMap<String, OptionValue>,
    start: Option<StartFn<Q>>,
    query: Option<Q>,
    results: Option<Q>,
}

impl<Q: 'static> Search<Q> {
    /// Build a search from raw options.
    ///
    /// Fails with [`SearchError::UndefinedOption`] on the first key the class
    /// does not declare.
    pub fn new<I, K, V>(class: &Rc<SearchClass<Q>>, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        let mut search = Self::blank(class);
        validate::assign_options(&mut search, options)?;
        Ok(search)
    }

    /// A search with no options assigned.
    pub fn blank(class: &Rc<SearchClass<Q>>) -> Self {
        Self {
            class: Rc::clone(class),
            values: HashMap::new(),
            start: None,
            query: None,
            results: None,
        }
    }

    /// Build a search from a JSON object of options (e.g. decoded request params).
    pub fn from_json(class: &Rc<SearchClass<Q>>, params: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(entries) = params else {
            return Err(SearchError::InvalidOptions(format!(
                "expected a JSON object, got {}",
                params
            )));
        };
        Self::new(
            class,
            entries
                .iter()
                .map(|(key, value)| (key.clone(), OptionValue::from(value.clone()))),
        )
    }

    pub fn class(&self) -> &Rc<SearchClass<Q>> {
        &self.class
    }

    // --- Accessors ---

    /// Read an option through its getter.
    pub fn get(&self, option: &str) -> Result<OptionValue> {
        match self.class.resolve_getter(option) {
            Some(Resolved::Custom(getter)) => getter(self),
            Some(Resolved::Generated) => Ok(self.read_raw(option).cloned().unwrap_or_default()),
            None => Err(self.unknown_accessor(option)),
        }
    }

    /// Write an option through its setter.
    pub fn set(&mut self, option: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        match self.class.resolve_setter(option) {
            Some(Resolved::Custom(setter)) => setter(&mut *self, value),
            Some(Resolved::Generated) => {
                self.write_raw(option, value);
                Ok(())
            }
            None => Err(self.unknown_accessor(option)),
        }
    }

    /// Boolean query for an option: its getter's value, coerced.
    pub fn is(&self, option: &str) -> Result<bool> {
        match self.class.resolve_predicate(option) {
            Some(Resolved::Custom(predicate)) => predicate(self),
            Some(Resolved::Generated) => Ok(boolean_coerce(&self.get(option)?)),
            None => Err(self.unknown_accessor(option)),
        }
    }

    /// The raw stored value, bypassing accessors.
    pub fn read_raw(&self, option: &str) -> Option<&OptionValue> {
        self.values.get(option)
    }

    /// Store a raw value, bypassing accessors. Meant for hand-written setters.
    pub fn write_raw(&mut self, option: &str, value: impl Into<OptionValue>) {
        self.values.insert(option.to_string(), value.into());
    }

    /// Declared options that currently hold a non-blank value, in declared order.
    pub fn options(&self) -> Result<Vec<(String, OptionValue)>> {
        let mut present = Vec::new();
        for option in self.class.declared_options() {
            let value = self.get(&option)?;
            if !is_blank(&value) {
                present.push((option, value));
            }
        }
        Ok(present)
    }

    fn unknown_accessor(&self, name: &str) -> SearchError {
        SearchError::UnknownAccessor {
            class: self.class.name().to_string(),
            name: name.to_string(),
        }
    }

    // --- Query ---

    /// The running query, started on first access.
    ///
    /// Never the cached results: after a run this is a new running query.
    pub fn query(&mut self) -> Result<&mut Q> {
        let query = match self.query.take() {
            Some(query) => query,
            None => self.starting_query()?,
        };
        Ok(self.query.insert(query))
    }

    /// Use `query` instead of the target's unfiltered query as the starting
    /// point of every run. Results already computed are kept.
    pub fn set_query(&mut self, query: Q)
    where
        Q: Clone,
    {
        self.start = Some(Rc::new(move || query.clone()));
        self.query = None;
    }

    /// Replace the running query with `f(query)`. For consuming query builders.
    pub fn replace_query<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(Q) -> Q,
    {
        let current = match self.query.take() {
            Some(query) => query,
            None => self.starting_query()?,
        };
        self.query = Some(f(current));
        Ok(())
    }

    fn starting_query(&self) -> Result<Q> {
        match &self.start {
            Some(start) => Ok(start()),
            None => self.class.search_target()?.all(),
        }
    }

    // --- Execution ---

    /// Names of the search methods explicitly defined for this instance's
    /// class and its ancestors, unique, e.g. `search_bits`.
    ///
    /// Auto searches supplied by the target are not listed: they belong to the
    /// target, and the class may not have one bound yet. They still run for
    /// declared options without an explicit method.
    pub fn search_methods(&self) -> Vec<String> {
        let config = self.class.config();
        self.class
            .searched_options()
            .iter()
            .map(|option| config.method_name(option))
            .collect()
    }

    /// The narrowed query, computed on the first call and cached afterwards.
    pub fn results(&mut self) -> Result<&Q> {
        let results = match self.results.take() {
            Some(cached) => {
                debug!(class = %self.class.name(), "returning cached search results");
                cached
            }
            None => self.run()?,
        };
        let results: &Q = self.results.insert(results);
        Ok(results)
    }

    pub fn has_run(&self) -> bool {
        self.results.is_some()
    }

    fn run(&mut self) -> Result<Q> {
        let target = self.class.search_target()?;
        let start = match &self.start {
            Some(start) => start(),
            None => target.all()?,
        };
        self.query = Some(start);

        if let Err(err) = self.apply_searches(&*target) {
            self.query = None;
            return Err(err);
        }

        match self.query.take() {
            Some(query) => Ok(query),
            None => self.starting_query(),
        }
    }

    fn apply_searches(&mut self, target: &dyn SearchTarget<Query = Q>) -> Result<()> {
        for (option, method) in self.plan(target) {
            if is_blank(&self.get(&option)?) {
                debug!(class = %self.class.name(), option = %option, "skipping blank search option");
                continue;
            }
            trace!(class = %self.class.name(), option = %option, "running search method");
            method(&mut *self)?;
        }
        Ok(())
    }

    /// Search methods to consider, in declared-option order.
    fn plan(&self, target: &dyn SearchTarget<Query = Q>) -> Vec<(String, SearchFn<Q>)> {
        let declared = self.class.declared_options();

        for option in self.class.searched_options() {
            if !declared.contains(&option) {
                warn!(
                    class = %self.class.name(),
                    method = %self.class.config().method_name(&option),
                    "search method has no declared option and will never run"
                );
            }
        }

        declared
            .into_iter()
            .filter_map(|option| {
                let method = self
                    .class
                    .find_search(&option)
                    .or_else(|| target.auto_search(&option))?;
                Some((option, method))
            })
            .collect()
    }
}

impl<Q: fmt::Debug> fmt::Debug for Search<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("class", &self.class.name())
            .field("values", &self.values)
            .field("custom_start", &self.start.is_some())
            .field("query", &self.query)
            .field("results", &self.results)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::fixtures::{MockTarget, RecordingQuery};
    use std::cell::{Cell, RefCell};

    type Class = SearchClass<RecordingQuery>;

    fn tiny_class(calls: &Rc<RefCell<Vec<String>>>) -> Rc<Class> {
        let class = Class::new("TinyBs");
        class.search_on(MockTarget::new("Object"));
        class.searches(["bits", "bats", "bots"]);
        for option in ["bits", "bats", "bots"] {
            let calls = Rc::clone(calls);
            class.define_search(option, move |_| {
                calls.borrow_mut().push(option.to_string());
                Ok(())
            });
        }
        class
    }

    #[test]
    fn mass_assigns_provided_options() {
        let class = Class::new("ExampleSearch");
        class.searches(["beak_color"]);
        let search = Search::new(&class, [("beak_color", "mauve")]).unwrap();
        assert_eq!(search.get("beak_color").unwrap(), OptionValue::from("mauve"));
    }

    #[test]
    fn unsupplied_options_read_as_nil() {
        let class = Class::new("ExampleSearch");
        class.searches(["a", "b"]);
        let search = Search::new(&class, [("a", 1)]).unwrap();
        assert_eq!(search.get("b").unwrap(), OptionValue::Nil);
    }

    #[test]
    fn generated_accessors_exist_for_each_option() {
        let class = Class::new("ExampleSearch");
        class.searches(["foo"]);
        class.searches(["bar"]);
        class.searches(["stuff"]);
        let mut search = Search::blank(&class);

        assert!(search.get("foo").is_ok());
        assert!(search.set("foo", "x").is_ok());
        assert!(search.is("foo").unwrap());
        assert!(matches!(
            search.get("nope"),
            Err(SearchError::UnknownAccessor { .. })
        ));
    }

    #[test]
    fn hand_written_accessors_win() {
        let class = Class::new("ExampleSearch");
        class.searches(["name"]);
        class.define_setter("name", |s, value| {
            let trimmed = value.as_str().map(|v| v.trim().to_string());
            s.write_raw("name", trimmed);
            Ok(())
        });
        class.define_predicate("name", |_| Ok(false));

        let search = Search::new(&class, [("name", "  Rod  ")]).unwrap();
        assert_eq!(search.get("name").unwrap(), OptionValue::from("Rod"));
        assert!(!search.is("name").unwrap());
    }

    #[test]
    fn generated_predicate_uses_the_resolved_getter() {
        let class = Class::new("ExampleSearch");
        class.searches(["flag"]);
        class.define_getter("flag", |_| Ok(OptionValue::from("false")));
        let search = Search::new(&class, [("flag", "yes")]).unwrap();
        assert!(!search.is("flag").unwrap());
    }

    #[test]
    fn only_runs_search_methods_with_real_values() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let class = tiny_class(&calls);
        let mut search = Search::new(
            &class,
            [
                ("bits", OptionValue::from(" ")),
                ("bats", OptionValue::Nil),
                ("bots", OptionValue::from(false)),
            ],
        )
        .unwrap();

        search.run().unwrap();
        assert_eq!(*calls.borrow(), vec!["bots"]);
    }

    #[test]
    fn runs_in_declared_order_not_definition_order() {
        let class = Class::new("OrderSearch");
        class.search_on(MockTarget::new("Model"));
        class.searches(["first", "second"]);
        class.define_search("second", |s| s.replace_query(|q| q.call("second")));
        class.define_search("first", |s| s.replace_query(|q| q.call("first")));

        let mut search = Search::new(&class, [("second", 2), ("first", 1)]).unwrap();
        assert_eq!(search.results().unwrap().called_methods, vec!["first", "second"]);
    }

    #[test]
    fn results_are_memoized() {
        let target = MockTarget::new("Model");
        let class = Class::new("AccountSearch");
        class.search_on(Rc::clone(&target));
        class.searches(["paid_amount"]);
        class.define_search("paid_amount", |s| {
            s.query()?.called_methods.push("where".into());
            Ok(())
        });

        let mut search = Search::new(&class, [("paid_amount", 50)]).unwrap();
        assert!(!search.has_run());
        let first = search.results().unwrap().clone();
        let second = search.results().unwrap().clone();

        assert!(search.has_run());
        assert_eq!(first, second);
        assert_eq!(first.called_methods, vec!["where"]);
        assert_eq!(target.all_calls.get(), 1);
    }

    #[test]
    fn missing_target_fails_at_run_not_construction() {
        let class = Class::new("Unbound");
        class.searches(["a"]);
        let mut search = Search::new(&class, [("a", 1)]).unwrap();
        assert!(matches!(
            search.results(),
            Err(SearchError::MissingTarget { .. })
        ));
        assert!(!search.has_run());
    }

    #[test]
    fn failing_search_method_aborts_the_run() {
        let class = Class::new("Broken");
        class.search_on(MockTarget::new("Model"));
        class.searches(["a"]);
        class.define_search("a", |_| {
            Err(SearchError::SearchMethod {
                option: "a".into(),
                message: "boom".into(),
            })
        });

        let mut search = Search::new(&class, [("a", 1)]).unwrap();
        assert!(search.results().is_err());
        assert!(!search.has_run());
    }

    #[test]
    fn cached_results_survive_later_query_changes() {
        let class = Class::new("AccountSearch");
        class.search_on(MockTarget::new("Model"));
        class.searches(["paid_amount"]);
        class.define_search("paid_amount", |s| s.replace_query(|q| q.call("where")));

        let mut search = Search::new(&class, [("paid_amount", 50)]).unwrap();
        let first = search.results().unwrap().clone();

        search.set_query(RecordingQuery::default().call("other"));
        search.query().unwrap().called_methods.push("joins".into());
        search.replace_query(|q| q.call("having")).unwrap();

        let second = search.results().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(second.called_methods, vec!["where"]);
        assert_eq!(search.query().unwrap().called_methods, vec!["other", "joins", "having"]);
    }

    #[test]
    fn failing_getter_mid_run_lets_a_retry_start_over() {
        let class = Class::new("Flaky");
        class.search_on(MockTarget::new("Model"));
        class.searches(["a", "b"]);
        for option in ["a", "b"] {
            class.define_search(option, move |s| s.replace_query(|q| q.call(option)));
        }
        let failed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&failed);
        class.define_getter("b", move |s| {
            if !seen.replace(true) {
                return Err(SearchError::SearchMethod {
                    option: "b".into(),
                    message: "not ready".into(),
                });
            }
            Ok(s.read_raw("b").cloned().unwrap_or_default())
        });

        let mut search = Search::new(&class, [("a", 1), ("b", 2)]).unwrap();
        assert!(search.results().is_err());
        assert!(failed.get());
        assert!(!search.has_run());

        assert_eq!(search.results().unwrap().called_methods, vec!["a", "b"]);
    }

    #[test]
    fn failed_run_keeps_the_preset_starting_query() {
        let class = Class::new("Flaky");
        class.search_on(MockTarget::new("Model"));
        class.searches(["a"]);
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        class.define_search("a", move |s| {
            counter.set(counter.get() + 1);
            s.replace_query(|q| q.call("a"))?;
            if counter.get() == 1 {
                return Err(SearchError::SearchMethod {
                    option: "a".into(),
                    message: "boom".into(),
                });
            }
            Ok(())
        });

        let mut search = Search::new(&class, [("a", 1)]).unwrap();
        search.set_query(RecordingQuery::default().call("scoped"));
        assert!(search.results().is_err());

        assert_eq!(search.results().unwrap().called_methods, vec!["scoped", "a"]);
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn query_starts_as_the_target_query() {
        let class = Class::new("AccountSearch");
        class.search_on(MockTarget::new("MockModel"));
        let mut search = Search::blank(&class);
        assert_eq!(search.query().unwrap().source, "MockModel");
        assert!(search.query().unwrap().called_methods.is_empty());
    }

    #[test]
    fn preset_query_is_used_as_starting_point() {
        let target = MockTarget::new("Model");
        let class = Class::new("Scoped");
        class.search_on(Rc::clone(&target));
        let mut search = Search::blank(&class);
        search.set_query(RecordingQuery::default().call("scoped"));

        assert_eq!(search.results().unwrap().called_methods, vec!["scoped"]);
        assert_eq!(target.all_calls.get(), 0);
    }

    #[test]
    fn search_methods_are_unique_names() {
        let class = Class::new("ExampleSearch");
        class.define_search("bees", |_| Ok(()));
        class.define_search("bats", |_| Ok(()));
        class.define_search("bees", |_| Ok(()));

        let mut names = Search::blank(&class).search_methods();
        names.sort();
        assert_eq!(names, vec!["search_bats", "search_bees"]);
    }

    #[test]
    fn undeclared_search_methods_never_run() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let class = Class::new("ExampleSearch");
        class.search_on(MockTarget::new("Model"));
        let recorded = Rc::clone(&calls);
        class.define_search("ghost", move |_| {
            recorded.borrow_mut().push("ghost");
            Ok(())
        });

        Search::blank(&class).results().unwrap();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn options_lists_non_blank_values_in_declared_order() {
        let class = Class::new("ExampleSearch");
        class.searches(["a", "b", "c", "d"]);
        let search = Search::new(
            &class,
            [
                ("d", OptionValue::from(0)),
                ("b", OptionValue::from(" ")),
                ("a", OptionValue::from("x")),
            ],
        )
        .unwrap();

        assert_eq!(
            search.options().unwrap(),
            vec![
                ("a".to_string(), OptionValue::from("x")),
                ("d".to_string(), OptionValue::from(0)),
            ]
        );
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let class = Class::new("ExampleSearch");
        let err = Search::from_json(&class, &serde_json::json!([1, 2])).err().unwrap();
        assert!(matches!(err, SearchError::InvalidOptions(_)));
    }

    #[test]
    fn from_json_assigns_values() {
        let class = Class::new("ExampleSearch");
        class.searches(["paid_amount", "business_name"]);
        let search = Search::from_json(
            &class,
            &serde_json::json!({"paid_amount": 50, "business_name": "Rod's Meat Shack"}),
        )
        .unwrap();
        assert_eq!(search.get("paid_amount").unwrap(), OptionValue::Int(50));
    }
}
