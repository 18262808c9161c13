//! In-memory collection target.
//!
//! [`Collection`] wraps a `Vec` of records and hands out [`Relation`]s: a
//! lazily narrowed view over those records plus a log of the clauses applied.
//! Columns declared with [`Collection::with_columns`] get an automatic
//! equality search, so a search class over a collection only needs
//! hand-written search methods for the options that are not plain matches.
//!
//! ```ignore
//! let accounts = Collection::new(rows).with_columns(["business_name"]);
//! let class = SearchClass::new("AccountSearch");
//! class.search_on(Rc::new(accounts)).searches(["business_name", "paid_amount"]);
//! class.define_search("paid_amount", |s| {
//!     let min = s.get("paid_amount")?.as_f64().unwrap_or_default();
//!     s.replace_query(|q| q.filter(format!("paid_amount >= {}", min), move |r| ...))
//! });
//! ```

use crate::error::Result;
use crate::search::{Search, SearchFn};
use crate::target::SearchTarget;
use crate::value::OptionValue;
use std::rc::Rc;

/// A record that can be filtered by field name.
pub trait Record: Clone {
    /// The value of `name`, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<OptionValue>;
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<OptionValue> {
        self.get(name).cloned().map(OptionValue::from)
    }
}

#[derive(Debug, Clone)]
pub struct Collection<T> {
    records: Vec<T>,
    columns: Vec<String>,
}

impl<T: Record> Collection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            columns: Vec::new(),
        }
    }

    /// Declare the columns that get an automatic equality search.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}

impl<T: Record + 'static> SearchTarget for Collection<T> {
    type Query = Relation<T>;

    fn all(&self) -> Result<Relation<T>> {
        Ok(Relation::new(self.records.clone()))
    }

    fn auto_search(&self, option: &str) -> Option<SearchFn<Relation<T>>> {
        if !self.columns.iter().any(|c| c == option) {
            return None;
        }
        let column = option.to_string();
        let method: SearchFn<Relation<T>> = Rc::new(move |search: &mut Search<Relation<T>>| {
            let value = search.get(&column)?;
            search.replace_query(|query| query.where_eq(&column, value))
        });
        Some(method)
    }
}

/// A narrowed view over a collection's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation<T> {
    records: Vec<T>,
    clauses: Vec<String>,
}

impl<T: Record> Relation<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            clauses: Vec::new(),
        }
    }

    /// Keep records whose `field` equals `value`. A list value matches any of
    /// its elements.
    pub fn where_eq(self, field: &str, value: impl Into<OptionValue>) -> Self {
        let value = value.into();
        let description = format!("{} = {}", field, value);
        let field = field.to_string();
        self.filter(description, move |record| match record.field(&field) {
            Some(actual) => matches_value(&actual, &value),
            None => false,
        })
    }

    /// Keep records satisfying `predicate`, logging `description` as a clause.
    pub fn filter<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        self.records.retain(|record| predicate(record));
        self.clauses.push(description.into());
        self
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Descriptions of the clauses applied so far, in order.
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

fn matches_value(actual: &OptionValue, expected: &OptionValue) -> bool {
    match expected {
        OptionValue::List(choices) => choices.iter().any(|choice| values_equal(actual, choice)),
        _ => values_equal(actual, expected),
    }
}

fn values_equal(a: &OptionValue, b: &OptionValue) -> bool {
    match (a, b) {
        // Allow comparing Int with Float by numeric value
        (OptionValue::Int(_) | OptionValue::Float(_), OptionValue::Int(_) | OptionValue::Float(_)) => {
            a.as_f64() == b.as_f64()
        }
        _ => a == b,
    }
}
