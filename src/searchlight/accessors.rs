//! # Option Accessors
//!
//! Every declared option gets three accessors: a getter, a setter and a
//! boolean query. Generated accessors are plain: the getter reads the raw
//! slot, the setter writes it, the query coerces the getter's result with
//! [`boolean_coerce`](crate::predicates::boolean_coerce).
//!
//! Each class owns exactly one [`AccessorNamespace`] for the accessors
//! generated from its own declarations, and a set of hand-written
//! [`Overrides`]. Lookup walks from the instance's class to the root; at each
//! class a hand-written accessor beats that class's generated one.

use crate::error::Result;
use crate::search::Search;
use crate::value::OptionValue;
use std::collections::HashMap;
use std::rc::Rc;

pub type Getter<Q> = Rc<dyn Fn(&Search<Q>) -> Result<OptionValue>>;
pub type Setter<Q> = Rc<dyn Fn(&mut Search<Q>, OptionValue) -> Result<()>>;
pub type Predicate<Q> = Rc<dyn Fn(&Search<Q>) -> Result<bool>>;

/// The generated accessor namespace of one class.
///
/// Declaring a new option amends this namespace. Previously generated
/// accessors are left untouched and a name is never generated twice.
#[derive(Debug, Clone, Default)]
pub struct AccessorNamespace {
    label: String,
    names: Vec<String>,
}

impl AccessorNamespace {
    pub(crate) fn new(class: &str) -> Self {
        Self {
            label: format!("SearchlightAccessors({})", class),
            names: Vec::new(),
        }
    }

    /// Generate the accessor triple for `option`. Returns false if it already existed.
    pub(crate) fn generate(&mut self, option: &str) -> bool {
        if self.contains(option) {
            return false;
        }
        self.names.push(option.to_string());
        true
    }

    pub fn contains(&self, option: &str) -> bool {
        self.names.iter().any(|n| n == option)
    }

    /// Option names with generated accessors, in generation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Hand-written accessors defined directly on a class.
pub struct Overrides<Q> {
    pub(crate) getters: HashMap<String, Getter<Q>>,
    pub(crate) setters: HashMap<String, Setter<Q>>,
    pub(crate) predicates: HashMap<String, Predicate<Q>>,
}

impl<Q> Default for Overrides<Q> {
    fn default() -> Self {
        Self {
            getters: HashMap::new(),
            setters: HashMap::new(),
            predicates: HashMap::new(),
        }
    }
}

/// Outcome of an accessor lookup.
pub(crate) enum Resolved<F> {
    /// A hand-written accessor.
    Custom(F),
    /// The generated accessor.
    Generated,
}
