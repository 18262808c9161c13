//! # Option Registry
//!
//! [`SearchClass`] is the class-level half of a search object: the declared
//! options, the bound target, the search methods, and the accessors. Classes
//! form a single-inheritance chain via [`SearchClass::subclass`].
//!
//! ## Inheritance
//!
//! Nothing is copied when a subclass is created. Every lookup walks the chain
//! at call time:
//!
//! - `declared_options()` is the parent's effective set followed by the
//!   class's own additions. A subclass can extend its parent's options but
//!   never shrink them, and its additions are invisible to the parent.
//! - `search_target()` returns the nearest binding walking up. Rebinding an
//!   ancestor later is visible to every descendant without its own binding.
//! - Search methods and hand-written accessors resolve to the nearest class
//!   that defines them.
//!
//! ## Interior Mutability
//!
//! Declarations mutate the class through `&self`, backed by `RefCell`.
//! Searchlight is single-threaded; `Rc` and `RefCell` keep both classes and
//! instances `!Send`, so sharing them across threads does not compile.

use crate::accessors::{AccessorNamespace, Getter, Overrides, Predicate, Resolved, Setter};
use crate::config::{SearchlightConfig, DEFAULT_CONFIG};
use crate::error::{Result, SearchError};
use crate::search::{Search, SearchFn};
use crate::target::SearchTarget;
use crate::value::OptionValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub struct SearchClass<Q> {
    name: String,
    parent: Option<Rc<SearchClass<Q>>>,
    config: SearchlightConfig,
    options: RefCell<Vec<String>>,
    target: RefCell<Option<Rc<dyn SearchTarget<Query = Q>>>>,
    methods: RefCell<Vec<(String, SearchFn<Q>)>>,
    accessors: RefCell<AccessorNamespace>,
    overrides: RefCell<Overrides<Q>>,
}

impl<Q> SearchClass<Q> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<Self>> {
        self.parent.as_ref()
    }

    pub fn config(&self) -> &SearchlightConfig {
        &self.config
    }
}

impl<Q: 'static> SearchClass<Q> {
    /// Create a root search class using the default configuration.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_config(name, DEFAULT_CONFIG.clone())
    }

    pub fn with_config(name: impl Into<String>, config: SearchlightConfig) -> Rc<Self> {
        Rc::new(Self::build(name.into(), None, config))
    }

    /// Create a subclass. It inherits the parent's configuration.
    pub fn subclass(parent: &Rc<Self>, name: impl Into<String>) -> Rc<Self> {
        let config = parent.config.clone();
        Rc::new(Self::build(name.into(), Some(Rc::clone(parent)), config))
    }

    fn build(name: String, parent: Option<Rc<Self>>, config: SearchlightConfig) -> Self {
        Self {
            accessors: RefCell::new(AccessorNamespace::new(&name)),
            name,
            parent,
            config,
            options: RefCell::new(Vec::new()),
            target: RefCell::new(None),
            methods: RefCell::new(Vec::new()),
            overrides: RefCell::new(Overrides::default()),
        }
    }

    /// This class followed by its ancestors, nearest first.
    pub(crate) fn lineage(&self) -> impl Iterator<Item = &SearchClass<Q>> {
        std::iter::successors(Some(self), |class| class.parent.as_deref())
    }

    // --- Options ---

    /// Declare one or more options.
    pub fn searches<I, S>(&self, names: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.declare_option(name);
        }
        self
    }

    /// Declare a single option and generate its accessors.
    ///
    /// Returns false if this class already declared it.
    pub fn declare_option(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let mut options = self.options.borrow_mut();
        if options.contains(&name) {
            return false;
        }
        self.accessors.borrow_mut().generate(&name);
        debug!(class = %self.name, option = %name, "declared search option");
        options.push(name);
        true
    }

    /// Every option visible to this class: ancestors' first, then its own.
    pub fn declared_options(&self) -> Vec<String> {
        let mut all = match &self.parent {
            Some(parent) => parent.declared_options(),
            None => Vec::new(),
        };
        for name in self.options.borrow().iter() {
            if !all.contains(name) {
                all.push(name.clone());
            }
        }
        all
    }

    pub fn declares(&self, name: &str) -> bool {
        self.lineage()
            .any(|class| class.options.borrow().iter().any(|o| o == name))
    }

    /// Snapshot of this class's own generated accessor namespace.
    pub fn generated_accessors(&self) -> AccessorNamespace {
        self.accessors.borrow().clone()
    }

    // --- Target ---

    /// Bind (or rebind) the query target of this class.
    ///
    /// Ancestors are unaffected; descendants without their own binding see it.
    pub fn search_on<T>(&self, target: Rc<T>) -> &Self
    where
        T: SearchTarget<Query = Q> + 'static,
    {
        debug!(class = %self.name, "bound search target");
        *self.target.borrow_mut() = Some(target);
        self
    }

    /// The nearest bound target walking up the chain.
    pub fn search_target(&self) -> Result<Rc<dyn SearchTarget<Query = Q>>> {
        self.lineage()
            .find_map(|class| class.target.borrow().clone())
            .ok_or_else(|| SearchError::MissingTarget {
                class: self.name.clone(),
            })
    }

    pub fn has_own_target(&self) -> bool {
        self.target.borrow().is_some()
    }

    // --- Search methods ---

    /// Register the search method for `option`.
    ///
    /// Defining the same option twice on one class replaces the first
    /// definition. The method only runs when the option is declared and its
    /// value is not blank.
    pub fn define_search<F>(&self, option: impl Into<String>, method: F) -> &Self
    where
        F: Fn(&mut Search<Q>) -> Result<()> + 'static,
    {
        let option = option.into();
        let method: SearchFn<Q> = Rc::new(method);
        let mut methods = self.methods.borrow_mut();
        match methods.iter_mut().find(|(name, _)| *name == option) {
            Some(entry) => entry.1 = method,
            None => methods.push((option, method)),
        }
        self
    }

    /// Options with an explicit search method anywhere in the chain, unique,
    /// root class first and then definition order.
    pub(crate) fn searched_options(&self) -> Vec<String> {
        let mut chain: Vec<&SearchClass<Q>> = self.lineage().collect();
        chain.reverse();

        let mut names: Vec<String> = Vec::new();
        for class in chain {
            for (name, _) in class.methods.borrow().iter() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// The nearest explicit search method for `option`.
    pub(crate) fn find_search(&self, option: &str) -> Option<SearchFn<Q>> {
        self.lineage().find_map(|class| {
            class
                .methods
                .borrow()
                .iter()
                .find(|(name, _)| name == option)
                .map(|(_, method)| Rc::clone(method))
        })
    }

    // --- Hand-written accessors ---

    pub fn define_getter<F>(&self, option: impl Into<String>, getter: F) -> &Self
    where
        F: Fn(&Search<Q>) -> Result<OptionValue> + 'static,
    {
        self.overrides
            .borrow_mut()
            .getters
            .insert(option.into(), Rc::new(getter));
        self
    }

    pub fn define_setter<F>(&self, option: impl Into<String>, setter: F) -> &Self
    where
        F: Fn(&mut Search<Q>, OptionValue) -> Result<()> + 'static,
    {
        self.overrides
            .borrow_mut()
            .setters
            .insert(option.into(), Rc::new(setter));
        self
    }

    pub fn define_predicate<F>(&self, option: impl Into<String>, predicate: F) -> &Self
    where
        F: Fn(&Search<Q>) -> Result<bool> + 'static,
    {
        self.overrides
            .borrow_mut()
            .predicates
            .insert(option.into(), Rc::new(predicate));
        self
    }

    pub(crate) fn resolve_getter(&self, name: &str) -> Option<Resolved<Getter<Q>>> {
        self.resolve(name, |overrides| &overrides.getters)
    }

    pub(crate) fn resolve_setter(&self, name: &str) -> Option<Resolved<Setter<Q>>> {
        self.resolve(name, |overrides| &overrides.setters)
    }

    pub(crate) fn resolve_predicate(&self, name: &str) -> Option<Resolved<Predicate<Q>>> {
        self.resolve(name, |overrides| &overrides.predicates)
    }

    fn resolve<F, P>(&self, name: &str, pick: P) -> Option<Resolved<Rc<F>>>
    where
        F: ?Sized,
        P: Fn(&Overrides<Q>) -> &HashMap<String, Rc<F>>,
    {
        for class in self.lineage() {
            if let Some(custom) = pick(&*class.overrides.borrow()).get(name) {
                return Some(Resolved::Custom(Rc::clone(custom)));
            }
            if class.accessors.borrow().contains(name) {
                return Some(Resolved::Generated);
            }
        }
        None
    }
}

impl<Q> fmt::Debug for SearchClass<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
            .field("options", &self.options.borrow())
            .field("has_target", &self.target.borrow().is_some())
            .finish()
    }
}
