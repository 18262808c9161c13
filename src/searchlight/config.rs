//! # Configuration
//!
//! Searchlight configuration is managed by [`confique`], layering environment
//! variables over an optional TOML file over compiled defaults.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `method_prefix` | `SEARCHLIGHT_METHOD_PREFIX` | `search_` | Naming prefix of search methods |
//! | `suggest_unprefixed` | `SEARCHLIGHT_SUGGEST_UNPREFIXED` | `true` | Suggest the unprefixed name for undefined `search_*` options |
//!
//! The defaults give the canonical behaviour: an unknown option named
//! `search_color` is reported with a hint pointing at `color`.

use crate::error::Result;
use confique::Config;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_METHOD_PREFIX: &str = "search_";

/// Process-wide defaults, shared by every class created without an explicit config.
pub(crate) static DEFAULT_CONFIG: Lazy<SearchlightConfig> = Lazy::new(SearchlightConfig::default);

/// Configuration for searchlight, optionally stored in `searchlight.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchlightConfig {
    /// Prefix joining "search" and an option name in search-method names.
    #[config(env = "SEARCHLIGHT_METHOD_PREFIX", default = "search_")]
    pub method_prefix: String,

    /// Whether an undefined option that starts with the prefix gets a
    /// "Did you just mean" hint.
    #[config(env = "SEARCHLIGHT_SUGGEST_UNPREFIXED", default = true)]
    pub suggest_unprefixed: bool,
}

impl Default for SearchlightConfig {
    fn default() -> Self {
        Self {
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
            suggest_unprefixed: true,
        }
    }
}

impl SearchlightConfig {
    /// Load configuration: env vars, then the TOML file (if given), then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Search-method name for an option, e.g. `search_bits`.
    pub fn method_name(&self, option: &str) -> String {
        format!("{}{}", self.method_prefix, option)
    }

    /// The option name a mistyped key probably meant, if any.
    ///
    /// Purely textual: the stripped name is not checked against any registry.
    pub fn suggestion_for(&self, key: &str) -> Option<String> {
        if !self.suggest_unprefixed || self.method_prefix.is_empty() {
            return None;
        }
        key.strip_prefix(self.method_prefix.as_str())
            .map(str::to_string)
    }
}
