//! Option validation at construction time.
//!
//! Supplied keys are checked against the class's effective declared options
//! in the order given. Valid entries go through the option's setter (so a
//! hand-written setter sees them); the first unknown key aborts construction
//! with [`SearchError::UndefinedOption`]. Keys after it are not looked at.

use crate::config::SearchlightConfig;
use crate::error::{Result, SearchError};
use crate::search::Search;
use crate::value::OptionValue;

pub(crate) fn assign_options<Q, I, K, V>(search: &mut Search<Q>, options: I) -> Result<()>
where
    Q: 'static,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<OptionValue>,
{
    for (key, value) in options {
        let key = key.into();
        if !search.class().declares(&key) {
            return Err(undefined_option(search.class().config(), key));
        }
        search.set(&key, value)?;
    }
    Ok(())
}

/// Build the error for an undeclared key, with a hint if the key carries
/// the search-method prefix.
pub fn undefined_option(config: &SearchlightConfig, key: String) -> SearchError {
    let suggestion = config.suggestion_for(&key);
    SearchError::UndefinedOption { key, suggestion }
}
