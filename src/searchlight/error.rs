use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{}", undefined_option_message(.key, .suggestion.as_deref()))]
    UndefinedOption {
        key: String,
        suggestion: Option<String>,
    },

    #[error("No search target configured for '{class}' or any of its ancestors")]
    MissingTarget { class: String },

    #[error("'{class}' has no accessor called '{name}'")]
    UnknownAccessor { class: String, name: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Target error: {0}")]
    Target(String),

    #[error("Search for '{option}' failed: {message}")]
    SearchMethod { option: String, message: String },

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

fn undefined_option_message(key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(stripped) => format!(
            "No known option called '{}'. Did you just mean '{}'?",
            key, stripped
        ),
        None => format!("No known option called '{}'.", key),
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
