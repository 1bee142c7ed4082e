use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatemapError {
    #[error("Dataset load error: {0}")]
    DataLoad(String),

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("No record matches '{0}'")]
    StaleFocus(String),

    #[error("Name '{0}' matches {1} records; use the record id instead")]
    AmbiguousName(String, usize),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
