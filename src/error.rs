use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsometricError {
    /// Caller supplied an option the engine does not know, such as an unknown plane type.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid number for '{attribute}': {value:?}")]
    InvalidNumber { attribute: String, value: String },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, IsometricError>;
