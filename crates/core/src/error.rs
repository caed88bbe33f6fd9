use thiserror::Error;

pub type MailreachResult<T> = Result<T, MailreachError>;

#[derive(Error, Debug)]
pub enum MailreachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contacts API error (status {status}): {message}")]
    ContactsApi { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Invalid contact record: {0}")]
    InvalidRecord(String),

    #[error("Segmentation error: {0}")]
    Segmentation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for MailreachError {
    fn from(err: config::ConfigError) -> Self {
        MailreachError::Config(err.to_string())
    }
}
