use thiserror::Error;

pub type Result<T> = std::result::Result<T, JsonFaultError>;

#[derive(Debug, Error)]
pub enum JsonFaultError {
    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },
}

impl JsonFaultError {
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Failures raised while writing an error page
#[derive(Debug, Error)]
pub enum RenderError {
    /// The target writer rejected the page
    #[error("Failed to write error page: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered page was not valid UTF-8
    #[error("Error page is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
