use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SWError {
    #[error("Install failed: {0}")]
    InstallFailed(String),
    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),
    #[error("HTTP transport error: {0}")]
    HttpTransportError(String),
    #[error("Cache storage error: {0}")]
    CacheStorageError(String),
    #[error("Cache location does not exist: {0}")]
    CacheLocationDoesNotExist(String),
    #[error("Cache location is not a directory: {0}")]
    CacheLocationIsNotADirectory(String),
    #[error("Cache location is not writeable: {0}")]
    CacheLocationIsNotWriteable(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Time conversion error: {0}")]
    TimeConversionError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}
