mod ssm;

pub use ssm::SsmParameterStore;

use crate::error::ParameterStoreError;
use async_trait::async_trait;
use std::fmt;

/// Storage type of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    SecureString,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::String => write!(f, "String"),
            ParameterType::SecureString => write!(f, "SecureString"),
        }
    }
}

/// Named secret storage used for the client secret and the cached token
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read a parameter, decrypting it when `decrypt` is set
    async fn get(&self, name: &str, decrypt: bool) -> Result<String, ParameterStoreError>;

    /// Write a parameter and return the version the store assigned to it
    async fn put(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
        overwrite: bool,
    ) -> Result<i64, ParameterStoreError>;
}
