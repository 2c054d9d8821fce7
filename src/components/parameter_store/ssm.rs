use super::{ParameterStore, ParameterType};
use crate::error::ParameterStoreError;
use async_trait::async_trait;
use aws_sdk_ssm::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::ParameterType as SsmParameterType;
use aws_sdk_ssm::Client;
use tracing::debug;

/// Parameter store backed by AWS Systems Manager
#[derive(Clone, Debug)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get(&self, name: &str, decrypt: bool) -> Result<String, ParameterStoreError> {
        debug!("Reading parameter {}", name);

        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(decrypt)
            .send()
            .await
            .map_err(|e| classify(name, e))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(|v| v.to_string())
            .ok_or_else(|| ParameterStoreError::NotFound(name.to_string()))
    }

    async fn put(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
        overwrite: bool,
    ) -> Result<i64, ParameterStoreError> {
        debug!("Writing parameter {} as {}", name, parameter_type);

        let ssm_type = match parameter_type {
            ParameterType::String => SsmParameterType::String,
            ParameterType::SecureString => SsmParameterType::SecureString,
        };

        let output = self
            .client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ssm_type)
            .overwrite(overwrite)
            .send()
            .await
            .map_err(|e| classify(name, e))?;

        Ok(output.version())
    }
}

/// Map an SDK failure onto the store's error taxonomy by its service error code
fn classify<E, R>(name: &str, err: SdkError<E, R>) -> ParameterStoreError
where
    E: ProvideErrorMetadata + std::error::Error,
    R: std::fmt::Debug,
{
    let code = match &err {
        SdkError::ServiceError(service) => service.err().code().map(|c| c.to_string()),
        _ => None,
    };

    match code.as_deref() {
        Some("ParameterNotFound") => ParameterStoreError::NotFound(name.to_string()),
        Some("AccessDeniedException") => ParameterStoreError::AccessDenied(name.to_string()),
        Some("ValidationException")
        | Some("ParameterAlreadyExists")
        | Some("ParameterPatternMismatchException")
        | Some("UnsupportedParameterType")
        | Some("ParameterMaxVersionLimitExceeded") => {
            ParameterStoreError::Validation(format!("{}: {}", name, describe(&err)))
        }
        _ => ParameterStoreError::Service(format!("{}: {}", name, describe(&err))),
    }
}

fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service) => service
            .err()
            .message()
            .map(|m| m.to_string())
            .unwrap_or_else(|| service.err().to_string()),
        other => format!("{:?}", other),
    }
}
