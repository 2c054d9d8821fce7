use crate::error::{transport_error, ForwarderResult};
use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client;
use tracing::debug;

/// Invokes a downstream function by name and waits for it to finish
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> ForwarderResult<()>;
}

/// Invoker backed by AWS Lambda
#[derive(Clone, Debug)]
pub struct LambdaInvoker {
    client: Client,
}

impl LambdaInvoker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> ForwarderResult<()> {
        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                transport_error(&format!(
                    "Failed to invoke {}: {}",
                    function_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("Invoked {} (status {})", function_name, output.status_code());

        if let Some(function_error) = output.function_error() {
            let body = output
                .payload()
                .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
                .unwrap_or_default();
            return Err(transport_error(&format!(
                "{} reported {}: {}",
                function_name, function_error, body
            )));
        }

        Ok(())
    }
}
