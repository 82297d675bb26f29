use crate::error::{DescriberError, Result};
use reqwest::Response;
use tracing::error;

/// Convert a reqwest error to a DescriberError, handling timeout errors specially.
pub fn handle_http_error(e: reqwest::Error, provider_name: &str) -> DescriberError {
    error!(error = %e, "HTTP request to {} failed", provider_name);
    if e.is_timeout() {
        DescriberError::Timeout
    } else {
        DescriberError::HttpError(e)
    }
}

/// Check HTTP response status and extract error message if unsuccessful.
pub async fn check_response_status(response: Response, provider_name: &str) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        error!(
            status = %status,
            error = %error_text,
            "{} API returned error response", provider_name
        );
        return Err(DescriberError::ApiError(format!(
            "{} API error ({}): {}",
            provider_name, status, error_text
        )));
    }
    Ok(response)
}

/// Build an HTTP client, with a request timeout when one is configured.
pub fn build_http_client(timeout: Option<std::time::Duration>) -> reqwest::Client {
    let Some(timeout) = timeout else {
        return reqwest::Client::new();
    };

    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                "Failed to build reqwest client with timeout, using default"
            );
            reqwest::Client::new()
        })
}

/// Macro to generate the builder methods shared by the REST clients.
///
/// The config type must have `base_url: Option<String>` and
/// `timeout: Option<Duration>` fields, and the client `config` and `client` fields.
#[macro_export]
macro_rules! impl_client_builder_methods {
    (
        client_type: $client:ty,
        provider_name: $provider:expr
    ) => {
        impl $client {
            /// Set a custom base URL (without trailing slash), e.g. for a proxy or a local fake.
            #[tracing::instrument(skip(self, base_url))]
            pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
                let base_url = base_url.into();
                tracing::debug!(
                    previous_base_url = ?self.config.base_url,
                    new_base_url = %base_url,
                    "Setting {} base URL", $provider
                );
                self.config.base_url = Some(base_url);
                self
            }

            /// Set the timeout for each HTTP request made by the client.
            #[tracing::instrument(skip(self))]
            pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
                tracing::debug!(
                    previous_timeout = ?self.config.timeout,
                    new_timeout = ?timeout,
                    "Setting {} timeout", $provider
                );
                self.config.timeout = Some(timeout);
                self.client = $crate::backend::utils::build_http_client(Some(timeout));
                self
            }
        }
    };
}
