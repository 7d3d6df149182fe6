//! Function platform API client implementation.
//!
//! This module provides the HTTP client for the platform's function REST
//! API. It owns authentication headers, timeouts, retry behavior for
//! transient failures, and the mapping from HTTP statuses to the error
//! taxonomy.

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::{FuncliftError, PlatformError, Result};

use super::types::{
    DeployReceipt, FunctionCreateBody, FunctionManifestPatch, FunctionMetaPatch,
    RemoteFunctionRecord, UpdateReceipt,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Function platform API client.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    /// HTTP client.
    client: Client,
    /// Base URL of the platform API.
    base_url: String,
    /// API token.
    api_token: String,
}

/// Error body shape returned by the platform API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Response body for metadata and manifest update calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    skipped: bool,
    #[serde(default)]
    message: String,
}

impl PlatformClient {
    /// Creates a new platform API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: &str, api_token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PlatformError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Builds an authenticated request for the given API path.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        self.client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
    }

    /// Executes a request with bounded retries for transient failures.
    ///
    /// `target` names the function (or uuid) the request concerns and is
    /// carried into not-found, conflict, and validation errors.
    async fn execute<F>(&self, target: &str, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                debug!("Retry attempt {attempt} of {MAX_RETRIES}");
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)))
                    .await;
            }

            match self.execute_once(target, build()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if e.is_retryable() {
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            FuncliftError::Platform(PlatformError::NetworkError {
                message: String::from("Max retries exceeded"),
            })
        }))
    }

    /// Executes a single request and maps failure statuses.
    async fn execute_once(
        &self,
        target: &str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            FuncliftError::Platform(PlatformError::NetworkError {
                message: format!("Request failed: {e}"),
            })
        })?;

        let status = response.status();
        trace!("Platform responded with {status} for '{target}'");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let retry_after = if retry_after == 0 { 60 } else { retry_after };

            return Err(FuncliftError::Platform(PlatformError::RateLimited {
                retry_after_secs: retry_after,
            }));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FuncliftError::Platform(PlatformError::AuthenticationFailed {
                message: String::from("Invalid or expired API token"),
            }));
        }

        let message = Self::read_error_message(response).await;

        let error = match status {
            StatusCode::NOT_FOUND => PlatformError::not_found(target),
            StatusCode::CONFLICT => PlatformError::DeploymentInFlight {
                name: target.to_string(),
                message,
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PlatformError::Rejected {
                name: target.to_string(),
                message,
            },
            _ => PlatformError::api_error(status.as_u16(), message),
        };

        Err(FuncliftError::Platform(error))
    }

    /// Extracts the platform's error message from a failure response.
    async fn read_error_message(response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => body,
        }
    }

    /// Deserializes a success response body.
    async fn parse<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        response.json().await.map_err(|e| {
            FuncliftError::Platform(PlatformError::InvalidResponse {
                message: format!("Failed to parse response: {e}"),
            })
        })
    }

    /// Lists functions by exact names in one batched query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_functions_by_names(
        &self,
        names: &[String],
    ) -> Result<Vec<RemoteFunctionRecord>> {
        let joined = names.join(",");
        debug!("Listing functions by names: {joined}");

        let response = self
            .execute(&joined, || {
                self.request(Method::GET, "/functions")
                    .query(&[("names", joined.as_str())])
            })
            .await?;

        Self::parse(response).await
    }

    /// Lists all functions owned by the current account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_all_functions(&self) -> Result<Vec<RemoteFunctionRecord>> {
        debug!("Listing all functions");

        let response = self
            .execute("functions", || self.request(Method::GET, "/functions"))
            .await?;

        Self::parse(response).await
    }

    /// Gets a function by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the function is not found or the API call fails.
    pub async fn get_function(&self, uuid: Uuid) -> Result<RemoteFunctionRecord> {
        let target = uuid.to_string();

        let response = self
            .execute(&target, || {
                self.request(Method::GET, &format!("/functions/{uuid}"))
            })
            .await?;

        Self::parse(response).await
    }

    /// Creates a new function.
    ///
    /// # Errors
    ///
    /// Returns an error if the function cannot be created.
    pub async fn create_function(
        &self,
        body: &FunctionCreateBody,
    ) -> Result<RemoteFunctionRecord> {
        debug!("Creating function '{}'", body.name);

        let response = self
            .execute(&body.name, || {
                self.request(Method::POST, "/functions").json(body)
            })
            .await?;

        Self::parse(response).await
    }

    /// Applies a partial metadata update to a function.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the API call fails.
    pub async fn update_function_meta(
        &self,
        uuid: Uuid,
        patch: &FunctionMetaPatch,
    ) -> Result<UpdateReceipt> {
        let target = uuid.to_string();

        let response = self
            .execute(&target, || {
                self.request(Method::PATCH, &format!("/functions/{uuid}"))
                    .json(patch)
            })
            .await?;

        let update: UpdateResponse = Self::parse(response).await?;
        Ok(update.into())
    }

    /// Applies a partial manifest update to a function.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the API call fails.
    pub async fn update_function_manifest(
        &self,
        uuid: Uuid,
        patch: &FunctionManifestPatch,
    ) -> Result<UpdateReceipt> {
        let target = uuid.to_string();

        let response = self
            .execute(&target, || {
                self.request(Method::PUT, &format!("/functions/{uuid}/manifest"))
                    .json(patch)
            })
            .await?;

        let update: UpdateResponse = Self::parse(response).await?;
        Ok(update.into())
    }

    /// Starts a deployment for a function.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployment cannot be started, including a
    /// conflict error when one is already in progress.
    pub async fn deploy_function(&self, uuid: Uuid) -> Result<DeployReceipt> {
        let target = uuid.to_string();

        let response = self
            .execute(&target, || {
                self.request(Method::POST, &format!("/functions/{uuid}/deploy"))
            })
            .await?;

        Self::parse(response).await
    }

    /// Starts an undeployment for a function.
    ///
    /// # Errors
    ///
    /// Returns an error if the undeployment cannot be started, including a
    /// conflict error when one is already in progress.
    pub async fn undeploy_function(&self, uuid: Uuid) -> Result<DeployReceipt> {
        let target = uuid.to_string();

        let response = self
            .execute(&target, || {
                self.request(Method::POST, &format!("/functions/{uuid}/undeploy"))
            })
            .await?;

        Self::parse(response).await
    }
}

impl From<UpdateResponse> for UpdateReceipt {
    fn from(response: UpdateResponse) -> Self {
        if response.skipped {
            Self::Skipped {
                message: response.message,
            }
        } else {
            Self::Applied
        }
    }
}
