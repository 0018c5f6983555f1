//! Resource-manager client
//!
//! [`ResourceManagerClient`] is the only boundary the resources speak across.
//! [`ArmClient`] implements it over HTTPS against the Azure Resource Manager
//! endpoint, including tracking of long-running operations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ProviderConfig;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Errors returned by the resource-manager client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{id} was not found")]
    NotFound { id: String },

    #[error("unexpected status {status} ({code}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("long-running operation finished with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("operation did not complete within {0:?}")]
    Timeout(Duration),

    #[error("sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Calls against the resource-manager API
///
/// Each mutating call returns only once the remote operation has reached a
/// terminal state or `timeout` elapsed.
#[async_trait]
pub trait ResourceManagerClient: Send + Sync {
    /// Fetch a resource; a 404 is reported as [`ClientError::NotFound`]
    async fn get(&self, id: &str, api_version: &str) -> ClientResult<serde_json::Value>;

    /// PUT the full resource body and wait for provisioning to finish
    async fn create_or_update_then_poll(
        &self,
        id: &str,
        api_version: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> ClientResult<()>;

    /// PATCH a partial body and wait for the update to finish
    async fn update_then_poll(
        &self,
        id: &str,
        api_version: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> ClientResult<()>;

    /// DELETE the resource and wait until it is gone
    async fn delete_then_poll(&self, id: &str, api_version: &str, timeout: Duration)
    -> ClientResult<()>;

    /// List every element of a collection, following `nextLink` pages
    async fn list_by_parent(
        &self,
        collection_id: &str,
        api_version: &str,
    ) -> ClientResult<Vec<serde_json::Value>>;
}

/// List and decode a collection
pub async fn list_typed<T: DeserializeOwned>(
    client: &dyn ResourceManagerClient,
    collection_id: &str,
    api_version: &str,
) -> ClientResult<Vec<T>> {
    client
        .list_by_parent(collection_id, api_version)
        .await?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(ClientError::from))
        .collect()
}

/// Run a client call under a deadline
pub async fn with_timeout<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = ClientResult<T>>,
) -> ClientResult<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(ClientError::Timeout(timeout)))
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    value: Vec<serde_json::Value>,
    next_link: Option<String>,
}

/// HTTPS client for Azure Resource Manager
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(config: &ProviderConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        })
    }

    fn url(&self, id: &str) -> String {
        format!("{}{}", self.endpoint, id)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        api_version: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> ClientResult<reqwest::Response> {
        let mut req = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token));
        if let Some(api_version) = api_version {
            req = req.query(&[("api-version", api_version)]);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        log::debug!("{} {}", method, url);
        Ok(req.send().await?)
    }

    /// Turn a non-success response into an error
    async fn check(id: &str, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|e| e.error);
        Err(match detail {
            Some(d) => ClientError::Status {
                status: status.as_u16(),
                code: d.code,
                message: d.message,
            },
            None => ClientError::Status {
                status: status.as_u16(),
                code: String::new(),
                message: text,
            },
        })
    }

    fn retry_after(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.poll_interval)
    }

    /// Follow the operation-tracking headers until a terminal state
    async fn poll(&self, id: &str, headers: &HeaderMap) -> ClientResult<()> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        if let Some(url) = header(AZURE_ASYNC_OPERATION) {
            let mut delay = self.retry_after(headers);
            loop {
                tokio::time::sleep(delay).await;
                let response = self.send(Method::GET, &url, None, None).await?;
                let response = Self::check(id, response).await?;
                delay = self.retry_after(response.headers());
                let status: OperationStatus = response.json().await?;
                log::debug!("operation on {} is {}", id, status.status);
                match status.status.to_ascii_lowercase().as_str() {
                    "succeeded" => return Ok(()),
                    "failed" | "canceled" | "cancelled" => {
                        return Err(ClientError::OperationFailed {
                            status: status.status,
                            message: status.error.map(|e| e.message).unwrap_or_default(),
                        });
                    }
                    _ => {}
                }
            }
        }

        if let Some(url) = header(LOCATION.as_str()) {
            let mut delay = self.retry_after(headers);
            loop {
                tokio::time::sleep(delay).await;
                let response = self.send(Method::GET, &url, None, None).await?;
                if response.status() == StatusCode::ACCEPTED {
                    delay = self.retry_after(response.headers());
                    continue;
                }
                // A 404 on the tracked resource means a delete has completed
                match Self::check(id, response).await {
                    Ok(_) | Err(ClientError::NotFound { .. }) => return Ok(()),
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    /// Wait until a PUT or PATCH leaves the resource in a terminal provisioning state
    async fn wait_for_provisioning(&self, id: &str, api_version: &str) -> ClientResult<()> {
        loop {
            let body = self.get(id, api_version).await?;
            let state = body
                .pointer("/properties/provisioningState")
                .and_then(|v| v.as_str())
                .unwrap_or("Succeeded")
                .to_string();
            match state.to_ascii_lowercase().as_str() {
                "succeeded" => return Ok(()),
                "failed" | "canceled" => {
                    return Err(ClientError::OperationFailed {
                        status: state,
                        message: format!("{} ended provisioning", id),
                    });
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    async fn mutate(
        &self,
        method: Method,
        id: &str,
        api_version: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<()> {
        let is_delete = method == Method::DELETE;
        let response = self
            .send(method, &self.url(id), Some(api_version), body.as_ref())
            .await?;
        let response = Self::check(id, response).await?;
        let status = response.status();
        let headers = response.headers().clone();

        self.poll(id, &headers).await?;
        if !is_delete && status != StatusCode::ACCEPTED {
            self.wait_for_provisioning(id, api_version).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceManagerClient for ArmClient {
    async fn get(&self, id: &str, api_version: &str) -> ClientResult<serde_json::Value> {
        let response = self
            .send(Method::GET, &self.url(id), Some(api_version), None)
            .await?;
        let response = Self::check(id, response).await?;
        Ok(response.json().await?)
    }

    async fn create_or_update_then_poll(
        &self,
        id: &str,
        api_version: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> ClientResult<()> {
        with_timeout(timeout, self.mutate(Method::PUT, id, api_version, Some(body))).await
    }

    async fn update_then_poll(
        &self,
        id: &str,
        api_version: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> ClientResult<()> {
        with_timeout(timeout, self.mutate(Method::PATCH, id, api_version, Some(body))).await
    }

    async fn delete_then_poll(
        &self,
        id: &str,
        api_version: &str,
        timeout: Duration,
    ) -> ClientResult<()> {
        with_timeout(timeout, self.mutate(Method::DELETE, id, api_version, None)).await
    }

    async fn list_by_parent(
        &self,
        collection_id: &str,
        api_version: &str,
    ) -> ClientResult<Vec<serde_json::Value>> {
        let mut items = Vec::new();
        let response = self
            .send(Method::GET, &self.url(collection_id), Some(api_version), None)
            .await?;
        let mut page: ListPage = Self::check(collection_id, response).await?.json().await?;
        loop {
            items.append(&mut page.value);
            let Some(next) = page.next_link.take() else {
                break;
            };
            // nextLink already carries api-version and the skip token
            let response = self.send(Method::GET, &next, None, None).await?;
            page = Self::check(collection_id, response).await?.json().await?;
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client() -> ArmClient {
        let config = ProviderConfig {
            subscription_id: "00000000-0000-0000-0000-000000000000".to_string(),
            access_token: "token".to_string(),
            ..ProviderConfig::default()
        };
        ArmClient::new(&config).unwrap()
    }

    #[test]
    fn url_joins_endpoint_and_id() {
        let c = client();
        assert_eq!(
            c.url("/subscriptions/s/resourceGroups/rg"),
            "https://management.azure.com/subscriptions/s/resourceGroups/rg"
        );
    }

    #[test]
    fn retry_after_header_overrides_interval() {
        let c = client();
        let mut headers = HeaderMap::new();
        assert_eq!(c.retry_after(&headers), Duration::from_secs(10));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(c.retry_after(&headers), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn with_timeout_reports_deadline() {
        let result: ClientResult<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Timeout(_))));
    }

    #[test]
    fn list_page_reads_next_link() {
        let page: ListPage = serde_json::from_value(serde_json::json!({
            "value": [{"id": "a"}],
            "nextLink": "https://next"
        }))
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_link.as_deref(), Some("https://next"));
    }
}
