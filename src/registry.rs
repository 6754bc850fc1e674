/*============================================================
  Modreg Project: modreg
  Module: modreg_core::registry
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Talk to the module registry over HTTPS and surface every
    failure as a classified remote-call error.

  Security / Safety Notes:
    Tokens are sent as bearer credentials and never logged or
    included in error messages.

  Dependencies:
    reqwest for HTTP, serde for payloads, urlencoding for
    path segments.

  Operational Scope:
    Used by registry commands; one client per invocation.

  Revision History:
    2026-03-02 MRG  Implemented registry client.
  ------------------------------------------------------------
  Principles Observed:
    - Retry only when the service is unavailable
    - Structured response parsing with explicit error paths
============================================================*/

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep;
use urlencoding::encode;

use crate::config::RegistryConfig;
use crate::error::{BoxError, ModregError, Result};
use crate::internal::new_internal_error;
use crate::rpc::{ErrorCode, RpcError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
}

/// Client for the registry HTTP API.
#[derive(Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    max_retries: usize,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig, remote: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("modreg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ModregError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url_for(remote),
            token: config.resolved_token(),
            max_retries: config.max_retries.max(1),
        })
    }

    pub async fn create_organization(&self, name: &str) -> std::result::Result<Organization, BoxError> {
        let url = self.url(&["organizations"]);
        self.send(Method::POST, url, Some(json!({ "name": name })))
            .await
    }

    pub async fn get_organization(&self, name: &str) -> std::result::Result<Organization, BoxError> {
        let url = self.url(&["organizations", name]);
        self.send(Method::GET, url, None).await
    }

    pub async fn create_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> std::result::Result<Repository, BoxError> {
        let url = self.url(&["repositories"]);
        self.send(Method::POST, url, Some(json!({ "owner": owner, "name": name })))
            .await
    }

    pub async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> std::result::Result<Repository, BoxError> {
        let url = self.url(&["repositories", owner, name]);
        self.send(Method::GET, url, None).await
    }

    pub async fn create_branch(
        &self,
        owner: &str,
        repository: &str,
        name: &str,
    ) -> std::result::Result<Branch, BoxError> {
        let url = self.url(&["repositories", owner, repository, "branches"]);
        self.send(Method::POST, url, Some(json!({ "name": name })))
            .await
    }

    pub async fn delete_token(&self, token_id: &str) -> std::result::Result<(), BoxError> {
        let url = self.url(&["tokens", token_id]);
        self.execute(Method::DELETE, &url, None).await?;
        Ok(())
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&encode(segment));
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<T, BoxError> {
        let response = self.execute(method, &url, body.as_ref()).await?;
        response.json::<T>().await.map_err(|err| {
            new_internal_error(Some(Box::new(ModregError::Serialization(format!(
                "Failed to decode registry response from {url}: {err}"
            )))))
        })
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> std::result::Result<reqwest::Response, BoxError> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.request(method.clone(), url);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let failure = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let text = match response.text().await {
                        Ok(text) => text,
                        Err(err) => format!("failed to read response body: {err}"),
                    };
                    RpcError::from_response(status, &text)
                }
                Err(err) => RpcError::from_transport(err),
            };

            attempt += 1;
            if failure.code() != ErrorCode::Unavailable || attempt >= self.max_retries {
                return Err(Box::new(failure));
            }
            sleep(backoff(attempt)).await;
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let exponent = (attempt as u32).min(8);
    Duration::from_millis(200_u64.saturating_mul(1_u64 << exponent))
}
