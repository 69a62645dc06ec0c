use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use richchat_domain::RichChatError;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::InfraError;

/// Bearer-authenticated HTTP client for provider REST APIs.
///
/// Failed requests are reported, never retried; the reconciler decides when
/// to call again.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, RichChatError> {
        Self::builder().build()
    }

    /// Create a request builder carrying `token` as bearer credential.
    pub fn request<U>(&self, method: Method, url: U, token: &str) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url).bearer_auth(token)
    }

    /// Execute the request and fail on any non-success status.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, RichChatError> {
        let request = builder.build().map_err(|err| RichChatError::from(InfraError::from(err)))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %url.path(), "sending HTTP request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| RichChatError::from(InfraError::from(err)))?;

        let status = response.status();
        debug!(%method, url = %url.path(), %status, "received HTTP response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(InfraError::from_status(status, body.trim()).into())
    }

    /// Execute the request and decode a JSON body.
    pub async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T, RichChatError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder).await?;
        response.json::<T>().await.map_err(|err| InfraError::from(err).into())
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, RichChatError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| RichChatError::from(InfraError::from(err)))?;
        Ok(HttpClient { client })
    }
}
