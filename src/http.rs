//! HTTP gateway for the Omnia API
//!
//! Single point through which all remote calls pass. Every request re-reads
//! the persisted credential before it is sent, so a logout is honored by the
//! very next call with no stale header left behind. Body encoding is an
//! explicit [`Payload`] choice at each call site, not an implicit branch on
//! the endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

/// Request body encoding, chosen explicitly per call
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON-encoded body
    Json(serde_json::Value),
    /// Multipart form fields (the token endpoint's convention)
    Form(Vec<(String, String)>),
}

/// HTTP client for the Omnia API
///
/// Holds one pooled `reqwest::Client` and the session store it reads the
/// bearer credential from.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api_url: String,
    session: Arc<SessionStore>,
}

impl HttpClient {
    /// Build a client from configuration and a session store
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url(),
            session,
        })
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        let request = self.authorize(self.client.get(self.url(path)));
        self.run(path, request, cancel).await
    }

    /// POST a body with the given encoding and decode the JSON response
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Payload,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        let request = self.authorize(self.client.post(self.url(path)));
        let request = match payload {
            Payload::Json(body) => request.json(&body),
            Payload::Form(fields) => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                request.multipart(form)
            }
        };
        self.run(path, request, cancel).await
    }

    /// DELETE a resource and decode the JSON response
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        let request = self.authorize(self.client.delete(self.url(path)));
        self.run(path, request, cancel).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Attach the bearer header iff a credential is currently persisted
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.load_credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Execute the request, racing it against cancellation
    ///
    /// A cancelled call resolves immediately and never hands a response back
    /// to the caller, so no state update can be applied after teardown.
    async fn run<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path = %path, "Request cancelled by owner teardown");
                Err(ClientError::Cancelled)
            }
            result = Self::execute(path, request) => result,
        }
    }

    async fn execute<T: DeserializeOwned>(
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        // Unique id ties request and completion log lines together
        let request_id = Uuid::new_v4();
        debug!(request_id = %request_id, path = %path, "Sending API request");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            error!(
                request_id = %request_id,
                path = %path,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "API request failed"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        debug!(
            request_id = %request_id,
            path = %path,
            status = status.as_u16(),
            body_len = body.len(),
            "API request succeeded"
        );
        Ok(serde_json::from_str(&body)?)
    }
}

/// Extract the `detail` field from a structured error body, if present
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}
