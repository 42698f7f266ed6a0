//! REST client for the backend's envelope-wrapped JSON API.
//!
//! # Design
//! `RestClient` holds only its configuration and two capabilities: where the
//! current session comes from, and how requests reach the network. It keeps
//! no per-call state. Each operation is split into `build_request` (URL,
//! headers, body) and `parse_response` (status check, envelope decoding), both
//! pure, so a host can run the I/O itself. `get`/`post`/`put` glue the two
//! halves around a `Transport` and a cancellation token.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::{NoSession, SessionSource};
use crate::transport::{ReqwestTransport, Transport};

pub const CONTENT_TYPE_HEADER: &str = "Content-type";
pub const APPCODE_HEADER: &str = "X-APPCODE";
pub const SESSION_HEADER: &str = "X-SESSION";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Body argument for a `post`/`put` that sends no content.
pub const NO_BODY: Option<&()> = None;

/// Async, stateless client for the backend's REST API.
///
/// Holds the connection settings plus two capabilities: the session source
/// read on every request, and the transport that performs the I/O. Clones
/// share both and can be used from concurrent tasks.
#[derive(Clone)]
pub struct RestClient {
    config: ClientConfig,
    session: Arc<dyn SessionSource>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .field("authenticated", &self.session.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Client over an arbitrary session source and transport.
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            session,
            transport,
        }
    }

    /// Client that performs I/O with `ReqwestTransport`.
    pub fn with_reqwest(config: ClientConfig, session: Arc<dyn SessionSource>) -> Self {
        Self::new(config, session, Arc::new(ReqwestTransport::new()))
    }

    /// Client that never sends a session header.
    pub fn anonymous(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(config, Arc::new(NoSession), transport)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET {api_domain}:{http_port}/{path}` and return the envelope's `data`.
    ///
    /// Fails with `Cancelled` if `cancel` fires first, `Http` on a non-2xx
    /// status, `Decode` when `data` does not fit `T`, `Transport` on I/O errors.
    pub async fn get<T>(&self, path: &str, cancel: &CancellationToken) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.call(HttpMethod::Get, path, NO_BODY, cancel).await
    }

    /// `POST` with `body` encoded as JSON, or no content for `None`
    /// (`NO_BODY`). Same result and failure modes as `get`.
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(HttpMethod::Post, path, body, cancel).await
    }

    /// `PUT` with an optional JSON body. Same result and failure modes as `get`.
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(HttpMethod::Put, path, body, cancel).await
    }

    async fn call<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        if cancel.is_cancelled() {
            tracing::debug!(%method, path, "cancelled before dispatch");
            return Err(ApiError::Cancelled);
        }

        let request = self.build_request(method, path, body)?;
        tracing::debug!(
            %method,
            url = %request.url,
            authenticated = request.header(SESSION_HEADER).is_some(),
            "dispatching request"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(%method, path, "cancelled in flight");
                return Err(ApiError::Cancelled);
            }
            response = self.transport.execute(request) => response?,
        };
        tracing::debug!(%method, path, status = response.status, "response received");

        self.parse_response(response)
    }

    /// `{api_domain}:{http_port}/{path}`, joined verbatim.
    pub fn request_url(&self, path: &str) -> String {
        format!("{}:{}/{}", self.config.api_domain, self.config.http_port, path)
    }

    /// Build the request for one call. The session is read here, once.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let mut headers = vec![
            (CONTENT_TYPE_HEADER.to_string(), JSON_MEDIA_TYPE.to_string()),
            (APPCODE_HEADER.to_string(), self.config.app_code.clone()),
        ];
        if let Some(token) = self.session.snapshot() {
            headers.push((SESSION_HEADER.to_string(), token));
        }

        Ok(HttpRequest {
            method,
            url: self.request_url(path),
            headers,
            body,
        })
    }

    /// Check the status and unwrap the envelope's `data`.
    pub fn parse_response<T>(&self, response: HttpResponse) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        check_status(response).and_then(|body| decode_data(&body))
    }
}

/// Non-2xx responses become `ApiError::Http` without touching the body.
fn check_status(response: HttpResponse) -> Result<String, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }
    tracing::warn!(status = response.status, "request failed");
    Err(ApiError::Http {
        status: response.status,
        body: response.body,
    })
}

fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_data)
        .map_err(|e| {
            tracing::warn!(error = %e, "response envelope did not decode");
            ApiError::Decode(e.to_string())
        })
}
