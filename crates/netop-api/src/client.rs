// Incident API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer authorization and
// response classification. Endpoint groups (incidents, sites, users) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.netop.cloud/v1";

/// Raw HTTP client for the NetOp incident API.
///
/// Every call takes an optional bearer token; the client itself holds no
/// credentials. A `204 No Content` reply surfaces as `Ok(None)` from the
/// request helpers so callers can decide what "empty" means for them.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL by appending `segments` to the base URL.
    ///
    /// The base URL may carry a path prefix (e.g. `/v1`), which is kept.
    /// Each segment is percent-encoded, so an id containing `/` or `?`
    /// stays a single path segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        token: Option<&SecretString>,
        query: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let builder = self.http.get(url).query(query);
        self.send(builder, token).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &[&str],
        token: Option<&SecretString>,
        body: &(impl Serialize + Sync + ?Sized),
    ) -> Result<Option<T>, Error> {
        self.with_body(Method::PUT, path, token, Some(body)).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &[&str],
        token: Option<&SecretString>,
        body: Option<&(impl Serialize + Sync + ?Sized)>,
    ) -> Result<Option<T>, Error> {
        self.with_body(Method::POST, path, token, body).await
    }

    async fn with_body<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        token: Option<&SecretString>,
        body: Option<&(impl Serialize + Sync + ?Sized)>,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, token).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        token: Option<&SecretString>,
    ) -> Result<Option<T>, Error> {
        let builder = match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        };
        let resp = builder
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_response(resp).await
    }
}

/// Classify a response: 204 → `None`, 2xx → decoded body, anything else
/// → a typed error carrying the server's message.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>, Error> {
    let status = resp.status();
    let path = resp.url().path().to_owned();

    if status == StatusCode::NO_CONTENT {
        trace!(%path, "no content");
        return Ok(None);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {status}"), str::to_owned)
            });
        return Err(match status {
            StatusCode::UNAUTHORIZED => Error::Authentication { message },
            StatusCode::NOT_FOUND => Error::NotFound { path },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;
    if body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&body).map(Some).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}
