// DataCenter HTTP client
//
// Wraps `reqwest::Client` with login-scoped URL construction and
// single-point response decoding. Resource endpoint groups (networks,
// machines) live in sibling modules as inherent methods; resource
// proxies route every request through this type.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Client for one datacenter API endpoint, scoped to one account login.
///
/// All CloudAPI/NetworkAPI paths hang off `/:login/`; the `DataCenter`
/// owns that prefix, the HTTP client, and the credentials. Response
/// bodies are decoded exactly once, here at the transport boundary --
/// callers never see a still-encoded string body.
pub struct DataCenter {
    http: reqwest::Client,
    base_url: Url,
    login: String,
    credentials: Option<Credentials>,
}

impl DataCenter {
    /// Create a client for the datacenter at `base_url`, authenticating
    /// every request with `credentials`.
    pub fn new(
        base_url: Url,
        login: impl Into<String>,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            login: login.into(),
            credentials: Some(credentials),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and no
    /// credential handling (e.g. behind a signing proxy, or in tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, login: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            login: login.into(),
            credentials: None,
        }
    }

    /// The account login this client is scoped to.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The datacenter base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for a login-scoped API path:
    /// `{base}/{login}/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/{}/{path}", self.login);
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => credentials.apply(builder),
            None => builder,
        }
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .authed(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a PUT request with a JSON body and decode the response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .authed(self.http.put(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a DELETE request, checking only the status (delete endpoints
    /// return no body on success).
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self
            .authed(self.http.delete(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await
    }

    /// Send a bodyless POST (machine lifecycle actions carry the verb in
    /// a query parameter and return no body).
    pub(crate) async fn post_action(&self, url: Url) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .authed(self.http.post(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await
    }

    /// Fail with `Error::Api` on any status >= 400, after logging the
    /// raw body for diagnostics.
    async fn check_status(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "request failed: {}", preview(&body));
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Decode a JSON response body, exactly once. Status >= 400 is a
    /// hard failure carrying the raw body.
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_client_error() || status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", preview(&body));
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

/// First ~200 bytes of a body for log lines, clipped at a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

impl fmt::Display for DataCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.login, self.base_url)
    }
}

impl fmt::Debug for DataCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCenter")
            .field("base_url", &self.base_url.as_str())
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}
