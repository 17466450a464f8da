// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated HTTP client for the clinic REST API.
//!
//! Provides [`ApiClient`] which joins endpoint paths onto the configured base
//! URL, attaches the stored bearer token, and handles the one-shot token
//! refresh on 401.

use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use vetdesk_config::model::ApiConfig;
use vetdesk_core::types::AuthTokens;
use vetdesk_core::{Navigator, TokenStore, VetdeskError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Path of the token refresh endpoint, relative to the base URL.
const REFRESH_PATH: &str = "auth/refresh";

/// Path of the login endpoint, relative to the base URL.
const LOGIN_PATH: &str = "doctor/login";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encodes a caller-supplied id for use as one path segment.
pub fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// HTTP client for clinic backend communication.
///
/// Cheap to clone; clones share the connection pool, token store, and the
/// refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    /// Serializes refreshes so concurrent 401s trigger one refresh call.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Whether a request carries the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `base_url` - URL every endpoint path is joined onto (e.g. `http://host/api/v1`)
    /// * `timeout` - per-request timeout
    /// * `tokens` - persistent store holding `accessToken` / `refreshToken`
    /// * `navigator` - sends the user to the login view when refresh fails
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, VetdeskError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VetdeskError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                timeout,
                tokens,
                navigator,
                refresh_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Creates a client from the `[api]` config section.
    pub fn from_config(
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, VetdeskError> {
        Self::new(config.base_url.clone(), config.timeout(), tokens, navigator)
    }

    /// Returns the base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the token store this client reads credentials from.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// True when an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.get(ACCESS_TOKEN_KEY).is_some()
    }

    /// Logs in with doctor credentials and stores the returned tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, VetdeskError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let tokens: AuthTokens = self
            .execute(Method::POST, LOGIN_PATH, &[], Some(body), Auth::Public)
            .await?;
        self.store_tokens(&tokens)?;
        info!(email, "logged in");
        Ok(tokens)
    }

    /// Clears stored credentials.
    pub fn logout(&self) -> Result<(), VetdeskError> {
        self.inner.tokens.clear()?;
        info!("logged out, credentials cleared");
        Ok(())
    }

    /// Authenticated GET.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, VetdeskError> {
        self.execute(Method::GET, path, &[], None, Auth::Bearer).await
    }

    /// Authenticated GET with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, VetdeskError> {
        self.execute(Method::GET, path, query, None, Auth::Bearer)
            .await
    }

    /// Unauthenticated GET (health checks).
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, VetdeskError> {
        self.execute(Method::GET, path, &[], None, Auth::Public).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VetdeskError> {
        let body = to_json(body)?;
        self.execute(Method::POST, path, &[], Some(body), Auth::Bearer)
            .await
    }

    /// Authenticated PUT with a JSON body.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VetdeskError> {
        let body = to_json(body)?;
        self.execute(Method::PUT, path, &[], Some(body), Auth::Bearer)
            .await
    }

    /// Authenticated PATCH with a JSON body.
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VetdeskError> {
        let body = to_json(body)?;
        self.execute(Method::PATCH, path, &[], Some(body), Auth::Bearer)
            .await
    }

    /// Authenticated DELETE. The response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), VetdeskError> {
        let _: Value = self
            .execute(Method::DELETE, path, &[], None, Auth::Bearer)
            .await?;
        Ok(())
    }

    /// Sends a request, refreshing the token at most once on 401.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        auth: Auth,
    ) -> Result<T, VetdeskError> {
        let url = self.build_url(path, query)?;

        let token = match auth {
            Auth::Public => None,
            Auth::Bearer => Some(self.inner.tokens.get(ACCESS_TOKEN_KEY).ok_or_else(|| {
                VetdeskError::MissingCredential(format!(
                    "no access token stored; log in before calling {method} {path}"
                ))
            })?),
        };

        let response = self
            .send_once(&method, &url, body.as_ref(), token.as_deref())
            .await?;
        debug!(%method, path, status = %response.status(), "response received");

        let Some(stale_token) = token else {
            return decode_response(response).await;
        };
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode_response(response).await;
        }

        warn!(%method, path, "access token rejected, refreshing");
        let fresh_token = self.refresh_after_unauthorized(&stale_token).await?;

        let replay = self
            .send_once(&method, &url, body.as_ref(), Some(&fresh_token))
            .await?;
        debug!(%method, path, status = %replay.status(), "replayed request after refresh");

        if replay.status() == StatusCode::UNAUTHORIZED {
            let body = replay.text().await.unwrap_or_default();
            let (message, _) = extract_error_message(&body, StatusCode::UNAUTHORIZED);
            return Err(VetdeskError::Unauthorized(message));
        }

        decode_response(replay).await
    }

    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Url, VetdeskError> {
        let mut url = reqwest::Url::parse(&self.url(path))
            .map_err(|e| VetdeskError::Config(format!("invalid request URL for `{path}`: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &reqwest::Url,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, VetdeskError> {
        let mut request = self.inner.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| self.map_transport_error(e))
    }

    /// Obtains a usable token after `stale_token` was rejected.
    ///
    /// If another task already rotated the token while this one waited on the
    /// gate, the rotated token is returned without a second refresh call. On
    /// refresh failure, credentials are cleared and the user is redirected.
    async fn refresh_after_unauthorized(&self, stale_token: &str) -> Result<String, VetdeskError> {
        let _gate = self.inner.refresh_gate.lock().await;

        if let Some(current) = self.inner.tokens.get(ACCESS_TOKEN_KEY) {
            if current != stale_token {
                debug!("token already rotated by a concurrent refresh");
                return Ok(current);
            }
        }

        match self.refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing credentials");
                if let Err(clear_err) = self.inner.tokens.clear() {
                    warn!(error = %clear_err, "failed to clear stored credentials");
                }
                self.inner
                    .navigator
                    .redirect_to_login("your session has expired, please log in again");
                Err(VetdeskError::SessionExpired(e.to_string()))
            }
        }
    }

    /// Calls the refresh endpoint and stores the rotated tokens.
    async fn refresh(&self) -> Result<String, VetdeskError> {
        let refresh_token = self.inner.tokens.get(REFRESH_TOKEN_KEY).ok_or_else(|| {
            VetdeskError::MissingCredential("no refresh token stored".to_string())
        })?;
        let body = serde_json::json!({ "refreshToken": refresh_token });
        // Sent directly rather than through `execute`: a refresh never refreshes.
        let url = self.build_url(REFRESH_PATH, &[])?;
        let response = self
            .send_once(&Method::POST, &url, Some(&body), None)
            .await?;
        let tokens: AuthTokens = decode_response(response).await?;
        self.store_tokens(&tokens)?;
        info!("access token refreshed");
        Ok(tokens.access_token)
    }

    fn store_tokens(&self, tokens: &AuthTokens) -> Result<(), VetdeskError> {
        self.inner
            .tokens
            .set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        if let Some(refresh) = &tokens.refresh_token {
            self.inner.tokens.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    fn map_transport_error(&self, e: reqwest::Error) -> VetdeskError {
        if e.is_timeout() {
            VetdeskError::Timeout {
                duration: self.inner.timeout,
            }
        } else {
            VetdeskError::Network {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, VetdeskError> {
    serde_json::to_value(body).map_err(|e| VetdeskError::Decode {
        message: format!("failed to serialize request body: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Turns a response into `T`, or into [`VetdeskError::Api`] for non-2xx.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, VetdeskError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| VetdeskError::Network {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        let (message, details) = extract_error_message(&body, status);
        return Err(VetdeskError::Api {
            status: status.as_u16(),
            message,
            details,
        });
    }

    decode_body(&body)
}

/// Decodes a success body. Empty bodies decode as JSON `null`; bodies wrapped
/// in a `{"data": ...}` envelope are unwrapped when the bare shape does not fit.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, VetdeskError> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| VetdeskError::Decode {
            message: format!("response is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })?
    };

    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            if let Some(data) = value.get("data") {
                if let Ok(decoded) = serde_json::from_value::<T>(data.clone()) {
                    return Ok(decoded);
                }
            }
            Err(VetdeskError::Decode {
                message: format!("unexpected response shape: {e}"),
                source: Some(Box::new(e)),
            })
        }
    }
}

/// Pulls `message`/`error` and `details` out of an error body.
fn extract_error_message(body: &str, status: StatusCode) -> (String, Option<String>) {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            fallback()
        } else {
            trimmed.to_string()
        };
        return (message, None);
    };

    let message = ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(fallback);

    let details = match value.get("details") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    (message, details)
}
