//! Spotify local API session bootstrap
//!
//! The desktop client ships a "webhelper" that listens on
//! `https://*.spotilocal.com:4370` (the wildcard resolves to 127.0.0.1).
//! Calling it requires two tokens fetched up front: an OAuth token from a
//! public endpoint and a CSRF token from the webhelper itself. Both are
//! bundled into a [`SessionDescriptor`] that every subsequent call reuses.
//! There is no refresh; an expired session makes later calls fail and the
//! process must be restarted to re-authenticate.

use rand::Rng;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Fixed port of the local webhelper API.
pub const LOCAL_PORT: u16 = 4370;
/// Domain whose subdomains resolve to the local webhelper.
pub const LOCAL_DOMAIN: &str = "spotilocal.com";
/// Public endpoint serving the OAuth token as `{"t": "..."}`.
pub const OAUTH_TOKEN_URL: &str = "http://open.spotify.com/token";
/// The webhelper only answers requests claiming to come from the web player.
pub const SPOOFED_ORIGIN: &str = "https://open.spotify.com";

const SUBDOMAIN_LEN: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bootstrap failure. Fatal: without a session no operation is possible.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token response carried no `{0}` value")]
    EmptyToken(&'static str),
}

/// Everything needed to call the local API: base URL, baseline query
/// parameters (oauth + csrf tokens) and the spoofed Origin header.
/// Immutable once constructed; shared read-only across all calls.
#[derive(Debug, Clone)]
pub struct SessionDescriptor {
    base_url: String,
    params: Vec<(String, String)>,
    origin: String,
}

impl SessionDescriptor {
    pub fn new(base_url: String, oauth_token: String, csrf_token: String) -> Self {
        Self {
            base_url,
            params: vec![
                ("oauth".to_string(), oauth_token),
                ("csrf".to_string(), csrf_token),
            ],
            origin: SPOOFED_ORIGIN.to_string(),
        }
    }

    /// Base URL of the local API, e.g. `https://abcdefghij.spotilocal.com:4370`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Baseline query parameters sent with every call.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// A fresh `{10 random lowercase letters}.spotilocal.com` hostname.
///
/// Picking a new subdomain per run sidesteps address/connection reuse issues
/// with the locally issued TLS certificate. It is not a security control.
pub fn random_hostname() -> String {
    const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let subdomain: String = (0..SUBDOMAIN_LEN)
        .map(|_| LOWERCASE[rng.gen_range(0..LOWERCASE.len())] as char)
        .collect();
    format!("{subdomain}.{LOCAL_DOMAIN}")
}

/// HTTP client for the local API: the insecure local transport.
///
/// The webhelper presents a certificate the client cannot validate against a
/// public CA, so certificate validation is disabled for this client only.
/// The public OAuth endpoint is never called through it.
pub fn insecure_local_client() -> reqwest::Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}

#[derive(Deserialize)]
struct OauthTokenResp {
    #[serde(default)]
    t: String,
}

#[derive(Deserialize)]
struct CsrfTokenResp {
    #[serde(default)]
    token: String,
}

/// Performs the two-step token exchange and produces the session descriptor.
pub struct Authenticator {
    public_http: Client,
    local_http: Client,
    oauth_url: String,
    local_base: String,
}

impl Authenticator {
    /// Authenticator for the real endpoints, with a freshly chosen hostname.
    pub fn new() -> Result<Self, AuthError> {
        Self::for_endpoints(
            OAUTH_TOKEN_URL.to_string(),
            format!("https://{}:{}", random_hostname(), LOCAL_PORT),
        )
    }

    /// Authenticator against explicit endpoints. Lets tests point both the
    /// token fetch and the local base at a plain-HTTP mock server.
    pub fn for_endpoints(oauth_url: String, local_base: String) -> Result<Self, AuthError> {
        Ok(Self {
            public_http: Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?,
            local_http: insecure_local_client()?,
            oauth_url,
            local_base,
        })
    }

    /// Run both token fetches and bundle the result. The CSRF fetch does not
    /// depend on the OAuth token, so the two run concurrently.
    pub async fn authenticate(&self) -> Result<SessionDescriptor, AuthError> {
        let (oauth_token, csrf_token) =
            tokio::try_join!(self.fetch_oauth_token(), self.fetch_csrf_token())?;
        Ok(SessionDescriptor::new(
            self.local_base.clone(),
            oauth_token,
            csrf_token,
        ))
    }

    async fn fetch_oauth_token(&self) -> Result<String, AuthError> {
        let resp: OauthTokenResp = self
            .public_http
            .get(&self.oauth_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if resp.t.is_empty() {
            return Err(AuthError::EmptyToken("t"));
        }
        Ok(resp.t)
    }

    async fn fetch_csrf_token(&self) -> Result<String, AuthError> {
        let url = format!("{}/simplecsrf/token.json", self.local_base);
        let resp: CsrfTokenResp = self
            .local_http
            .get(url)
            .header(header::ORIGIN, SPOOFED_ORIGIN)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if resp.token.is_empty() {
            return Err(AuthError::EmptyToken("token"));
        }
        Ok(resp.token)
    }
}
