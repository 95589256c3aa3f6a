//! Login-with-Amazon token lifecycle: a cached access token with
//! transparent refresh, plus the one-time authorization-code exchange
//! used to bootstrap a refresh token.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use bidpilot_core::config::AuthConfig;
use bidpilot_core::error::{AdsError, AdsResult};

/// Scope requested when a user authorizes the application.
pub const CAMPAIGN_MANAGEMENT_SCOPE: &str = "advertising::campaign_management";

const LOGIN_URL: &str = "https://www.amazon.com/ap/oa";

/// Token response from the LWA token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct Credential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Caches a single access token and refreshes it through LWA on demand.
///
/// The credential slot is guarded by a mutex held across the validity
/// check and the refresh call, so concurrent callers serialize instead
/// of racing duplicate exchanges. A failed refresh leaves the slot
/// untouched.
pub struct TokenCache {
    auth: AuthConfig,
    http: Client,
    credential: Mutex<Option<Credential>>,
}

impl TokenCache {
    pub fn new(auth: AuthConfig, timeout: std::time::Duration) -> AdsResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            auth,
            http,
            credential: Mutex::new(None),
        })
    }

    /// Return a valid access token, refreshing when the cached one is
    /// missing or inside the expiry margin.
    pub fn access_token(&self) -> AdsResult<String> {
        let mut slot = self.credential.lock();

        if let Some(credential) = slot.as_ref() {
            if Utc::now() < credential.expires_at {
                return Ok(credential.access_token.clone());
            }
        }

        let refreshed = self.refresh()?;
        let token = refreshed.access_token.clone();
        *slot = Some(refreshed);
        Ok(token)
    }

    fn refresh(&self) -> AdsResult<Credential> {
        if self.auth.client_id.trim().is_empty()
            || self.auth.client_secret.trim().is_empty()
            || self.auth.refresh_token.trim().is_empty()
        {
            return Err(AdsError::Auth(
                "client_id, client_secret and refresh_token must all be configured".to_string(),
            ));
        }

        debug!(token_url = %self.auth.token_url, "Refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.auth.refresh_token.as_str()),
            ("client_id", self.auth.client_id.as_str()),
            ("client_secret", self.auth.client_secret.as_str()),
        ];
        let response = self.http.post(&self.auth.token_url).form(&params).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            metrics::counter!("auth.refresh_failures").increment(1);
            return Err(AdsError::Auth(format!(
                "token refresh rejected (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        let grant: TokenGrant = response.json()?;
        let lifetime = grant.expires_in - self.auth.expiry_margin_secs;
        let expires_at = Utc::now() + Duration::seconds(lifetime);
        metrics::counter!("auth.token_refreshes").increment(1);
        info!(expires_at = %expires_at, "Access token refreshed");

        Ok(Credential {
            access_token: grant.access_token,
            expires_at,
        })
    }
}

/// Build the LWA consent URL an operator opens to authorize the app.
pub fn login_url(auth: &AuthConfig) -> AdsResult<String> {
    if auth.client_id.trim().is_empty() {
        return Err(AdsError::Config("auth.client_id is not set".to_string()));
    }
    if auth.redirect_uri.trim().is_empty() {
        return Err(AdsError::Config("auth.redirect_uri is not set".to_string()));
    }

    let mut url = Url::parse(LOGIN_URL).map_err(|e| AdsError::Config(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", &auth.client_id)
        .append_pair("scope", CAMPAIGN_MANAGEMENT_SCOPE)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &auth.redirect_uri);
    Ok(url.to_string())
}

/// Exchange a one-time authorization code for tokens.
///
/// The returned grant carries the refresh token the operator persists
/// into configuration.
pub fn exchange_authorization_code(auth: &AuthConfig, code: &str) -> AdsResult<TokenGrant> {
    if auth.client_id.trim().is_empty() || auth.client_secret.trim().is_empty() {
        return Err(AdsError::Auth(
            "client_id and client_secret must be configured".to_string(),
        ));
    }

    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", auth.redirect_uri.as_str()),
        ("client_id", auth.client_id.as_str()),
        ("client_secret", auth.client_secret.as_str()),
    ];
    let response = Client::new().post(&auth.token_url).form(&params).send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AdsError::Auth(format!(
            "authorization code exchange rejected (status {}): {}",
            status.as_u16(),
            body
        )));
    }

    Ok(response.json()?)
}
