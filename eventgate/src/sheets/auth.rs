//! Service-account access tokens for the spreadsheet backend
//!
//! Tokens are minted by exchanging an RS256-signed JWT assertion at the
//! identity endpoint and cached process-wide until shortly before expiry.
//! Minting is single-flight: one refresh in flight, concurrent callers wait
//! on it (bounded) or read the previous still-valid token.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::config::SheetsConfig;
use crate::error::{StoreError, StoreErrorKind, StoreOperation};

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are considered stale this many seconds before actual expiry.
const REFRESH_SKEW_SECS: i64 = 60;

/// Assertion lifetime requested from the identity endpoint.
const ASSERTION_TTL_SECS: i64 = 3600;

/// How long a caller waits on an in-flight refresh before giving up.
const SINGLE_FLIGHT_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expiry_epoch: i64,
}

impl CachedToken {
    fn fresh_at(&self, now: i64) -> bool {
        now < self.expiry_epoch - REFRESH_SKEW_SECS
    }
}

/// Mints and caches access tokens for the values API.
pub struct TokenProvider {
    config: SheetsConfig,
    http: reqwest::Client,
    cache: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
    flight_wait: Duration,
}

impl TokenProvider {
    pub fn new(config: SheetsConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
            flight_wait: SINGLE_FLIGHT_WAIT,
        }
    }

    #[cfg(test)]
    fn with_flight_wait(mut self, wait: Duration) -> Self {
        self.flight_wait = wait;
        self
    }

    /// Return a valid access token, minting one if the cache is empty or
    /// within the refresh skew of expiry.
    pub async fn get(&self) -> Result<String, StoreError> {
        let now = Utc::now().timestamp();
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fresh_at(now) {
                return Ok(cached.token.clone());
            }
        }

        let _flight = tokio::time::timeout(self.flight_wait, self.refresh.lock())
            .await
            .map_err(|_| {
                StoreError::transient(StoreOperation::Token, "token refresh wait timed out")
            })?;

        // Another flight may have refreshed while we waited.
        let now = Utc::now().timestamp();
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fresh_at(now) {
                return Ok(cached.token.clone());
            }
        }

        let minted = self.mint(now).await?;
        let token = minted.token.clone();
        *self.cache.write().await = Some(minted);
        Ok(token)
    }

    async fn mint(&self, now: i64) -> Result<CachedToken, StoreError> {
        let assertion = self.sign_assertion(now)?;

        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                StoreError::transient(
                    StoreOperation::Token,
                    format!("token exchange unreachable: {}", sanitize_reqwest(&e)),
                )
            })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(StoreError::new(
                StoreOperation::Token,
                StoreErrorKind::AuthFailed,
                format!("token exchange rejected with status {}", status.as_u16()),
            ));
        }
        if !status.is_success() {
            return Err(StoreError::transient(
                StoreOperation::Token,
                format!("token exchange failed with status {}", status.as_u16()),
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|_| {
            StoreError::internal(StoreOperation::Token, "token response was not valid JSON")
        })?;

        Ok(CachedToken {
            token: body.access_token,
            expiry_epoch: now + body.expires_in,
        })
    }

    fn sign_assertion(&self, now: i64) -> Result<String, StoreError> {
        if self.config.client_email.is_empty() || self.config.private_key_pem.is_empty() {
            return Err(StoreError::not_configured(
                StoreOperation::Token,
                "service account credentials are missing",
            ));
        }

        let key = EncodingKey::from_rsa_pem(self.config.private_key_pem.as_bytes()).map_err(
            |_| {
                StoreError::not_configured(
                    StoreOperation::Token,
                    "service account private key is not valid PEM",
                )
            },
        )?;

        let claims = AssertionClaims {
            iss: &self.config.client_email,
            scope: SCOPE,
            aud: &self.config.token_endpoint,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|_| {
            StoreError::not_configured(
                StoreOperation::Token,
                "failed to sign assertion with the configured key",
            )
        })
    }
}

/// Error text without URLs, which can embed the spreadsheet id.
fn sanitize_reqwest(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect error"
    } else {
        "request error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(email: &str, pem: &str) -> TokenProvider {
        let config = SheetsConfig {
            client_email: email.to_string(),
            private_key_pem: pem.to_string(),
            spreadsheet_id: "sheet-1".to_string(),
            ..Default::default()
        };
        TokenProvider::new(config, reqwest::Client::new())
    }

    #[test]
    fn test_missing_credentials_not_configured() {
        let p = provider("", "");
        let err = p.sign_assertion(1_700_000_000).unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotConfigured);
    }

    #[test]
    fn test_malformed_pem_not_configured() {
        let p = provider("svc@example.iam.gserviceaccount.com", "not a pem");
        let err = p.sign_assertion(1_700_000_000).unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotConfigured);
    }

    #[test]
    fn test_freshness_window() {
        let cached = CachedToken {
            token: "t".to_string(),
            expiry_epoch: 1_000,
        };
        assert!(cached.fresh_at(1_000 - REFRESH_SKEW_SECS - 1));
        assert!(!cached.fresh_at(1_000 - REFRESH_SKEW_SECS));
        assert!(!cached.fresh_at(1_000));
    }

    #[tokio::test]
    async fn test_flight_wait_surfaces_transient() {
        let p = provider("svc@example.iam.gserviceaccount.com", "not a pem")
            .with_flight_wait(Duration::from_millis(20));
        // an in-flight refresh that never finishes
        let _held = p.refresh.lock().await;

        let err = p.get().await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::UpstreamTransient);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_fresh_token_served_during_refresh() {
        let p = provider("svc@example.iam.gserviceaccount.com", "not a pem")
            .with_flight_wait(Duration::from_millis(20));
        *p.cache.write().await = Some(CachedToken {
            token: "cached".to_string(),
            expiry_epoch: Utc::now().timestamp() + 3600,
        });
        // another flight holds the refresh lock; the fast path must not block
        let _held = p.refresh.lock().await;

        assert_eq!(p.get().await.unwrap(), "cached");
    }
}
