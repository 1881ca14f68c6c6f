//! OAuth 2.0 JWT bearer grant for service accounts. See
//! https://developers.google.com/identity/protocols/oauth2/service-account
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::credentials::{CALENDAR_READONLY_SCOPE, ServiceAccount};
use crate::calendar::CalendarError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh a little before Google does
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Sign a self-issued assertion for the calendar read-only scope
pub fn build_assertion(
    account: &ServiceAccount,
    now: DateTime<Utc>,
) -> Result<String, CalendarError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = account.key.private_key_id.clone();

    let claims = AssertionClaims {
        iss: account.key.client_email.clone(),
        scope: CALENDAR_READONLY_SCOPE.to_string(),
        aud: account.key.token_uri.clone(),
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };

    encode(&header, &claims, &account.signing_key).map_err(|e| CalendarError::Internal(e.into()))
}

/// Trade a signed assertion for an access token. A rejection by the token
/// endpoint means the credential itself is bad.
pub async fn exchange_assertion(
    client: &Client,
    token_uri: &str,
    assertion: &str,
) -> Result<TokenResponse, CalendarError> {
    let res = client
        .post(token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        let reason = serde_json::from_str::<TokenErrorResponse>(&text)
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
        return Err(CalendarError::Authentication { status, reason });
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}

/// Hands out access tokens for one service account, reusing the last one
/// until it is about to expire
pub struct TokenProvider {
    client: Client,
    account: ServiceAccount,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: Client, account: ServiceAccount) -> Self {
        Self {
            client,
            account,
            cached: Mutex::new(None),
        }
    }

    pub fn account(&self) -> &ServiceAccount {
        &self.account
    }

    pub async fn access_token(&self) -> Result<String, CalendarError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref()
            && token
                .expires_at
                .checked_sub_signed(Duration::seconds(EXPIRY_MARGIN_SECS))
                .is_some_and(|refresh_at| refresh_at > now)
        {
            return Ok(token.access_token.clone());
        }

        let assertion = build_assertion(&self.account, now)?;
        let token =
            exchange_assertion(&self.client, &self.account.key.token_uri, &assertion).await?;
        let expires_in = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        tracing::debug!(
            client_email = self.account.client_email(),
            expires_in,
            "Fetched access token"
        );

        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                CalendarError::Internal(anyhow::anyhow!(
                    "Token endpoint returned an unusable expires_in: {}",
                    expires_in
                ))
            })?;

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::credentials::{load_service_account, test_credentials_json};
    use http::StatusCode;
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
    use std::fs;

    fn test_account(token_uri: &str) -> ServiceAccount {
        load_service_account(Some(&test_credentials_json(token_uri))).unwrap()
    }

    #[test]
    fn it_signs_a_verifiable_assertion() {
        let account = test_account("https://oauth2.googleapis.com/token");
        let now = Utc::now();
        let assertion = build_assertion(&account, now).unwrap();

        let header = decode_header(&assertion).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("test-key-id"));

        let public_key =
            fs::read_to_string("./tests/data/test_service_account_key.pub.pem").unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let claims = decode::<AssertionClaims>(
            &assertion,
            &DecodingKey::from_rsa_pem(public_key.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(
            claims.iss,
            "calendar-reader@test-project.iam.gserviceaccount.com"
        );
        assert_eq!(claims.scope, CALENDAR_READONLY_SCOPE);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn it_caches_the_access_token() {
        let mut server = mockito::Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                JWT_BEARER_GRANT.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = TokenProvider::new(Client::new(), test_account(&token_uri));
        assert_eq!(provider.access_token().await.unwrap(), "ya29.test");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.test");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn it_refreshes_an_expiring_token() {
        let mut server = mockito::Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        // Expires inside the refresh margin so every call goes back out
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.short", "expires_in": 10}"#)
            .expect(2)
            .create_async()
            .await;

        let provider = TokenProvider::new(Client::new(), test_account(&token_uri));
        provider.access_token().await.unwrap();
        provider.access_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn it_reports_a_rejected_credential() {
        let mut server = mockito::Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(Client::new(), test_account(&token_uri));
        match provider.access_token().await {
            Err(CalendarError::Authentication { status, reason }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(reason, "Invalid JWT Signature.");
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an authentication error"),
        }
    }

    #[tokio::test]
    async fn it_falls_back_to_the_status_reason() {
        let mut server = mockito::Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(401)
            .with_body("nope")
            .create_async()
            .await;

        let provider = TokenProvider::new(Client::new(), test_account(&token_uri));
        match provider.access_token().await {
            Err(CalendarError::Authentication { status, reason }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(reason, "Unauthorized");
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an authentication error"),
        }
    }

    #[tokio::test]
    async fn it_rejects_an_out_of_range_expiry() {
        let mut server = mockito::Server::new_async().await;
        let token_uri = format!("{}/token", server.url());

        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.forever", "expires_in": 9223372036854775807}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(Client::new(), test_account(&token_uri));
        match provider.access_token().await {
            Err(CalendarError::Internal(err)) => {
                assert!(err.to_string().contains("expires_in"));
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an internal error"),
        }
    }
}
