//! Service account credentials
use jsonwebtoken::EncodingKey;
use serde::Deserialize;

use crate::calendar::CalendarError;

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Key file downloaded from the Google Cloud console for a service account
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// A parsed key together with its signing key, ready to mint assertions
#[derive(Clone)]
pub struct ServiceAccount {
    pub key: ServiceAccountKey,
    pub signing_key: EncodingKey,
}

impl ServiceAccount {
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }
}

/// Load the service account from its serialized JSON form. Anything short
/// of a usable RSA key is a configuration error.
pub fn load_service_account(
    credentials_json: Option<&str>,
) -> Result<ServiceAccount, CalendarError> {
    let json = credentials_json.ok_or_else(|| {
        CalendarError::Configuration("GOOGLE_CREDENTIALS_JSON is not set".to_string())
    })?;

    let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
        CalendarError::Configuration(format!(
            "GOOGLE_CREDENTIALS_JSON is not a service account key: {}",
            e
        ))
    })?;

    if let Some(key_type) = key.key_type.as_deref()
        && key_type != "service_account"
    {
        return Err(CalendarError::Configuration(format!(
            "Expected a service_account credential, got {}",
            key_type
        )));
    }

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
        CalendarError::Configuration(format!("Invalid service account private key: {}", e))
    })?;

    Ok(ServiceAccount { key, signing_key })
}

/// Service account JSON signed by the RSA key in `tests/data`
#[cfg(test)]
pub(crate) fn test_credentials_json(token_uri: &str) -> String {
    let private_key = std::fs::read_to_string("./tests/data/test_service_account_key.pem")
        .expect("Missing test private key");
    serde_json::json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "test-key-id",
        "private_key": private_key,
        "client_email": "calendar-reader@test-project.iam.gserviceaccount.com",
        "client_id": "1234567890",
        "token_uri": token_uri,
    })
    .to_string()
}
