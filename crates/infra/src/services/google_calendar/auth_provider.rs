use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::warn;

use crate::services::feed_provider::IAccessTokenProvider;

// https://developers.google.com/identity/protocols/oauth2/web-server#httprest_3

const TOKEN_REFETCH_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v4/token";

const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
const GOOGLE_REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";

struct RefreshTokenRequest {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    access_token: String,
    // Access token expiry specified in seconds
    expires_in: i64,
}

async fn refresh_access_token(req: &RefreshTokenRequest) -> anyhow::Result<RefreshTokenResponse> {
    let params = [
        ("client_id", req.client_id.as_str()),
        ("client_secret", req.client_secret.as_str()),
        ("refresh_token", req.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    let client = reqwest::Client::new();
    let res = client
        .post(TOKEN_REFETCH_ENDPOINT)
        .form(&params)
        .send()
        .await
        .context("Unable to reach google oauth token endpoint")?;

    if !res.status().is_success() {
        return Err(anyhow!(
            "Google oauth token endpoint returned status: {}",
            res.status()
        ));
    }

    res.json::<RefreshTokenResponse>()
        .await
        .context("Unexpected response from google oauth token endpoint")
}

struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Long-lived refresh token exchanged for short-lived access tokens,
/// cached until shortly before expiry.
pub struct GoogleAuthProvider {
    credentials: RefreshTokenRequest,
    cached: Mutex<Option<CachedAccessToken>>,
}

impl GoogleAuthProvider {
    pub fn from_env() -> anyhow::Result<Self> {
        let read = |key: &str| {
            std::env::var(key).with_context(|| format!("{} env var to be present", key))
        };
        Ok(Self {
            credentials: RefreshTokenRequest {
                client_id: read(GOOGLE_CLIENT_ID)?,
                client_secret: read(GOOGLE_CLIENT_SECRET)?,
                refresh_token: read(GOOGLE_REFRESH_TOKEN)?,
            },
            cached: Mutex::new(None),
        })
    }
}

#[async_trait::async_trait]
impl IAccessTokenProvider for GoogleAuthProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.cached.lock().await;

        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            // Leave a minute of slack so a token never expires mid-request
            if now + Duration::minutes(1) <= token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let tokens = refresh_access_token(&self.credentials)
            .await
            .map_err(|e| {
                warn!("Unable to refresh google access token. Error: {:?}", e);
                e
            })?;
        let access_token = tokens.access_token.clone();
        *cached = Some(CachedAccessToken {
            token: tokens.access_token,
            expires_at: now + Duration::seconds(tokens.expires_in),
        });

        Ok(access_token)
    }
}
