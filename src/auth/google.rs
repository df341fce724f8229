use anyhow::Context;
use axum::async_trait;
use serde::Deserialize;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> anyhow::Result<GoogleProfile>;
}

/// Verifies ID tokens against Google's tokeninfo endpoint; Google checks the
/// signature, we check the audience.
pub struct TokenInfoVerifier {
    http: reqwest::Client,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: Option<String>,
}

impl TokenInfoVerifier {
    pub fn new(client_id: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Google tokeninfo HTTP client")?;
        Ok(Self {
            http,
            client_id: client_id.into(),
        })
    }
}

#[async_trait]
impl GoogleVerifier for TokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> anyhow::Result<GoogleProfile> {
        let resp = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .context("tokeninfo request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("tokeninfo rejected the token: {}", resp.status());
        }

        let info: TokenInfo = resp.json().await.context("tokeninfo body")?;
        if info.aud != self.client_id {
            anyhow::bail!("token audience mismatch");
        }

        Ok(GoogleProfile {
            sub: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        })
    }
}
