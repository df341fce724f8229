use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub tokens: TokenConfig,
    /// Public base URL used to build absolute image links.
    pub server_url: String,
    /// Root directory for uploaded images (post_images/, profile_images/).
    pub images_root: String,
    pub google_client_id: String,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let tokens = TokenConfig {
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            access_ttl_seconds: std::env::var("ACCESS_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(15 * 60),
        };
        let ai = AiConfig {
            api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            api_base: std::env::var("AI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
        };
        Ok(Self {
            database_url,
            tokens,
            server_url: std::env::var("SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            images_root: std::env::var("IMAGES_ROOT")
                .unwrap_or_else(|_| "images_storage".into()),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            ai,
        })
    }
}
