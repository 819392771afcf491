use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub host: String,
    pub port: u16,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("CLASSROOM_API_URL")
            .unwrap_or_else(|| "http://localhost:8080/api".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(format!("CLASSROOM_API_URL must be an http(s) URL, got {}", api_url).into());
        }

        let token = lookup("CLASSROOM_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let token_file = base_dir.join(
            lookup("TOKEN_FILE").unwrap_or_else(|| ".classroom_token".to_string()),
        );

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "5001".to_string())
            .parse()
            .unwrap_or(5001);

        let timeout_secs: u64 = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(30);

        Ok(Self {
            api_url,
            token,
            token_file,
            host,
            port,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
