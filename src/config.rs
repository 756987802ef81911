use anyhow::{Context, Result};

const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub api_base: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    let access_token = std::env::var("SPOTIFY_ACCESS_TOKEN")
        .context("SPOTIFY_ACCESS_TOKEN must be set to a valid bearer token")?;
    let api_base =
        std::env::var("SPOTIFY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Config {
        api_base,
        access_token,
        timeout_secs,
    })
}
