use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: String,
    pub likes_store_dir: PathBuf,
    pub image_store_dir: PathBuf,
    pub image_public_base_url: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let db_max_connections = parse_u32_env("DB_MAX_CONNECTIONS", 5)?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let likes_store_dir = PathBuf::from(
            std::env::var("LIKES_STORE_DIR").unwrap_or_else(|_| ".pilgrim/likes".to_string()),
        );
        let image_store_dir = PathBuf::from(
            std::env::var("IMAGE_STORE_DIR").unwrap_or_else(|_| ".pilgrim/images".to_string()),
        );
        let image_public_base_url = parse_base_url(
            std::env::var("IMAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/images".to_string()),
            "IMAGE_PUBLIC_BASE_URL",
        )?;

        let geocoder_url = parse_base_url(
            std::env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            "GEOCODER_URL",
        )?;
        let geocoder_user_agent = std::env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| format!("pilgrim-cli/{}", env!("CARGO_PKG_VERSION")));
        let geocoder_timeout_secs = parse_u64_env("GEOCODER_TIMEOUT_SECS", 5)?;

        Ok(Self {
            database_url,
            db_max_connections,
            log_level,
            likes_store_dir,
            image_store_dir,
            image_public_base_url,
            geocoder_url,
            geocoder_user_agent,
            geocoder_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_base_url(raw: String, key: &str) -> Result<String> {
    let value = raw.trim().trim_end_matches('/').to_string();
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(anyhow!("{key} must start with http:// or https://"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
