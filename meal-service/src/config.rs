use anyhow::{anyhow, Context, Result};
use common_auth::JwtConfig;
use std::env;
use std::fmt;

const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_leeway_seconds: u32,
    /// Mounts `/bypass-login`, which issues tokens without a password check.
    pub allow_bypass_login: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl ServiceConfig {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_issuer.clone())
            .with_leeway(self.jwt_leeway_seconds)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("allow_bypass_login", &self.allow_bypass_login)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish_non_exhaustive()
    }
}

pub fn load_service_config() -> Result<ServiceConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = env::var("JWT_SECRET")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("JWT_SECRET must be set to a non-empty value"))?;

    let jwt_issuer = env::var("JWT_ISSUER")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| "meal-service".to_string());

    let jwt_leeway_seconds = match env::var("JWT_LEEWAY_SECONDS") {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid JWT_LEEWAY_SECONDS '{value}'"))?,
        Err(_) => 0,
    };

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match env::var("PORT") {
        Ok(value) => value
            .trim()
            .parse::<u16>()
            .with_context(|| format!("Invalid PORT '{value}'"))?,
        Err(_) => 5000,
    };

    let allow_bypass_login = bool_from_env("ALLOW_BYPASS_LOGIN").unwrap_or(false);

    let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|value| parse_list(&value))
        .unwrap_or_else(|| DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect());

    Ok(ServiceConfig {
        host,
        port,
        database_url,
        jwt_secret,
        jwt_issuer,
        jwt_leeway_seconds,
        allow_bypass_login,
        cors_allowed_origins,
    })
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
