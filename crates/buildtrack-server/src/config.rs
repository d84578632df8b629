use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_FROM: &str = "BuildTrack <notifications@buildtrack.local>";

#[derive(Debug)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub media_dir: PathBuf,
    pub public_url: String,
    pub app_url: String,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub dev_endpoints: bool,
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("BUILDTRACK_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BUILDTRACK_JWT_SECRET is unset or still a placeholder");
        }

        let port = parse_or(var("BUILDTRACK_PORT"), "BUILDTRACK_PORT", 3000u16)?;
        let public_url = var("BUILDTRACK_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();
        let app_url = var("BUILDTRACK_APP_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| public_url.clone());

        let resend_api_key = var("RESEND_API_KEY");
        if resend_api_key.is_none() {
            warn!("RESEND_API_KEY not set, outgoing email is disabled");
        }

        let admin = match (var("BUILDTRACK_ADMIN_EMAIL"), var("BUILDTRACK_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (None, None) => None,
            _ => bail!("BUILDTRACK_ADMIN_EMAIL and BUILDTRACK_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            jwt_secret,
            db_path: var("BUILDTRACK_DB_PATH").unwrap_or_else(|| "buildtrack.db".into()).into(),
            host: var("BUILDTRACK_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            media_dir: var("BUILDTRACK_MEDIA_DIR").unwrap_or_else(|| "./media".into()).into(),
            public_url,
            app_url,
            resend_api_key,
            email_from: var("BUILDTRACK_EMAIL_FROM").unwrap_or_else(|| DEFAULT_FROM.into()),
            dev_endpoints: parse_or(var("BUILDTRACK_DEV_ENDPOINTS"), "BUILDTRACK_DEV_ENDPOINTS", false)?,
            admin,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid {} value '{}'", key, value)),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
