//! Process-wide configuration, read once from the environment at startup and
//! immutable afterwards. Every handler sees the same values for the token
//! signing secret, the upload sandbox root and the public base URL.

use std::time::Duration;

/// Default bearer-token lifetime in hours.
const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub http_port: u16,
    /// Symmetric key for HS256 token signing. Never logged.
    pub jwt_secret: String,
    /// Sandbox root directory for uploaded pictures.
    pub upload_dir: String,
    /// Externally reachable base URL used to build picture references.
    pub public_base_url: String,
    /// Bearer-token lifetime.
    pub token_ttl: Duration,
}

impl AppConfig {
    /// Read configuration from `CHALET_*` environment variables. Everything
    /// has a default except the signing secret, which must be provided.
    pub fn from_env() -> anyhow::Result<Self> {
        let http_port: u16 = std::env::var("CHALET_HTTP_PORT")
            .unwrap_or_else(|_| "7878".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("CHALET_HTTP_PORT is not a port number: {}", e))?;
        let jwt_secret = match std::env::var("CHALET_JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => anyhow::bail!("CHALET_JWT_SECRET must be set to a non-empty secret"),
        };
        let upload_dir = std::env::var("CHALET_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = std::env::var("CHALET_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", http_port));
        let ttl_hours: u64 = std::env::var("CHALET_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        Ok(Self {
            http_port,
            jwt_secret,
            upload_dir,
            public_base_url,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
        })
    }
}
