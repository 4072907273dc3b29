//! Environment-driven configuration.

use time::Duration;

/// Process-wide configuration, read once at startup and immutable after.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` selects the in-memory stores,
    /// which is fine for demos and tests but persists nothing.
    pub database_url: Option<String>,
    pub bind_address: String,
    /// HMAC secret for token signing. Read-only after startup.
    pub jwt_secret: String,
    /// Fixed token TTL.
    pub jwt_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 bytes");
        }

        let ttl_hours: i64 = std::env::var("JWT_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("JWT_TTL_HOURS must be an integer"))?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret,
            jwt_ttl: Duration::hours(ttl_hours),
        })
    }
}
