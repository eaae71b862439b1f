use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::db::PoolSettings;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Bearer token guarding `/sensor/*`. `None` leaves the routes open.
    pub api_token: Option<String>,
    pub pool: PoolSettings,
    /// Apply the bundled migrations before serving.
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a `Config` from an arbitrary key lookup. `from_env` is this
    /// over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let pool = PoolSettings {
            max_connections: env
                .optional("DB_MAX_CONNECTIONS", "100")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            min_connections: env
                .optional("DB_MIN_CONNECTIONS", "10")
                .parse()
                .context("DB_MIN_CONNECTIONS must be a positive integer")?,
            max_lifetime: Duration::from_secs(
                env.optional("DB_MAX_LIFETIME_SECS", "3600")
                    .parse()
                    .context("DB_MAX_LIFETIME_SECS must be a positive integer")?,
            ),
            idle_timeout: Duration::from_secs(
                env.optional("DB_IDLE_TIMEOUT_SECS", "600")
                    .parse()
                    .context("DB_IDLE_TIMEOUT_SECS must be a positive integer")?,
            ),
        };
        ensure!(
            pool.min_connections <= pool.max_connections,
            "DB_MIN_CONNECTIONS ({}) must not exceed DB_MAX_CONNECTIONS ({})",
            pool.min_connections,
            pool.max_connections
        );

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            server_host: env.optional("SERVER_HOST", "0.0.0.0"),
            server_port: env
                .optional("PORT", "3000")
                .parse()
                .context("PORT must be a valid port number")?,
            api_token: env
                .get("API_TOKEN")
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty()),
            pool,
            run_migrations: parse_bool(&env.optional("RUN_MIGRATIONS", "true"))
                .context("RUN_MIGRATIONS must be true or false")?,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .with_context(|| format!("missing required env var: {key}"))
    }

    fn optional(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("not a boolean: {other:?}")),
    }
}
