use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Deployment environment
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Socket address the server binds to, from `HOST` and `PORT`.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid HOST value"))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name the session token travels under.
    pub cookie_name: String,
    /// Absolute session lifetime in days.
    pub ttl_days: i64,
    /// `Secure` cookie attribute; on in production.
    pub cookie_secure: bool,
    /// `SameSite` attribute: `Strict` in production, `Lax` in development.
    pub same_site: String,
}

impl Config {
    /// Load configuration from environment variables with safe-for-dev defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let production = environment == Environment::Production;

        let config = Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3001".to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?,
                cors_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| "cadence_session".to_string()),
                ttl_days: env::var("SESSION_TTL_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .unwrap_or(7),
                cookie_secure: production,
                same_site: if production { "Strict" } else { "Lax" }.to_string(),
            },
            environment,
        };

        Ok(config)
    }

    /// Configuration used by the test suites: development flags, 7-day sessions.
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            session: SessionConfig {
                cookie_name: "cadence_session".to_string(),
                ttl_days: 7,
                cookie_secure: false,
                same_site: "Lax".to_string(),
            },
            environment: Environment::Development,
        }
    }
}
