// Runtime configuration
// Read once from the environment (and .env) at start-up

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_SECRET: &str = "dev-secret-key";
const DEFAULT_GENERATION_FUNCTION: &str = "generate-ad";
const DEFAULT_COST_PER_SAMPLE: u32 = 1;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_STARTING_CREDITS: u32 = 10;
const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Where the hosted backend lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaasConfig {
    pub url: String,
    pub anon_key: String,
    pub generation_function: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` runs against in-memory collaborators
    pub baas: Option<BaasConfig>,
    pub cost_per_sample: u32,
    pub generation_timeout: Duration,
    pub starting_credits: u32,
    /// Sessions untouched for this long are discarded
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Loads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_var(
            "BIND_ADDR",
            var("BIND_ADDR"),
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        )?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let baas = match (var("BAAS_URL"), var("BAAS_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(BaasConfig {
                url,
                anon_key,
                generation_function: var("GENERATION_FUNCTION")
                    .unwrap_or_else(|| DEFAULT_GENERATION_FUNCTION.to_string()),
            }),
            _ => {
                tracing::warn!("BAAS_URL or BAAS_ANON_KEY not set, using in-memory collaborators");
                None
            }
        };

        let cost_per_sample: u32 = parse_var(
            "COST_PER_SAMPLE",
            var("COST_PER_SAMPLE"),
            DEFAULT_COST_PER_SAMPLE,
        )?;
        if cost_per_sample == 0 {
            return Err(ConfigError::Invalid {
                name: "COST_PER_SAMPLE",
                value: "0".to_string(),
            });
        }

        let timeout_secs: u64 = parse_var(
            "GENERATION_TIMEOUT_SECS",
            var("GENERATION_TIMEOUT_SECS"),
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )?;

        let starting_credits = parse_var(
            "STARTING_CREDITS",
            var("STARTING_CREDITS"),
            DEFAULT_STARTING_CREDITS,
        )?;

        let session_ttl_secs: u64 = parse_var(
            "SESSION_TTL_SECS",
            var("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            baas,
            cost_per_sample,
            generation_timeout: Duration::from_secs(timeout_secs),
            starting_credits,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
