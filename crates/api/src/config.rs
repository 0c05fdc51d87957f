//! Process configuration, read once from the environment at startup.

use std::env::VarError;
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

use grails_auth::{KeyError, SigningKey};

use crate::cors::AllowedOrigins;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/grails";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    SigningKey(#[from] KeyError),

    #[error("PORT must be a port number, got {value:?}")]
    InvalidPort { value: String },

    #[error("{name} is not valid unicode")]
    NotUnicode { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Deployment environment; empty for local development.
    pub environment: String,
    pub port: u16,
    pub cors_origins: AllowedOrigins,
    pub signing_key: SigningKey,
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// `lookup` answers like [`std::env::var`], so unset and undecodable
    /// values stay distinguishable.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<Self, ConfigError> {
        // Undecodable still means set: it must not fall back to the dev key.
        let environment = match lookup("ENVIRONMENT") {
            Ok(value) => value,
            Err(VarError::NotPresent) => String::new(),
            Err(VarError::NotUnicode(raw)) => raw.to_string_lossy().into_owned(),
        };
        let key = match lookup("JWT_SIGNING_KEY") {
            Ok(key) => Some(key),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) if environment.is_empty() => None,
            Err(VarError::NotUnicode(_)) => return Err(KeyError::NotUnicode.into()),
        };
        let signing_key = SigningKey::select(Some(environment.as_str()), key.as_deref())?;

        let port = match optional(&lookup, "PORT")?.filter(|p| !p.is_empty()) {
            None => DEFAULT_PORT,
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
        };

        let cors_origins = AllowedOrigins::parse(&optional(&lookup, "CORS_ORIGINS")?.unwrap_or_default());
        let database_url = optional(&lookup, "DATABASE_URL")?
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            environment,
            port,
            cors_origins,
            signing_key,
            database_url,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_empty()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn optional(
    lookup: &impl Fn(&str) -> Result<String, VarError>,
    name: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
    }
}
