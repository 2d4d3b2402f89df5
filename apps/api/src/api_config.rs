use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use learnhub_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Backing store for role administration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub role_store: RoleStoreConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(env::args().nth(1), |name| env::var(name).ok())
    }

    fn from_source(
        first_argument: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let migrate_only = first_argument.as_deref() == Some("migrate");

        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let role_store = match lookup("ROLE_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => {
                let database_url = lookup("DATABASE_URL")
                    .filter(|value| !value.trim().is_empty())
                    .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
                let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
                    .map(|value| {
                        value.parse::<u32>().map_err(|error| {
                            AppError::Validation(format!(
                                "invalid DATABASE_MAX_CONNECTIONS: {error}"
                            ))
                        })
                    })
                    .transpose()?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS);

                RoleStoreConfig::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => RoleStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && role_store == RoleStoreConfig::Memory {
            return Err(AppError::Validation(
                "migrate requires ROLE_STORE=postgres".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            frontend_url,
            api_host,
            api_port,
            role_store,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
