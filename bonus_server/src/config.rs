//! Server configuration.
//!
//! Values are read from environment variables first, then from the matching command-line flag, and finally fall back
//! to a default. Invalid values are logged and replaced by the default; the server never refuses to start because of a
//! malformed optional setting.
use std::{env, io::Write, time::Duration};

use accrual_client::{AccrualConfig, DEFAULT_ACCRUAL_ADDRESS, DEFAULT_REQUEST_TIMEOUT};
use bonus_common::{
    helpers::{env_millis, env_number},
    Secret,
};
use log::*;
use rand::{rngs::OsRng, RngCore};
use tempfile::NamedTempFile;

use crate::{cli::Arguments, errors::ServerError};

const DEFAULT_RUN_ADDRESS: &str = "localhost:8080";
const DEFAULT_DATABASE_URI: &str = "sqlite://data/bonus_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const GENERATED_KEY_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The `host:port` the HTTP server binds to.
    pub run_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub auth: AuthConfig,
    /// Where and how to reach the accrual service.
    pub accrual: AccrualConfig,
    /// The time between the starts of two accrual poll cycles.
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            run_address: DEFAULT_RUN_ADDRESS.to_string(),
            database_url: DEFAULT_DATABASE_URI.to_string(),
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            accrual: AccrualConfig::new(DEFAULT_ACCRUAL_ADDRESS),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ServerConfig {
    pub fn from_args_and_env(args: &Arguments) -> Self {
        let run_address = setting("RUN_ADDRESS", &args.run_address, DEFAULT_RUN_ADDRESS);
        let database_url = setting("DATABASE_URI", &args.database_uri, DEFAULT_DATABASE_URI);
        let database_max_connections = env_number::<u32>("DATABASE_MAX_CONNECTIONS").filter(|n| *n > 0);
        let database_max_connections = match (database_max_connections, env::var("DATABASE_MAX_CONNECTIONS")) {
            (Some(n), _) => n,
            (None, Ok(s)) => {
                warn!(
                    "🪛️ {s} is not a valid value for DATABASE_MAX_CONNECTIONS. Using the default, \
                     {DEFAULT_MAX_CONNECTIONS}, instead."
                );
                DEFAULT_MAX_CONNECTIONS
            },
            (None, Err(_)) => DEFAULT_MAX_CONNECTIONS,
        };
        let accrual_address = setting("ACCRUAL_SYSTEM_ADDRESS", &args.accrual_address, DEFAULT_ACCRUAL_ADDRESS);
        let request_timeout = env_millis("ACCRUAL_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT);
        let accrual = AccrualConfig::new(&accrual_address).with_request_timeout(request_timeout);
        let poll_interval = env_millis("ACCRUAL_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL);
        let key = env::var("KEY").ok().filter(|s| !s.trim().is_empty()).or_else(|| args.key.clone());
        let auth = match key {
            Some(hex_key) => AuthConfig::try_from_hex(&hex_key).unwrap_or_else(|e| {
                warn!("🪛️ Could not load the token signing key. {e}. Reverting to a random key.");
                AuthConfig::default()
            }),
            None => AuthConfig::default(),
        };
        info!("🪛️ Accrual service: {} (timeout {} ms)", accrual.base_url, accrual.request_timeout.as_millis());
        info!("🪛️ Accrual poll interval: {} ms", poll_interval.as_millis());
        Self { run_address, database_url, database_max_connections, auth, accrual, poll_interval }
    }
}

/// Environment variable, then command-line flag, then default.
fn setting(name: &str, flag: &Option<String>, default: &str) -> String {
    match env::var(name) {
        Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => match flag {
            Some(value) => value.trim().to_string(),
            None => {
                info!("🪛️ {name} is not set. Using the default, {default}.");
                default.to_string()
            },
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign access tokens. Supplied in hex via `KEY`.
    pub token_key: Secret<Vec<u8>>,
}

impl Default for AuthConfig {
    /// Generates a random key for this session.
    ///
    /// Tokens signed with it die with the process, and several instances behind a load balancer will reject each
    /// other's tokens. The key is written to a temporary file so the operator can recover it.
    fn default() -> Self {
        let mut key = vec![0u8; GENERATED_KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        warn!(
            "🚨️🚨️🚨️ The token signing key (KEY) has not been set. I'm using a random value for this session. Every \
             access token will become invalid when the server stops, and multiple server instances will NOT accept \
             each other's tokens. DO NOT operate in production like this. 🚨️🚨️🚨️"
        );
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        match &mut tmpfile {
            Some((f, p)) => match writeln!(f, "{}", hex::encode(&key)) {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The token signing key for this session was written to {}. If this is a production \
                     instance, you are doing it wrong! Set the KEY environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the token signing key to the temporary file. {e}"),
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the token signing key.");
            },
        }
        Self { token_key: Secret::new(key) }
    }
}

impl AuthConfig {
    pub fn new(key: Vec<u8>) -> Self {
        Self { token_key: Secret::new(key) }
    }

    pub fn try_from_hex(hex_key: &str) -> Result<Self, ServerError> {
        let key = hex::decode(hex_key.trim())
            .map_err(|e| ServerError::ConfigurationError(format!("KEY is not a valid hex string: {e}")))?;
        if key.is_empty() {
            return Err(ServerError::ConfigurationError("KEY is empty".to_string()));
        }
        Ok(Self::new(key))
    }
}
