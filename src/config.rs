use std::env;
use std::str::FromStr;

use thiserror::Error;

/// The main port when `TOILETS_PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// The admin port when `TOILETS_ADMIN_PORT` is unset.
pub const DEFAULT_ADMIN_PORT: u16 = 3001;

/// The log level name when `TOILETS_LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
#[error("could not parse {name}={value:?}")]
pub struct ConfigError {
    name: String,
    value: String,
}

/// Settings read from the process environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    pub admin_port: u16,
    pub log_level: String,
}

impl Config {
    /// Reads every setting, falling back to the defaults above.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            port: parse_variable("TOILETS_PORT", DEFAULT_PORT)?,
            admin_port: parse_variable("TOILETS_ADMIN_PORT", DEFAULT_ADMIN_PORT)?,
            log_level: get_variable_or("TOILETS_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        })
    }
}

/// Returns the value of the named environment variable, or `default`
/// if it is unset.
pub fn get_variable_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Parses the named environment variable, or returns `default` if it
/// is unset.
pub fn parse_variable<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError {
            name: name.to_owned(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
