use chrono::Duration;
use derive_more::Display;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:venue_hub.db?mode=rwc";

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Display)]
#[display("invalid value {value:?} for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::error::Error for ConfigError {}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_connections: 5,
            session_ttl_hours: 24 * 7,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT", defaults.port)?,
            max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            session_ttl_hours: parse_within(
                &lookup,
                "SESSION_TTL_HOURS",
                defaults.session_ttl_hours,
                1..=MAX_SESSION_TTL_HOURS,
            )?,
            bcrypt_cost: parse(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { key, value }),
    }
}

fn parse_within<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + ToString,
{
    let value = parse(lookup, key, default)?;
    if !range.contains(&value) {
        return Err(ConfigError {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(settings.session_ttl(), Duration::hours(168));
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_address(), ("0.0.0.0".to_string(), 9000));
        assert_eq!(settings.bcrypt_cost, 4);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let error = Settings::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(error.key, "PORT");
        assert_eq!(error.to_string(), "invalid value \"eighty\" for PORT");
    }

    #[test]
    fn session_lifetimes_outside_the_bound_are_rejected() {
        for raw in ["0", "-5", "9223372036854775807", "87601"] {
            let error = Settings::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", raw)]))
                .unwrap_err();
            assert_eq!(error.key, "SESSION_TTL_HOURS", "value {raw}");
        }

        let longest = Settings::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "87600")]))
            .unwrap();
        assert_eq!(longest.session_ttl(), Duration::hours(MAX_SESSION_TTL_HOURS));
    }
}
