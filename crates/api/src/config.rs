//! Process configuration, read once at startup.
//!
//! Every variable is checked and all problems are reported together, so a
//! broken deployment shows its whole list on the first boot.

use chrono::Duration;
use thiserror::Error;

use basekit_auth::Hs256TokenCodec;
use basekit_core::{AppEnvironment, parse_duration};

const MIN_SECRET_CHARS: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid configuration: {}", .problems.join("; "))]
pub struct ConfigError {
    problems: Vec<String>,
}

impl ConfigError {
    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    /// `*`: mirror the request origin, with credentials.
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expire: Duration,
    pub refresh_secret: Option<String>,
    pub refresh_expire: Duration,
}

impl core::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expire", &self.expire)
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("refresh_expire", &self.refresh_expire)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: AppEnvironment,
    pub port: u16,
    /// Without slashes, e.g. `api`.
    pub api_prefix: String,
    pub postgres: PostgresConfig,
    pub mongo: MongoConfig,
    pub jwt: JwtConfig,
    pub cors: CorsOrigin,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (the process environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut vars = Vars {
            lookup: &lookup,
            problems: Vec::new(),
        };

        let environment = vars.parsed("APP_ENV", AppEnvironment::default(), |raw| raw.parse().ok());
        let port = vars.parsed("PORT", 3000, |raw| raw.parse::<u16>().ok());
        let api_prefix = vars.parsed("API_PREFIX", "api".to_string(), |raw| {
            let prefix = raw.trim().trim_matches('/');
            (!prefix.is_empty()).then(|| prefix.to_string())
        });

        let postgres = PostgresConfig {
            uri: vars.required("POSTGRES_URI"),
            max_connections: vars.parsed("POSTGRES_MAX_CONNECTIONS", 5, |raw| {
                raw.parse::<u32>().ok().filter(|n| *n >= 1)
            }),
        };
        let mongo = MongoConfig {
            uri: vars.required("MONGODB_URI"),
            database: vars.optional("MONGO_DATABASE").unwrap_or_else(|| "backend_events".to_string()),
        };

        let secret = vars.required("JWT_SECRET");
        vars.min_chars("JWT_SECRET", &secret);
        let refresh_secret = vars.optional("JWT_REFRESH_SECRET");
        if let Some(refresh) = &refresh_secret {
            vars.min_chars("JWT_REFRESH_SECRET", refresh);
        }
        let jwt = JwtConfig {
            secret,
            expire: vars.duration("JWT_EXPIRE", "7d"),
            refresh_secret,
            refresh_expire: vars.duration("JWT_REFRESH_EXPIRE", "30d"),
        };

        let cors = match vars.optional("CORS_ORIGIN").as_deref().map(str::trim) {
            None | Some("*") => CorsOrigin::Any,
            Some(list) => {
                let origins: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect();
                if origins.is_empty() {
                    vars.problem("CORS_ORIGIN must be '*' or a comma-separated list of origins");
                }
                CorsOrigin::List(origins)
            }
        };

        if !vars.problems.is_empty() {
            return Err(ConfigError { problems: vars.problems });
        }

        Ok(Self {
            environment,
            port,
            api_prefix,
            postgres,
            mongo,
            jwt,
            cors,
        })
    }

    /// `/api` for the default prefix.
    pub fn base_path(&self) -> String {
        format!("/{}", self.api_prefix)
    }

    pub fn token_codec(&self) -> Hs256TokenCodec {
        let codec = Hs256TokenCodec::new(&self.jwt.secret, self.jwt.expire);
        match &self.jwt.refresh_secret {
            Some(refresh) => codec.with_refresh(refresh, self.jwt.refresh_expire),
            None => codec,
        }
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
    problems: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn problem(&mut self, message: impl Into<String>) {
        self.problems.push(message.into());
    }

    fn required(&mut self, key: &str) -> String {
        self.optional(key).unwrap_or_else(|| {
            self.problem(format!("{key} is required"));
            String::new()
        })
    }

    fn parsed<T>(&mut self, key: &str, default: T, parse: impl Fn(&str) -> Option<T>) -> T {
        match self.optional(key) {
            None => default,
            Some(raw) => parse(&raw).unwrap_or_else(|| {
                self.problem(format!("{key} has an invalid value '{raw}'"));
                default
            }),
        }
    }

    fn duration(&mut self, key: &str, default: &str) -> Duration {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
        match parse_duration(&raw) {
            Ok(duration) => duration,
            Err(e) => {
                self.problem(format!("{key}: {e}"));
                Duration::zero()
            }
        }
    }

    fn min_chars(&mut self, key: &str, value: &str) {
        // A missing value is already reported by `required`.
        if !value.is_empty() && value.chars().count() < MIN_SECRET_CHARS {
            self.problem(format!("{key} must be at least {MIN_SECRET_CHARS} characters"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("POSTGRES_URI", "postgres://localhost/app"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("JWT_SECRET", SECRET),
        ]
    }

    #[test]
    fn defaults_fill_everything_optional() {
        let config = load(&minimal()).unwrap();
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_path(), "/api");
        assert_eq!(config.postgres.max_connections, 5);
        assert_eq!(config.mongo.database, "backend_events");
        assert_eq!(config.jwt.expire, Duration::days(7));
        assert_eq!(config.jwt.refresh_expire, Duration::days(30));
        assert_eq!(config.cors, CorsOrigin::Any);
    }

    #[test]
    fn every_problem_is_reported_at_once() {
        let err = load(&[("JWT_SECRET", "short"), ("PORT", "http"), ("JWT_EXPIRE", "1w")]).unwrap_err();
        let problems = err.problems();
        assert!(problems.contains(&"POSTGRES_URI is required".to_string()));
        assert!(problems.contains(&"MONGODB_URI is required".to_string()));
        assert!(problems.contains(&"JWT_SECRET must be at least 32 characters".to_string()));
        assert!(problems.contains(&"PORT has an invalid value 'http'".to_string()));
        assert!(problems.iter().any(|p| p.starts_with("JWT_EXPIRE")));
        assert_eq!(problems.len(), 5);
    }

    #[test]
    fn prefix_and_cors_are_normalized() {
        let mut pairs = minimal();
        pairs.push(("API_PREFIX", "/v1/"));
        pairs.push(("CORS_ORIGIN", "https://a.example, https://b.example"));
        pairs.push(("APP_ENV", "Production"));
        let config = load(&pairs).unwrap();

        assert_eq!(config.base_path(), "/v1");
        assert_eq!(
            config.cors,
            CorsOrigin::List(vec!["https://a.example".into(), "https://b.example".into()])
        );
        assert_eq!(config.environment, AppEnvironment::Production);
    }

    #[test]
    fn refresh_secret_is_optional_but_checked() {
        let mut pairs = minimal();
        pairs.push(("JWT_REFRESH_SECRET", "tiny"));
        let err = load(&pairs).unwrap_err();
        assert_eq!(err.problems(), ["JWT_REFRESH_SECRET must be at least 32 characters".to_string()]);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = load(&minimal()).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
