use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::services::calendar::Weekday;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    pub auth_rate_limit_max: u32,
    pub auth_rate_limit_window_secs: u64,

    // Month view defaults
    pub calendar_first_weekday: Weekday,
    pub calendar_locale: String,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let first_weekday: i64 = var_or("CALENDAR_FIRST_WEEKDAY", 0)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 20)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: var_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|extra| {
                    extra
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_access_ttl_secs: var_or("JWT_ACCESS_TTL_SECS", 900)?,
            jwt_refresh_ttl_secs: var_or("JWT_REFRESH_TTL_SECS", 604_800)?,

            auth_rate_limit_max: var_or("AUTH_RATE_LIMIT_MAX", 5)?,
            auth_rate_limit_window_secs: var_or("AUTH_RATE_LIMIT_WINDOW_SECS", 60)?,

            calendar_first_weekday: Weekday::new(first_weekday)
                .context("CALENDAR_FIRST_WEEKDAY must be between 0 (Sunday) and 6 (Saturday)")?,
            calendar_locale: env::var("CALENDAR_LOCALE").unwrap_or_else(|_| "en-US".into()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/daylog_test".into(),
            database_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: "test-secret-do-not-use".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 3600,
            auth_rate_limit_max: 5,
            auth_rate_limit_window_secs: 60,
            calendar_first_weekday: Weekday::SUNDAY,
            calendar_locale: "en-US".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_or_uses_default_when_unset() {
        let value: u16 = var_or("DAYLOG_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_var_or_reports_bad_value() {
        env::set_var("DAYLOG_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = var_or("DAYLOG_TEST_BAD_PORT", 8080);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("DAYLOG_TEST_BAD_PORT"));
        env::remove_var("DAYLOG_TEST_BAD_PORT");
    }

    #[test]
    fn test_listen_addr() {
        let config = Config::for_tests();
        assert_eq!(config.listen_addr(), "127.0.0.1:0");
    }
}
