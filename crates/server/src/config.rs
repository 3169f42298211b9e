//! Runtime configuration read from the environment.

use thiserror::Error;
use utils::rotation::{FIVE_MINUTES_MS, Rotation, RotationWindow};

const DEFAULT_DATABASE_URL: &str = "sqlite://minehub.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CONSULTANT_ROTATION_SECS: i64 = FIVE_MINUTES_MS / 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub consultant_rotation: Rotation,
    pub talent_rotation: Rotation,
}

impl Config {
    /// Read `DATABASE_URL`, `HOST`, `PORT`, `CONSULTANT_ROTATION_SECS`,
    /// `CONSULTANT_PAGE_SIZE` and `TALENT_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let consultant_rotation_secs: i64 = parse_positive(
            &lookup,
            "CONSULTANT_ROTATION_SECS",
            DEFAULT_CONSULTANT_ROTATION_SECS,
        )?;
        let consultant_page_size: usize = parse_positive(
            &lookup,
            "CONSULTANT_PAGE_SIZE",
            Rotation::CONSULTANTS.page_size,
        )?;
        let talent_page_size: usize =
            parse_positive(&lookup, "TALENT_PAGE_SIZE", Rotation::TALENT_HUB.page_size)?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
                reason: "expected a port number",
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            consultant_rotation: Rotation::new(
                RotationWindow::Bucket {
                    width_ms: consultant_rotation_secs.saturating_mul(1000),
                },
                consultant_page_size,
            ),
            talent_rotation: Rotation::new(RotationWindow::CalendarDay, talent_page_size),
        })
    }
}

/// Zero would break pagination and bucketing, so it is rejected here.
fn parse_positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a positive integer",
        }),
    }
}
