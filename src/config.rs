use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Reject malformed availability dates instead of ignoring them
    pub availability_fail_closed: bool,
    pub enforce_status_transitions: bool,
    /// Serialize check-and-write per vehicle so overlapping active bookings cannot both land
    pub guard_booking_overlaps: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parsed("SERVER_PORT", 3000)?,
            availability_fail_closed: parsed("AVAILABILITY_FAIL_CLOSED", false)?,
            enforce_status_transitions: parsed("ENFORCE_STATUS_TRANSITIONS", true)?,
            guard_booking_overlaps: parsed("GUARD_BOOKING_OVERLAPS", true)?,
            rate_limit_per_second: parsed("RATE_LIMIT_PER_SECOND", 2)?,
            rate_limit_burst: parsed("RATE_LIMIT_BURST", 100)?,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@fleet360.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> AppResult<String> {
    env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

fn parsed<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
