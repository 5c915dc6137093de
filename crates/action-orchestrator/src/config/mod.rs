use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::evidence::EvidencePolicy;
use crate::workflows::orchestration::{RiskLevel, SuppressionPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub evidence: EvidencePolicy,
    pub suppression: SuppressionPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = EvidencePolicy::default();
        let max_photos = parse_var("EVIDENCE_MAX_PHOTOS", defaults.max_photos)?;
        let max_photo_bytes = parse_var("EVIDENCE_MAX_PHOTO_BYTES", defaults.max_photo_bytes)?;
        if max_photos == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "EVIDENCE_MAX_PHOTOS",
            });
        }

        let suppression_defaults = SuppressionPolicy::default();
        let stale_after_days = parse_var(
            "SIGNAL_STALE_AFTER_DAYS",
            suppression_defaults.stale_after_days,
        )?;
        let minimum_risk = match env::var("SIGNAL_MINIMUM_RISK") {
            Ok(raw) => RiskLevel::parse_label(&raw).ok_or(ConfigError::InvalidRiskLevel(raw))?,
            Err(_) => suppression_defaults.minimum_risk,
        };
        let suppression = SuppressionPolicy {
            stale_after_days,
            minimum_risk,
        };
        if suppression.stale_window().is_none() {
            return Err(ConfigError::InvalidNumber {
                variable: "SIGNAL_STALE_AFTER_DAYS",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            evidence: EvidencePolicy {
                max_photos,
                max_photo_bytes,
            },
            suppression,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    InvalidRiskLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a positive integer")
            }
            ConfigError::InvalidRiskLevel(value) => write!(
                f,
                "SIGNAL_MINIMUM_RISK must be one of low, medium, high, critical (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidRiskLevel(_) => None,
        }
    }
}
