use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::prediction::domain::EsgWeights;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

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

/// Top-level configuration for the application. Loaded once at startup and
/// passed explicitly into the services that need it; nothing here is global
/// or mutated after load.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub esg_weights: EsgWeights,
    pub llm: LlmConfig,
    pub data: DataConfig,
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

        let defaults = EsgWeights::default();
        let esg_weights = EsgWeights {
            environment: weight_var("ESG_WEIGHT_ENVIRONMENT", defaults.environment)?,
            social: weight_var("ESG_WEIGHT_SOCIAL", defaults.social)?,
            governance: weight_var("ESG_WEIGHT_GOVERNANCE", defaults.governance)?,
        };
        if (esg_weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights {
                sum: esg_weights.sum(),
            });
        }

        let llm = LlmConfig {
            api_key: env::var("GROQ_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com".to_string()),
            model: env::var("GROQ_MODEL_NAME").unwrap_or_else(|_| "llama3-70b-8192".to_string()),
        };

        let data = DataConfig {
            companies_path: env::var("COMPANY_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/unique_companies_dataset.csv")),
            models_dir: env::var("MODELS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("final_models")),
            risk_strategy: RiskStrategyKind::from_env(
                &env::var("RISK_STRATEGY").unwrap_or_else(|_| "formula".to_string()),
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            esg_weights,
            llm,
            data,
        })
    }
}

fn weight_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidWeight { name }),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Remote completion service settings. A missing API key is not an error:
/// the service starts degraded and every report comes from the local
/// fallback.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// On-disk assets: the company dataset and the optional model artifacts.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub companies_path: PathBuf,
    pub models_dir: PathBuf,
    pub risk_strategy: RiskStrategyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskStrategyKind {
    Formula,
    Model,
}

impl RiskStrategyKind {
    fn from_env(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "formula" => Ok(Self::Formula),
            "model" => Ok(Self::Model),
            other => Err(ConfigError::InvalidRiskStrategy {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { name: &'static str },
    InvalidWeights { sum: f64 },
    InvalidRiskStrategy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { name } => {
                write!(f, "{name} must be a finite float")
            }
            ConfigError::InvalidWeights { sum } => {
                write!(f, "ESG weights must sum to 1.0 (got {sum})")
            }
            ConfigError::InvalidRiskStrategy { value } => {
                write!(f, "RISK_STRATEGY must be 'formula' or 'model' (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ESG_WEIGHT_ENVIRONMENT",
            "ESG_WEIGHT_SOCIAL",
            "ESG_WEIGHT_GOVERNANCE",
            "GROQ_API_KEY",
            "GROQ_BASE_URL",
            "GROQ_MODEL_NAME",
            "COMPANY_DATA_PATH",
            "MODELS_PATH",
            "RISK_STRATEGY",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.esg_weights, EsgWeights::default());
        assert_eq!(config.data.risk_strategy, RiskStrategyKind::Formula);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, "llama3-70b-8192");
    }

    #[test]
    fn weights_must_sum_to_one() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ESG_WEIGHT_ENVIRONMENT", "0.9");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeights { .. }));
        reset_env();
    }

    #[test]
    fn unknown_risk_strategy_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RISK_STRATEGY", "oracle");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRiskStrategy { .. }));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }
}
