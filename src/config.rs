use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            body_limit_bytes: 1024 * 1024,
            log: LogConfig {
                filter: "food_catalog=debug,axum=info,tower_http=info".into(),
                format: LogFormat::Text,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("APP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {v}"))?,
            Err(_) => defaults.port,
        };
        let body_limit_bytes = match std::env::var("BODY_LIMIT_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .with_context(|| format!("BODY_LIMIT_BYTES is not a valid size: {v}"))?,
            Err(_) => defaults.body_limit_bytes,
        };

        let log = LogConfig {
            filter: std::env::var("RUST_LOG").unwrap_or(defaults.log.filter),
            format: std::env::var("LOG_FORMAT")
                .map(|v| {
                    if v == "json" {
                        LogFormat::Json
                    } else {
                        LogFormat::Text
                    }
                })
                .unwrap_or(defaults.log.format),
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port,
            body_limit_bytes,
            log,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
