//! Paging and logging configuration

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::paging::request::PageWindowRequest;

/// Page-size policy applied to every connection an assembler resolves.
///
/// Both settings are unset by default, in which case requests are executed
/// exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingConfig {
    /// Upper bound for `first` / `last`; larger values are clamped.
    pub max_page_size: Option<i64>,

    /// Used as `first` when a request gives neither `first` nor `last`.
    pub default_page_size: Option<i64>,

    /// Logging setup
    pub logging: LoggingConfig,
}

impl PagingConfig {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let max_page_size = optional_size("RELAY_MAX_PAGE_SIZE")?;
        let default_page_size = optional_size("RELAY_DEFAULT_PAGE_SIZE")?;

        if let (Some(max), Some(default)) = (max_page_size, default_page_size)
            && default > max
        {
            bail!("RELAY_DEFAULT_PAGE_SIZE ({default}) exceeds RELAY_MAX_PAGE_SIZE ({max})");
        }

        Ok(Self {
            max_page_size,
            default_page_size,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Fill in the default page size and clamp to the maximum.
    pub fn apply_page_size(&self, mut request: PageWindowRequest) -> PageWindowRequest {
        if request.first.is_none() && request.last.is_none() {
            request.first = self.default_page_size;
        }
        if let Some(max) = self.max_page_size {
            request.first = request.first.map(|first| first.min(max));
            request.last = request.last.map(|last| last.min(max));
        }
        request
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{other}' (expected 'pretty' or 'json')"),
        }
    }
}

/// Logging setup for [`crate::logging::init_tracing`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_filter: "relay_orm=info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        let format = match env::var("RELAY_LOG_FORMAT") {
            Ok(value) => value.parse().context("Invalid RELAY_LOG_FORMAT")?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            format,
            default_filter: env::var("RELAY_LOG_FILTER")
                .unwrap_or_else(|_| LoggingConfig::default().default_filter),
        })
    }
}

fn optional_size(key: &str) -> Result<Option<i64>> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {key}"))?;
    if value < 0 {
        bail!("{key} must not be negative, got {value}");
    }
    Ok(Some(value))
}
