//! Dialect configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```ignore
//! let config = DialectConfig::from_json(r#"{ "quote_style": "backtick", "log": { "level": "info" } }"#)?;
//! ```

use crate::error::{OrmError, OrmResult};
use crate::quote::QuoteStyle;
use serde::Deserialize;
use std::time::Duration;
use tracing::Level;

/// Identifier quoting, key tracking and SQL logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    pub quote_style: QuoteStyle,
    /// Column name treated as the primary key when no field is flagged.
    pub id_column: String,
    pub log: LogConfig,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            quote_style: QuoteStyle::Double,
            id_column: "id".to_string(),
            log: LogConfig::default(),
        }
    }
}

impl DialectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> OrmResult<Self> {
        serde_json::from_str(json).map_err(|e| OrmError::Other(format!("invalid dialect config: {e}")))
    }

    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// Level names accepted in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// SQL logging settings used by [`TracingExecutor`](crate::monitor::TracingExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level of the per-statement event.
    pub level: LogLevel,
    /// Truncate logged SQL to this many bytes. `None` disables truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are reported at `warn`. `None` disables it.
    pub slow_query_threshold_ms: Option<u64>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            max_sql_length: Some(200),
            slow_query_threshold_ms: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold_ms = Some(u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn slow_query_threshold_duration(&self) -> Option<Duration> {
        self.slow_query_threshold_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = DialectConfig::from_json("{}").unwrap();
        assert_eq!(config, DialectConfig::default());
        assert_eq!(config.id_column, "id");
        assert_eq!(config.quote_style, QuoteStyle::Double);
        assert_eq!(config.log.max_sql_length, Some(200));
    }

    #[test]
    fn json_overrides() {
        let config = DialectConfig::from_json(
            r#"{
                "quote_style": "bracket",
                "id_column": "uid",
                "log": { "level": "warn", "max_sql_length": null, "slow_query_threshold_ms": 250 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.quote_style, QuoteStyle::Bracket);
        assert_eq!(config.id_column, "uid");
        assert_eq!(Level::from(config.log.level), Level::WARN);
        assert_eq!(config.log.max_sql_length, None);
        assert_eq!(
            config.log.slow_query_threshold_duration(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = DialectConfig::from_json(r#"{ "quote_style": "smart" }"#).unwrap_err();
        assert!(matches!(err, OrmError::Other(_)));
    }

    #[test]
    fn builders() {
        let config = DialectConfig::new()
            .with_quote_style(QuoteStyle::Backtick)
            .with_id_column("pk")
            .with_log(LogConfig::new().no_truncate().slow_query_threshold(Duration::from_secs(1)));
        assert_eq!(config.log.slow_query_threshold_ms, Some(1000));
        assert_eq!(config.log.max_sql_length, None);
        assert_eq!(config.quote_style.quote("t"), "`t`");
    }
}
