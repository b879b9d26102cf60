use crate::logger::{error::LoggerError, format::LoggerFormat};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `scout_discover=debug,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Build from the textual values usually found in env vars.
    pub fn parse(format: &str, level: &str) -> Result<Self, LoggerError> {
        let format = format.parse::<LoggerFormat>()?;
        let level = level.trim();
        if level.is_empty() {
            return Err(LoggerError::InvalidLogLevel(level.to_string()));
        }
        Ok(Self {
            format,
            level: level.to_string(),
            ..Default::default()
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: atty::is(atty::Stream::Stdout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_format() {
        let cfg = LoggerConfig::parse("JSON", "debug").unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, "debug");
        assert!(cfg.with_targets);
    }

    #[test]
    fn parse_rejects_unknown_format() {
        let err = LoggerConfig::parse("xml", "info").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidFormat(_)));
    }

    #[test]
    fn parse_rejects_blank_level() {
        let err = LoggerConfig::parse("text", "  ").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLogLevel(_)));
    }
}
