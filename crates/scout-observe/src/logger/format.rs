use std::str::FromStr;

use crate::logger::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerFormat {
    Text,
    Json,
    Journald,
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => journald_format(),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_format() -> Result<LoggerFormat, LoggerError> {
    Ok(LoggerFormat::Journald)
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_format() -> Result<LoggerFormat, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}
