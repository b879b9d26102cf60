mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Can only succeed once per process; later calls return
/// [`LoggerError::AlreadyInitialized`].
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::install_text(cfg),
        LoggerFormat::Json => log::install_json(cfg),
        LoggerFormat::Journald => log::install_journald(cfg),
    }
}
