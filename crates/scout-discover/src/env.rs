//! Env var helpers that log the value they settle on.

use std::{str::FromStr, time::Duration};

use tracing::{info, warn};

/// String env var, or `default` when unset or empty.
pub fn env_string(name: &str, default: &str) -> String {
    pick(name, std::env::var(name).ok(), default.to_string(), |s| {
        Some(s.to_string())
    })
}

/// Optional string env var; empty counts as unset.
pub fn env_opt_string(name: &str) -> Option<String> {
    let value = std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    info!(var = name, value = value.as_deref().unwrap_or(""), "env");
    value
}

/// Boolean env var (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn env_bool(name: &str, default: bool) -> bool {
    pick(name, std::env::var(name).ok(), default, parse_bool)
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    pick(name, std::env::var(name).ok(), default, |s| u64::from_str(s).ok())
}

/// Duration env var given in whole seconds.
pub fn env_duration_secs(name: &str, default: Duration) -> Duration {
    pick(name, std::env::var(name).ok(), default, |s| {
        u64::from_str(s).ok().map(Duration::from_secs)
    })
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn pick<T, P>(name: &str, raw: Option<String>, default: T, parse: P) -> T
where
    T: std::fmt::Debug,
    P: Fn(&str) -> Option<T>,
{
    let raw = raw.unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        info!(var = name, value = ?default, "env unset; using default");
        return default;
    }
    match parse(trimmed) {
        Some(value) => {
            info!(var = name, raw = trimmed, value = ?value, default = ?default, "env");
            value
        }
        None => {
            warn!(var = name, raw = trimmed, default = ?default, "env value not understood; using default");
            default
        }
    }
}
