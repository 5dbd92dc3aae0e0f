//! Environment-driven adapter configuration.
//!
//! Read once per process; the first `Initialize` hook call fixes the values.

use std::sync::OnceLock;
use trt_ep_core::default_log_level;

pub const ENV_LOG_DIR: &str = "TRT_EP_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "TRT_EP_LOG_LEVEL";

static ADAPTER_CONFIG: OnceLock<AdapterConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Absolute log directory; logging stays off when `None`.
    pub log_dir: Option<String>,
    pub log_level: String,
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            log_dir: non_blank(ENV_LOG_DIR),
            log_level: non_blank(ENV_LOG_LEVEL)
                .unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}

/// Process-wide configuration snapshot.
pub fn adapter_config() -> &'static AdapterConfig {
    ADAPTER_CONFIG.get_or_init(AdapterConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::{AdapterConfig, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use trt_ep_core::default_log_level;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AdapterConfig::from_lookup(|name| match name {
            ENV_LOG_DIR => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn reads_trimmed_values() {
        let config = AdapterConfig::from_lookup(|name| match name {
            ENV_LOG_DIR => Some(" /var/log/trt ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            _ => None,
        });
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/trt"));
        assert_eq!(config.log_level, "warn");
    }
}
