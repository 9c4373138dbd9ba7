use std::time::Duration;

use crate::decimal::Rate;
use crate::errors::{EngineError, Result};

/// engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// per-request deadline; a slow fetch degrades that one resource to
    /// empty instead of stalling the whole batch
    pub request_timeout: Duration,
    /// fixed interval for the pending-deposit poll
    pub poll_interval: Duration,
    /// rate used when a loan's product cannot be resolved; callers must
    /// surface this differently from a real product rate
    pub fallback_rate: Rate,
    /// default lookback window for the transaction history view
    pub recent_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(30),
            fallback_rate: Rate::from_percentage(6),
            recent_window_days: 30,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(EngineError::InvalidConfiguration {
                message: "request_timeout must be non-zero".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(EngineError::InvalidConfiguration {
                message: "poll_interval must be non-zero".to_string(),
            });
        }
        if self.fallback_rate.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: "fallback_rate must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.fallback_rate, Rate::from_percentage(6));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = EngineConfig {
            request_timeout: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
