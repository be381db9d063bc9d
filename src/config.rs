//! Engine configuration

use crate::core::Address;
use crate::error::{BusError, Result};
use crate::retry::{RetryPolicy, DEFAULT_RETRY_CEILING, DEFAULT_RETRY_INTERVAL_MS};

/// Address the controller transmits from when not configured
pub const DEFAULT_SOURCE_ADDRESS: u8 = 0x42;

/// Address of the device when not configured
pub const DEFAULT_DESTINATION_ADDRESS: u8 = 0x00;

/// Minimum time between two scheduler decisions
pub const DEFAULT_QUERY_INTERVAL_MS: u64 = 250;

/// Delay before a written value is read back
pub const DEFAULT_GET_AFTER_SET_DELAY_MS: u64 = 1_000;

/// Bus-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Address requests are sent from
    pub source_address: u8,
    /// Address requests are sent to
    pub destination_address: u8,
    /// Minimum time between two scheduler decisions
    pub query_interval_ms: u64,
    /// Suspension after the retry ceiling is reached
    pub retry_interval_ms: u64,
    /// Attempts allowed before an operation is suspended
    pub retry_ceiling: u8,
    /// Delay before a written value is read back
    pub get_after_set_delay_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            source_address: DEFAULT_SOURCE_ADDRESS,
            destination_address: DEFAULT_DESTINATION_ADDRESS,
            query_interval_ms: DEFAULT_QUERY_INTERVAL_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            get_after_set_delay_ms: DEFAULT_GET_AFTER_SET_DELAY_MS,
        }
    }
}

impl BusConfig {
    /// Check that the settings can drive a bus
    pub fn validate(&self) -> Result<()> {
        self.source()?;
        self.destination()?;
        if self.query_interval_ms == 0 {
            return Err(BusError::invalid_config("query interval must be non-zero"));
        }
        if self.retry_ceiling == 0 {
            return Err(BusError::invalid_config("retry ceiling must be non-zero"));
        }
        Ok(())
    }

    /// Source address
    pub fn source(&self) -> Result<Address> {
        Address::new(self.source_address)
    }

    /// Destination address
    pub fn destination(&self) -> Result<Address> {
        Address::new(self.destination_address)
    }

    /// Retry limits handed to every registered point
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            ceiling: self.retry_ceiling,
            retry_interval_ms: self.retry_interval_ms,
        }
    }

    /// Parse and validate a JSON configuration; missing keys take defaults
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BusConfig =
            serde_json::from_str(json).map_err(|e| BusError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
