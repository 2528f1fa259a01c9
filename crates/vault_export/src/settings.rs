use std::time::Duration;

use serde::{Deserialize, Serialize};
use vault_core::DEFAULT_CEILING;

/// Engine configuration. Durations are stored in milliseconds so the struct
/// round-trips through plain config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub api_base_url: String,
    pub bearer_token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
    pub max_concurrent_transfers: usize,
    pub tick_interval_ms: u64,
    pub progress_ceiling: f64,
    pub compression_level: i32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            bearer_token: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            max_bytes: 512 * 1024 * 1024,
            max_concurrent_transfers: 6,
            tick_interval_ms: 300,
            progress_ceiling: DEFAULT_CEILING,
            compression_level: 6,
        }
    }
}

impl ExportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Worker pool size; never zero.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_transfers.max(1)
    }

    /// Deflate level clamped to the range zip accepts.
    pub fn deflate_level(&self) -> i32 {
        self.compression_level.clamp(0, 9)
    }
}

#[cfg(test)]
mod tests {
    use super::ExportSettings;

    #[test]
    fn partial_config_keeps_defaults() {
        let settings: ExportSettings =
            serde_json::from_str(r#"{"max_concurrent_transfers": 0, "compression_level": 42}"#)
                .unwrap();
        assert_eq!(settings.concurrency(), 1);
        assert_eq!(settings.deflate_level(), 9);
        assert_eq!(settings.tick_interval_ms, 300);
        assert_eq!(settings.api_base_url, "http://localhost:8080");
    }
}
