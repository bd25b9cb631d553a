//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.fetch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.fetch_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.filters.sharpen_amount < 0.0 {
            return Err(ConfigError::ValidationError(
                "filters.sharpen_amount must be >= 0".into(),
            ));
        }
        if self.filters.levels_clip_percent < 0.0 || self.filters.levels_clip_percent >= 50.0 {
            return Err(ConfigError::ValidationError(
                "filters.levels_clip_percent must be in [0, 50)".into(),
            ));
        }
        if self.filters.contrast <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filters.contrast must be > 0".into(),
            ));
        }
        if self.filters.brightness <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filters.brightness must be > 0".into(),
            ));
        }
        if self.encode.quality == 0 || self.encode.quality > 100 {
            return Err(ConfigError::ValidationError(
                "encode.quality must be between 1 and 100".into(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
