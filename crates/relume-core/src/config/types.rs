//! Sub-configuration structs with pipeline defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where the CLI writes enhanced output when no explicit
    /// path is given
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("~/.relume/output"),
        }
    }
}

/// Resource limits to protect against problematic sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 8192,
            fetch_timeout_ms: 15000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Filter stack tuning.
///
/// Defaults reproduce the fixed product-photo look: two denoise passes, a
/// light unsharp mask, 0.5% histogram clip, and a gentle contrast/brightness
/// lift applied last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of 3x3 box-mean denoise passes
    pub denoise_passes: u32,

    /// Unsharp mask amount (center weight 1 + 4*amount)
    pub sharpen_amount: f32,

    /// Histogram clip for auto-levels, in percent of total pixels per end
    pub levels_clip_percent: f32,

    /// Linear contrast about the midpoint, applied last
    pub contrast: f32,

    /// Brightness multiplier applied after contrast
    pub brightness: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            denoise_passes: 2,
            sharpen_amount: 0.3,
            levels_clip_percent: 0.5,
            contrast: 1.1,
            brightness: 1.02,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached results; least-recently-used entries are
    /// evicted beyond this
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 128 }
    }
}

/// HTTP client settings for source fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with fetches
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("relume/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
