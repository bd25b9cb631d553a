//! Core data types for the Relume enhancement pipeline.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Processing priority for an enhancement job.
///
/// Priority affects queue ordering only: the worker is single-flight, so a
/// high-priority job jumps the line but never preempts a job already being
/// processed. Declared low-to-high so the derived `Ord` matches queue order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(format!(
                "unknown priority '{other}' (expected low, normal, or high)"
            )),
        }
    }
}

/// Per-job lifecycle states.
///
/// `Submitted → Queued → Processing → {Completed | Failed}`. Terminal states
/// are final; there is no retry transition. Failures surface to the caller,
/// who may resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Submitted,
    Queued,
    Processing,
    Completed,
    Failed,
}

/// A fully enhanced image: the encoded output plus metadata.
///
/// The `Arc<EnhancedImage>` handed out by the orchestrator is the "handle"
/// stored in the result cache; the encoded bytes are never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedImage {
    /// URL the source image was fetched from
    pub source_url: String,

    /// Priority the job ran at (part of the cache key)
    pub priority: Priority,

    /// BLAKE3 hash of the encoded output, for deduplication
    pub content_hash: String,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Encoded output format ("jpeg")
    pub format: String,

    /// Encoded output size in bytes
    pub encoded_size: u64,

    /// Wall-clock time from submission to completion, in milliseconds
    pub elapsed_ms: u64,

    /// Encoded image bytes (not serialized; use `to_data_url` for transport)
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EnhancedImage {
    /// Render the encoded output as a `data:` URL usable directly as an
    /// image source by embedding UIs.
    pub fn to_data_url(&self) -> String {
        format!("data:image/{};base64,{}", self.format, BASE64.encode(&self.bytes))
    }
}

/// Outcome of an enhancement request.
///
/// A fetch failure is deliberately not an error: the caller gets the original
/// URL back and can decide whether degraded counts as success. Decode, filter,
/// and encode failures are real errors and come back as `Err(EnhanceError)`.
#[derive(Debug, Clone)]
pub enum EnhanceOutcome {
    /// The full filter stack ran and the result was cached
    Enhanced(Arc<EnhancedImage>),

    /// The source could not be fetched; fall back to the original URL
    Degraded { source_url: String, reason: String },
}

impl EnhanceOutcome {
    /// The enhanced image, if the pipeline ran to completion.
    pub fn image(&self) -> Option<&Arc<EnhancedImage>> {
        match self {
            EnhanceOutcome::Enhanced(image) => Some(image),
            EnhanceOutcome::Degraded { .. } => None,
        }
    }

    /// Whether this outcome fell back to the original URL.
    pub fn is_degraded(&self) -> bool {
        matches!(self, EnhanceOutcome::Degraded { .. })
    }

    /// The source URL this outcome refers to.
    pub fn source_url(&self) -> &str {
        match self {
            EnhanceOutcome::Enhanced(image) => &image.source_url,
            EnhanceOutcome::Degraded { source_url, .. } => source_url,
        }
    }
}

/// Counters for a pipeline's lifetime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnhanceStats {
    /// Jobs that ran the full filter stack successfully
    pub completed: u64,

    /// Jobs that failed in decode, filter, or encode
    pub failed: u64,

    /// Requests that degraded to the original URL after a fetch failure
    pub degraded: u64,

    /// Requests answered from the result cache without queueing
    pub cache_hits: u64,
}
