//! Relume Core - Priority-driven image enhancement pipeline.
//!
//! Relume fetches a source image, decodes it, runs a fixed stack of spatial
//! filters (denoise, unsharp mask, histogram auto-levels, contrast and
//! brightness), re-encodes the result as high-quality JPEG, and caches it.
//! A priority queue drains high-priority jobs (a product page's primary
//! photo) before normal and low ones, one job at a time.
//!
//! # Architecture
//!
//! ```text
//! URL → Fetch → Decode → Denoise → Sharpen → Auto-levels → Adjust → JPEG → Cache
//!                 └─ jobs queued by priority, drained single-flight ─┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use relume_core::{Config, Enhancer, Priority};
//!
//! #[tokio::main]
//! async fn main() -> relume_core::Result<()> {
//!     let enhancer = Enhancer::new(Config::load()?)?;
//!
//!     match enhancer.enhance("https://cdn.example.com/amp.jpg", Priority::High).await? {
//!         outcome if outcome.is_degraded() => println!("serving original"),
//!         outcome => println!("{} bytes", outcome.image().unwrap().encoded_size),
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod types;

// Re-exports for convenient access
pub use cache::{CacheKey, ResultCache};
pub use config::Config;
pub use error::{ConfigError, EnhanceError, EnhanceResult, RelumeError, Result};
pub use pipeline::{Enhancer, JobObserver, WorkerState};
pub use types::{EnhanceOutcome, EnhanceStats, EnhancedImage, JobState, Priority};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
