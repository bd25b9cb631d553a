//! Enhancement pipeline stages.
//!
//! - **fetch**: Retrieve source image bytes over HTTP
//! - **decode**: Decode bytes into a raster with limits and a timeout
//! - **filter**: The fixed filter stack (denoise, sharpen, levels, adjust)
//! - **encode**: Re-encode the processed raster as high-quality JPEG
//! - **enhancer**: The single-flight orchestrator and result cache

pub mod decode;
pub mod encode;
pub mod enhancer;
pub mod fetch;
pub mod filter;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::ImageEncoder;
pub use enhancer::{Enhancer, JobObserver, WorkerState};
pub use fetch::ImageFetcher;
