//! VP8 intra encoding decisions

mod api;
pub mod config;
pub mod cost;
/// Windowed SSIM and the deblocking-strength prober
pub mod filter_stats;
/// Raster macroblock iteration and neighbour caches
pub mod iterator;
pub mod loop_filter;
/// Quantization matrix and coefficient quantization
pub mod quantize;
pub mod segment;
pub mod tables;
/// VP8 intra macroblock decisions
pub mod vp8;

// Re-export public API
pub use api::{
    EncodeError, EncodeResult, FrameView, IntraEncoder, IntraStats, MacroblockResult,
    MAX_DIMENSION,
};
pub use config::IntraConfig;
pub use cost::ModeScore;
pub use filter_stats::FilterStats;
pub use iterator::{BoundaryContext, MacroblockIterator};
pub use segment::SegmentParams;
pub use vp8::diffusion::DiffusionErrorState;
pub use vp8::MacroblockPixels;
