//! Intra-frame mode decision for VP8
//!
//! This crate makes the per-macroblock decisions of a VP8 intra encoder:
//! which 16x16, 4x4 and chroma predictors to use, the quantized levels they
//! produce and the reconstruction the decoder will see. Entropy coding,
//! segmentation and frame assembly are left to the caller.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support. Without it the crate
//!   only needs `alloc`.
//!
//! # Usage
//!
//! Wrap three 4:2:0 planes in a [`FrameView`](encoder::FrameView) and drive
//! an [`IntraEncoder`](encoder::IntraEncoder) over the picture in raster
//! order:
//!
//! ```rust
//! use zenvp8::encoder::{FrameView, IntraConfig, IntraEncoder};
//!
//! let y: Vec<u8> = (0..16 * 16).map(|i| (i % 251) as u8).collect();
//! let uv = vec![128u8; 8 * 8];
//! let frame = FrameView::new(&y, &uv, &uv, 16, 16, 16, 8)?;
//!
//! let config = IntraConfig::new().with_method(4);
//! let mut encoder = IntraEncoder::new(16, 16, config, &[36])?;
//! let mb = encoder.encode_next(&frame, 0)?;
//! println!("{:?} nz={:#x} score={}", mb.score.luma_mode, mb.score.nz, mb.score.score);
//! # Ok::<(), zenvp8::encoder::EncodeError>(())
//! ```
//!
//! Per-strength SSIM totals for choosing a deblocking level are available
//! from [`IntraEncoder::filter_stats`](encoder::IntraEncoder::filter_stats)
//! once the picture is done.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

// Core modules
pub mod common;
pub mod encoder;

// Re-export encoder public API
pub use encoder::{
    EncodeError, EncodeResult, FrameView, IntraConfig, IntraEncoder, MacroblockResult, ModeScore,
};
