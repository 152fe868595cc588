//! Cost estimation for intra mode decision.
//!
//! Every candidate is ranked by `score = (R + H) * lambda + 256 * D + SD`:
//! 1. D, the squared pixel error of the reconstruction
//! 2. SD, the weighted spectral distortion (TDisto)
//! 3. H, a fixed header cost per mode
//! 4. R, a rate proxy built from the squared quantized levels
//!
//! ## Module organization
//!
//! - [`distortion`]: SSE, Hadamard transform and TDisto functions
//! - [`lambda`]: Rate-distortion lambda and filter level calculations
//! - [`score`]: Per-candidate records and the tie-break bracket

pub mod distortion;
pub mod lambda;
pub mod score;

pub use distortion::{sse, t_transform, tdisto_16x16, tdisto_4x4};
pub use lambda::{
    calc_lambda_i16, calc_lambda_i4, calc_lambda_mode, calc_lambda_uv, calc_tlambda,
    compute_filter_level, filter_strength_from_delta, interior_limit, MAX_FILTER_LEVEL,
};
pub use score::{rate_proxy, select_best_mode, ModeScore, MAX_COST, NZ_UV_SHIFT, NZ_Y2_BIT};

/// Distortion multiplier - scales distortion to match bit cost units
pub const RD_DISTO_MULT: u32 = 256;
