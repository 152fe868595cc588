//! VP8 intra macroblock coding decisions.
//!
//! ## Module organization
//!
//! - [`diffusion`]: chroma DC error diffusion between sub-blocks and macroblocks
//! - [`mode_selection`]: the I16 / I4 / UV mode search
//! - [`reconstruct`]: transform, quantize and reconstruct candidate predictions
//!
//! ## Per-macroblock pipeline
//!
//! 1. **Import**: the iterator copies the source samples and the boundary
//!    context left by earlier macroblocks
//! 2. **Mode search**: every candidate is reconstructed and scored; winners
//!    are copied out
//! 3. **Commit**: the winner's diffusion errors and boundary samples are
//!    saved for the neighbours

pub mod diffusion;
pub mod mode_selection;
pub mod reconstruct;

use crate::encoder::config::IntraConfig;
use crate::encoder::cost::ModeScore;
use crate::encoder::iterator::BoundaryContext;
use crate::encoder::segment::SegmentParams;

use diffusion::DiffusionErrorState;
use mode_selection::ModeSearch;
pub use reconstruct::DiffusionInput;

pub use mode_selection::SearchState;

/// Samples of one macroblock: 16x16 luma and two 8x8 chroma planes, each
/// stored contiguously.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroblockPixels {
    /// Luma samples, row-major, stride 16.
    pub y: [u8; 256],
    /// U samples, row-major, stride 8.
    pub u: [u8; 64],
    /// V samples, row-major, stride 8.
    pub v: [u8; 64],
}

impl Default for MacroblockPixels {
    fn default() -> Self {
        Self {
            y: [0; 256],
            u: [0; 64],
            v: [0; 64],
        }
    }
}

/// Decide the modes of the macroblock in column `x` and commit its chroma
/// diffusion errors.
///
/// Returns the committed record and the reconstruction.
pub(crate) fn encode_macroblock(
    src: &MacroblockPixels,
    ctx: &BoundaryContext,
    segment: &mut SegmentParams,
    config: &IntraConfig,
    diffusion: &mut DiffusionErrorState,
    x: usize,
) -> (ModeScore, MacroblockPixels) {
    let (rd, recon) = {
        let input = config.error_diffusion.then_some(DiffusionInput {
            state: &*diffusion,
            x,
        });
        ModeSearch::new(src, ctx, segment, config, input).run()
    };
    if config.error_diffusion {
        diffusion.store(x, &rd.derr);
    }
    (rd, recon)
}
