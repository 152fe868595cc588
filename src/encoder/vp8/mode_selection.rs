//! Intra prediction mode selection for one macroblock.
//!
//! The search is a small state machine that visits
//! `Search16 -> Search4 -> SearchUV -> SelectType -> Done`:
//!
//! 1. `Search16` reconstructs and scores the four 16x16 luma candidates,
//!    picks a winner with the tie-break bracket and rescores it with the
//!    mode lambda so it can be compared against 4x4 prediction.
//! 2. `Search4` walks the sixteen sub-blocks in raster order. Each one
//!    scores all ten 4x4 modes against context built from the sub-blocks
//!    already committed, then folds its winner forward. The search gives up
//!    as soon as its running score reaches the 16x16 score.
//! 3. `SearchUV` scores the four chroma candidates, optionally with DC
//!    error diffusion.
//! 4. `SelectType` keeps the cheaper luma path and merges the chroma
//!    winner into it.
//!
//! Every winner is copied out of its candidate, so losing candidates never
//! share buffers with the committed record.

use crate::common::prediction::{predict_chroma8, predict_luma16, LumaWorkspace};
use crate::common::types::{ChromaMode, IntraMode, LumaMode};
use crate::encoder::config::IntraConfig;
use crate::encoder::cost::{
    rate_proxy, select_best_mode, sse, tdisto_16x16, tdisto_4x4, ModeScore, NZ_Y2_BIT,
};
use crate::encoder::iterator::BoundaryContext;
use crate::encoder::segment::SegmentParams;
use crate::encoder::tables::{
    BMODE_COST, FIXED_COSTS_I16, FIXED_COSTS_I4, FIXED_COSTS_UV, VP8_WEIGHT_Y,
};

use super::reconstruct::{reconstruct_intra16, reconstruct_intra4, reconstruct_uv, DiffusionInput};
use super::MacroblockPixels;

/// Stage of the mode search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Score the 16x16 luma candidates.
    Search16,
    /// Score the 4x4 luma sub-blocks.
    Search4,
    /// Score the chroma candidates.
    SearchUV,
    /// Commit the macroblock type.
    SelectType,
    /// The decision is final.
    Done,
}

/// Luma decision with its reconstruction.
#[derive(Clone)]
struct LumaCandidate {
    rd: ModeScore,
    recon: [u8; 256],
}

/// Chroma decision with its reconstruction.
#[derive(Clone)]
struct ChromaCandidate {
    rd: ModeScore,
    recon_u: [u8; 64],
    recon_v: [u8; 64],
}

/// Mode decision for one macroblock.
pub(crate) struct ModeSearch<'a> {
    src: &'a MacroblockPixels,
    ctx: &'a BoundaryContext,
    segment: &'a mut SegmentParams,
    config: &'a IntraConfig,
    diffusion: Option<DiffusionInput<'a>>,
    state: SearchState,
    i16: Option<LumaCandidate>,
    i4: Option<LumaCandidate>,
    uv: Option<ChromaCandidate>,
    result: Option<(ModeScore, MacroblockPixels)>,
}

impl<'a> ModeSearch<'a> {
    pub(crate) fn new(
        src: &'a MacroblockPixels,
        ctx: &'a BoundaryContext,
        segment: &'a mut SegmentParams,
        config: &'a IntraConfig,
        diffusion: Option<DiffusionInput<'a>>,
    ) -> Self {
        Self {
            src,
            ctx,
            segment,
            config,
            diffusion,
            state: SearchState::Search16,
            i16: None,
            i4: None,
            uv: None,
            result: None,
        }
    }

    /// Current stage.
    pub(crate) fn state(&self) -> SearchState {
        self.state
    }

    /// Run one stage and return the stage that follows it.
    pub(crate) fn step(&mut self) -> SearchState {
        self.state = match self.state {
            SearchState::Search16 => self.search16(),
            SearchState::Search4 => self.search4(),
            SearchState::SearchUV => self.search_uv(),
            SearchState::SelectType => self.select_type(),
            SearchState::Done => SearchState::Done,
        };
        self.state
    }

    /// Run every remaining stage and return the committed record and the
    /// macroblock's reconstruction.
    pub(crate) fn run(mut self) -> (ModeScore, MacroblockPixels) {
        while self.state() != SearchState::Done {
            self.step();
        }
        // select_type always fills the result before reporting Done.
        self.result.unwrap_or_else(|| (ModeScore::new(), MacroblockPixels::default()))
    }

    fn search16(&mut self) -> SearchState {
        let seg = &*self.segment;
        let edges = self.ctx.luma_edges();

        let mut candidates: [LumaCandidate; 4] = core::array::from_fn(|_| LumaCandidate {
            rd: ModeScore::new(),
            recon: [0; 256],
        });
        for (mode, cand) in LumaMode::I16_MODES.iter().zip(candidates.iter_mut()) {
            let mut pred = [0u8; 256];
            predict_luma16(*mode, &edges, &mut pred);

            let rd = &mut cand.rd;
            rd.luma_mode = *mode;
            rd.nz = reconstruct_intra16(
                &self.src.y,
                &pred,
                &seg.y1,
                &seg.y2,
                &mut rd.y_dc_levels,
                &mut rd.y_ac_levels,
                &mut cand.recon,
            );
            rd.d = i64::from(sse(&self.src.y, &cand.recon));
            rd.sd = if seg.tlambda > 0 {
                i64::from(seg.tlambda)
                    * i64::from(tdisto_16x16(&self.src.y, &cand.recon, 16, &VP8_WEIGHT_Y))
            } else {
                0
            };
            rd.h = i64::from(FIXED_COSTS_I16[mode.index()]);
            rd.r = rate_proxy(&rd.y_dc_levels) + rd.y_ac_levels.iter().map(rate_proxy).sum::<i64>();
            rd.set_rd_score(seg.lambda_i16);
        }

        let scores: [i64; 4] = core::array::from_fn(|i| candidates[i].rd.score);
        let mut best = candidates[select_best_mode(&scores)].clone();
        best.rd.set_rd_score(self.segment.lambda_mode);

        // A DC-only macroblock that still misses the noise floor records how
        // strong its low-frequency edge is (WHT positions 1, 2 and 4).
        let dc_only = best.rd.nz & 0x100_ffff == 1 << NZ_Y2_BIT;
        if dc_only && best.rd.d > self.segment.min_disto {
            let dc = &best.rd.y_dc_levels;
            let edge = dc[1].abs().max(dc[2].abs()).max(dc[4].abs());
            if edge > self.segment.max_edge {
                self.segment.max_edge = edge;
            }
        }

        let skip_i4 = !self.config.search_i4() || self.segment.max_i4_header_bits == 0;
        self.i16 = Some(best);
        if skip_i4 {
            SearchState::SearchUV
        } else {
            SearchState::Search4
        }
    }

    fn search4(&mut self) -> SearchState {
        let seg = &*self.segment;
        let Some(i16_score) = self.i16.as_ref().map(|c| c.rd.score) else {
            return SearchState::SearchUV;
        };

        let mut ws = LumaWorkspace::new(&self.ctx.y_top, &self.ctx.y_left, self.ctx.y_top_left);
        let mut best = LumaCandidate {
            rd: ModeScore {
                luma_mode: LumaMode::B,
                h: i64::from(BMODE_COST),
                ..ModeScore::new()
            },
            recon: [0; 256],
        };
        best.rd.set_rd_score(seg.lambda_mode);
        let mut header_bits = 0i64;

        for n in 0..16 {
            let (bx, by) = ((n & 3) * 4, (n >> 2) * 4);
            let src: [u8; 16] = core::array::from_fn(|i| self.src.y[(by + i / 4) * 16 + bx + i % 4]);
            let preds = ws.predict4(n);

            let mut levels = [[0i32; 16]; IntraMode::COUNT];
            let mut recons = [[0u8; 16]; IntraMode::COUNT];
            let mut blocks: [ModeScore; IntraMode::COUNT] = core::array::from_fn(|_| ModeScore::new());
            for mode in IntraMode::ALL {
                let m = mode.index();
                let rd = &mut blocks[m];
                let nz = reconstruct_intra4(&src, &preds[m], &seg.y1, &mut levels[m], &mut recons[m]);
                rd.nz = u32::from(nz) << n;
                rd.d = i64::from(sse(&src, &recons[m]));
                rd.sd = if seg.tlambda > 0 {
                    i64::from(seg.tlambda) * i64::from(tdisto_4x4(&src, &recons[m], 4, &VP8_WEIGHT_Y))
                } else {
                    0
                };
                rd.h = i64::from(FIXED_COSTS_I4[m]);
                rd.r = rate_proxy(&levels[m]);
                rd.set_rd_score(seg.lambda_i4);
            }

            let scores: [i64; IntraMode::COUNT] = core::array::from_fn(|m| blocks[m].score);
            let m = select_best_mode(&scores);
            let block = &mut blocks[m];
            block.set_rd_score(seg.lambda_mode);
            best.rd.add_score(block);
            header_bits += block.h;

            if best.rd.score >= i16_score || header_bits > seg.max_i4_header_bits {
                return SearchState::SearchUV;
            }

            best.rd.modes_i4[n] = IntraMode::ALL[m];
            best.rd.y_ac_levels[n] = levels[m];
            ws.store4(n, &recons[m]);
            for (row, pixels) in recons[m].chunks_exact(4).enumerate() {
                best.recon[(by + row) * 16 + bx..][..4].copy_from_slice(pixels);
            }
        }

        self.i4 = Some(best);
        SearchState::SearchUV
    }

    fn search_uv(&mut self) -> SearchState {
        let seg = &*self.segment;
        let (u_edges, v_edges) = (self.ctx.u_edges(), self.ctx.v_edges());

        let mut candidates: [ChromaCandidate; 4] = core::array::from_fn(|_| ChromaCandidate {
            rd: ModeScore::new(),
            recon_u: [0; 64],
            recon_v: [0; 64],
        });
        for (mode, cand) in ChromaMode::ALL.iter().zip(candidates.iter_mut()) {
            let (mut pred_u, mut pred_v) = ([0u8; 64], [0u8; 64]);
            predict_chroma8(*mode, &u_edges, &mut pred_u);
            predict_chroma8(*mode, &v_edges, &mut pred_v);

            let rd = &mut cand.rd;
            rd.mode_uv = *mode;
            rd.nz = reconstruct_uv(
                &self.src.u,
                &self.src.v,
                &pred_u,
                &pred_v,
                &seg.uv,
                self.diffusion,
                &mut rd.uv_levels,
                &mut rd.derr,
                &mut cand.recon_u,
                &mut cand.recon_v,
            );
            rd.d = i64::from(sse(&self.src.u, &cand.recon_u) + sse(&self.src.v, &cand.recon_v));
            rd.sd = 0;
            rd.h = i64::from(FIXED_COSTS_UV[mode.index()]);
            rd.r = rd.uv_levels.iter().map(rate_proxy).sum();
            rd.set_rd_score(seg.lambda_uv);
        }

        let scores: [i64; 4] = core::array::from_fn(|i| candidates[i].rd.score);
        self.uv = Some(candidates[select_best_mode(&scores)].clone());
        SearchState::SelectType
    }

    fn select_type(&mut self) -> SearchState {
        let (Some(i16), Some(uv)) = (self.i16.take(), self.uv.take()) else {
            // Stepped out of order: start over.
            return SearchState::Search16;
        };
        let luma = match self.i4.take() {
            Some(i4) if i4.rd.score < i16.rd.score => i4,
            _ => i16,
        };

        let mut rd = luma.rd;
        rd.add_score(&uv.rd);
        rd.mode_uv = uv.rd.mode_uv;
        rd.uv_levels = uv.rd.uv_levels;
        rd.derr = uv.rd.derr;

        let recon = MacroblockPixels {
            y: luma.recon,
            u: uv.recon_u,
            v: uv.recon_v,
        };
        self.result = Some((rd, recon));
        SearchState::Done
    }
}
