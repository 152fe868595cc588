//! Per-candidate rate-distortion records and the tie-break bracket.

use crate::common::types::{ChromaMode, IntraMode, LumaMode};

use super::RD_DISTO_MULT;

/// Score of a record that has not been evaluated yet.
pub const MAX_COST: i64 = 0x7f_ffff_ffff_ffff;

/// Bit of the nz bitmap set when the luma DC (WHT) block has a nonzero level.
pub const NZ_Y2_BIT: u32 = 24;
/// First chroma bit of the nz bitmap (U is 16..20, V is 20..24).
pub const NZ_UV_SHIFT: u32 = 16;

/// Rate proxy for a quantized block: the sum of squared levels, scaled by
/// 1024.
#[inline]
pub fn rate_proxy(levels: &[i32; 16]) -> i64 {
    levels.iter().map(|&l| i64::from(l) * i64::from(l)).sum::<i64>() << 10
}

/// The result of evaluating one candidate, or the whole macroblock once the
/// search has committed.
///
/// Winners are copied out of the candidate that produced them, so a record
/// never aliases another candidate's buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeScore {
    /// Sum of squared pixel errors.
    pub d: i64,
    /// Spectral distortion, already weighted by the segment's tlambda.
    pub sd: i64,
    /// Header bits of the chosen mode(s).
    pub h: i64,
    /// Rate estimate of the quantized levels.
    pub r: i64,
    /// Aggregate rate-distortion score; lower is better.
    pub score: i64,
    /// Quantized WHT levels of the 16x16 luma DC block.
    pub y_dc_levels: [i32; 16],
    /// Quantized luma levels per 4x4 sub-block (AC only for 16x16 prediction).
    pub y_ac_levels: [[i32; 16]; 16],
    /// Quantized chroma levels: U sub-blocks 0..4 then V sub-blocks 4..8.
    pub uv_levels: [[i32; 16]; 8],
    /// `LumaMode::B` when the macroblock uses 4x4 prediction.
    pub luma_mode: LumaMode,
    /// Sub-block modes, meaningful when `luma_mode` is `B`.
    pub modes_i4: [IntraMode; 16],
    /// Chroma prediction mode.
    pub mode_uv: ChromaMode,
    /// Nonzero bitmap: bits 0..16 luma sub-blocks, 16..24 chroma sub-blocks,
    /// bit 24 the luma DC block.
    pub nz: u32,
    /// Diffusion errors of the chroma planes, three per plane.
    pub derr: [[i8; 3]; 2],
}

impl Default for ModeScore {
    fn default() -> Self {
        Self {
            d: 0,
            sd: 0,
            h: 0,
            r: 0,
            score: MAX_COST,
            y_dc_levels: [0; 16],
            y_ac_levels: [[0; 16]; 16],
            uv_levels: [[0; 16]; 8],
            luma_mode: LumaMode::DC,
            modes_i4: [IntraMode::DC; 16],
            mode_uv: ChromaMode::DC,
            nz: 0,
            derr: [[0; 3]; 2],
        }
    }
}

impl ModeScore {
    /// Fresh record with zeroed components and an unbeatable score.
    pub fn new() -> Self {
        Self::default()
    }

    /// `score = (R + H) * lambda + 256 * D + SD`
    #[inline]
    pub fn set_rd_score(&mut self, lambda: u32) {
        self.score = (self.r + self.h) * i64::from(lambda)
            + i64::from(RD_DISTO_MULT) * self.d
            + self.sd;
    }

    /// Add the rate and distortion components of `other` to this record
    /// and merge its nz bits.
    pub fn add_score(&mut self, other: &ModeScore) {
        self.d += other.d;
        self.sd += other.sd;
        self.h += other.h;
        self.r += other.r;
        self.nz |= other.nz;
        self.score += other.score;
    }

    /// Whether the macroblock codes no residual at all.
    #[inline]
    pub fn is_skip(&self) -> bool {
        self.nz == 0
    }

    /// Whether the macroblock uses 4x4 luma prediction.
    #[inline]
    pub fn is_i4(&self) -> bool {
        self.luma_mode == LumaMode::B
    }
}

/// Largest candidate set the bracket is used for.
const MAX_CANDIDATES: usize = 16;

/// Pick the winning candidate index by a pairwise bracket.
///
/// Round one pairs `(0, 1)`, `(2, 3)`, ... and an odd trailing candidate
/// advances unopposed; on an exact tie the right-hand candidate wins. Later
/// rounds pair the survivors in order and the left-hand candidate wins
/// ties. A three-way tie on candidates 0, 1 and 2 of four selects 1.
pub fn select_best_mode(scores: &[i64]) -> usize {
    debug_assert!(!scores.is_empty() && scores.len() <= MAX_CANDIDATES);
    let mut bracket = [0usize; MAX_CANDIDATES];
    let mut len = scores.len().min(MAX_CANDIDATES);
    for (i, slot) in bracket.iter_mut().enumerate().take(len) {
        *slot = i;
    }

    let mut first_round = true;
    while len > 1 {
        for i in 0..len / 2 {
            let (left, right) = (bracket[2 * i], bracket[2 * i + 1]);
            let right_wins = if first_round {
                scores[right] <= scores[left]
            } else {
                scores[right] < scores[left]
            };
            bracket[i] = if right_wins { right } else { left };
        }
        if len % 2 == 1 {
            bracket[len / 2] = bracket[len - 1];
        }
        len = len.div_ceil(2);
        first_round = false;
    }
    bracket[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rd_score_formula() {
        let mut s = ModeScore {
            d: 10,
            sd: 7,
            h: 663,
            r: 3 << 10,
            ..ModeScore::new()
        };
        s.set_rd_score(5);
        assert_eq!(s.score, (3072 + 663) * 5 + 256 * 10 + 7);
    }

    #[test]
    fn add_score_leaves_levels_alone() {
        let mut total = ModeScore::new();
        total.score = 0;
        total.nz = 1 << 3;
        let mut part = ModeScore {
            d: 1,
            sd: 2,
            h: 3,
            r: 4,
            nz: 0x30,
            mode_uv: ChromaMode::TM,
            ..ModeScore::new()
        };
        part.y_ac_levels[2][0] = 9;
        part.set_rd_score(1);
        total.add_score(&part);
        total.add_score(&part);
        assert_eq!((total.d, total.sd, total.h, total.r), (2, 4, 6, 8));
        assert_eq!(total.score, 2 * part.score);
        assert_eq!(total.nz, 0x38);
        assert_eq!(total.y_ac_levels[2][0], 0);
        assert_eq!(total.mode_uv, ChromaMode::DC);
    }

    #[test]
    fn rate_proxy_is_squared_levels() {
        let mut levels = [0i32; 16];
        levels[0] = 3;
        levels[5] = -2;
        assert_eq!(rate_proxy(&levels), 13 << 10);
        assert_eq!(rate_proxy(&[0; 16]), 0);
    }

    #[test]
    fn bracket_picks_unique_minimum() {
        for winner in 0..10i64 {
            let scores: [i64; 10] =
                core::array::from_fn(|i| if i as i64 == winner { 1 } else { 5 + i as i64 });
            assert_eq!(select_best_mode(&scores), winner as usize);
        }
    }

    #[test]
    fn three_way_tie_goes_to_bracket_winner() {
        assert_eq!(select_best_mode(&[5, 5, 5, 9]), 1);
        // Same answer every time.
        for _ in 0..8 {
            assert_eq!(select_best_mode(&[5, 5, 5, 9]), 1);
        }
    }

    #[test]
    fn tie_rules_per_round() {
        assert_eq!(select_best_mode(&[4, 4]), 1);
        assert_eq!(select_best_mode(&[7]), 0);
        // Bye candidate ties with round-one winner: left wins in round two.
        assert_eq!(select_best_mode(&[9, 3, 3]), 1);
        assert_eq!(select_best_mode(&[3, 3, 3, 3]), 1);
        assert_eq!(select_best_mode(&[8, 8, 2, 2, 9, 9, 9, 9, 2, 2]), 3);
    }
}
