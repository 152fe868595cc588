//! Prediction mode enums shared by the predictors and the mode search.
//!
//! Discriminants follow the VP8 bitstream order, which is also the order
//! the mode search enumerates candidates in.

/// 16x16 luma prediction mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum LumaMode {
    /// Predict DC using row above and column to the left.
    #[default]
    DC = 0,

    /// Predict rows using row above.
    V = 1,

    /// Predict columns using column to the left.
    H = 2,

    /// Propagate second differences.
    TM = 3,

    /// Each Y subblock is independently predicted.
    B = 4,
}

impl LumaMode {
    /// The four whole-block candidates, in search order.
    pub const I16_MODES: [LumaMode; 4] = [LumaMode::DC, LumaMode::V, LumaMode::H, LumaMode::TM];

    /// Index into per-mode tables. `B` has no whole-block prediction.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 8x8 chroma prediction mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum ChromaMode {
    /// Predict DC using row above and column to the left.
    #[default]
    DC = 0,

    /// Predict rows using row above.
    V = 1,

    /// Predict columns using column to the left.
    H = 2,

    /// Propagate second differences.
    TM = 3,
}

impl ChromaMode {
    /// The four chroma candidates, in search order.
    pub const ALL: [ChromaMode; 4] = [
        ChromaMode::DC,
        ChromaMode::V,
        ChromaMode::H,
        ChromaMode::TM,
    ];

    /// Index into per-mode tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 4x4 luma sub-block prediction mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum IntraMode {
    /// Average of the four top and four left samples.
    #[default]
    DC = 0,
    /// TrueMotion.
    TM = 1,
    /// Vertical, smoothed along the top edge.
    VE = 2,
    /// Horizontal, smoothed along the left edge.
    HE = 3,
    /// Down-left diagonal (uses the top-right samples).
    LD = 4,
    /// Down-right diagonal.
    RD = 5,
    /// Vertical-right.
    VR = 6,
    /// Vertical-left.
    VL = 7,
    /// Horizontal-down.
    HD = 8,
    /// Horizontal-up.
    HU = 9,
}

impl IntraMode {
    /// Number of 4x4 modes.
    pub const COUNT: usize = 10;

    /// All ten sub-block candidates, in search order.
    pub const ALL: [IntraMode; 10] = [
        IntraMode::DC,
        IntraMode::TM,
        IntraMode::VE,
        IntraMode::HE,
        IntraMode::LD,
        IntraMode::RD,
        IntraMode::VR,
        IntraMode::VL,
        IntraMode::HD,
        IntraMode::HU,
    ];

    /// Index into per-mode tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_lists_match_discriminants() {
        for (i, m) in LumaMode::I16_MODES.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
        for (i, m) in ChromaMode::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
        for (i, m) in IntraMode::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
