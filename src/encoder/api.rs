//! Per-macroblock intra decision API.
//!
//! ```rust
//! use zenvp8::encoder::{FrameView, IntraConfig, IntraEncoder};
//!
//! let (width, height) = (32, 16);
//! let y = vec![128u8; width * height];
//! let uv = vec![128u8; (width / 2) * (height / 2)];
//! let frame = FrameView::new(&y, &uv, &uv, width, height, width, width / 2)?;
//!
//! let mut encoder = IntraEncoder::new(width, height, IntraConfig::new(), &[40])?;
//! while !encoder.is_done() {
//!     let mb = encoder.encode_next(&frame, 0)?;
//!     assert!(mb.score.is_skip());
//! }
//! # Ok::<(), zenvp8::encoder::EncodeError>(())
//! ```
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, trace};
use thiserror::Error;

use super::config::IntraConfig;
use super::cost::ModeScore;
use super::filter_stats::FilterStats;
use super::iterator::MacroblockIterator;
use super::segment::{SegmentParams, NUM_SEGMENTS};
use super::vp8::{encode_macroblock, MacroblockPixels};

/// Largest picture side a VP8 frame header can carry.
pub const MAX_DIMENSION: usize = 16383;

/// Error that can occur while setting up or driving the decision core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The picture dimensions are zero or too large for VP8.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// A plane buffer or stride does not cover the picture.
    #[error("Invalid buffer size: {0}")]
    InvalidBufferSize(String),

    /// A quantizer index, segment id or frame argument is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every macroblock of the picture has already been coded.
    #[error("All macroblocks have been coded")]
    Finished,
}

/// Result type alias for the decision core.
pub type EncodeResult<T> = core::result::Result<T, EncodeError>;

/// Borrowed 4:2:0 picture: one luma plane and two half-resolution chroma
/// planes, each with its own stride.
///
/// Only [`FrameView::new`] builds one, so every view covers its picture.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    y: &'a [u8],
    u: &'a [u8],
    v: &'a [u8],
    width: usize,
    height: usize,
    y_stride: usize,
    uv_stride: usize,
}

impl<'a> FrameView<'a> {
    /// Borrow three planes, checking that every stride and slice covers the
    /// picture.
    pub fn new(
        y: &'a [u8],
        u: &'a [u8],
        v: &'a [u8],
        width: usize,
        height: usize,
        y_stride: usize,
        uv_stride: usize,
    ) -> EncodeResult<Self> {
        validate_dimensions(width, height)?;
        let frame = Self {
            y,
            u,
            v,
            width,
            height,
            y_stride,
            uv_stride,
        };
        let (uv_w, uv_h) = frame.chroma_size();
        validate_plane("Y", y.len(), y_stride, width, height)?;
        validate_plane("U", u.len(), uv_stride, uv_w, uv_h)?;
        validate_plane("V", v.len(), uv_stride, uv_w, uv_h)?;
        Ok(frame)
    }

    /// Luma plane.
    pub fn y(&self) -> &'a [u8] {
        self.y
    }

    /// U plane.
    pub fn u(&self) -> &'a [u8] {
        self.u
    }

    /// V plane.
    pub fn v(&self) -> &'a [u8] {
        self.v
    }

    /// Picture width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Picture height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between luma rows.
    pub fn y_stride(&self) -> usize {
        self.y_stride
    }

    /// Bytes between chroma rows.
    pub fn uv_stride(&self) -> usize {
        self.uv_stride
    }

    /// Chroma plane size, rounded up.
    pub fn chroma_size(&self) -> (usize, usize) {
        (self.width.div_ceil(2), self.height.div_ceil(2))
    }

    /// Macroblock grid size, rounded up.
    pub fn mb_grid(&self) -> (usize, usize) {
        mb_grid(self.width, self.height)
    }
}

fn mb_grid(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(16), height.div_ceil(16))
}

fn validate_dimensions(width: usize, height: usize) -> Result<(), EncodeError> {
    if width == 0 || width > MAX_DIMENSION || height == 0 || height > MAX_DIMENSION {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Validate that a plane of `rows` rows of `cols` samples fits in `len`
/// bytes at `stride`.
fn validate_plane(
    name: &str,
    len: usize,
    stride: usize,
    cols: usize,
    rows: usize,
) -> Result<(), EncodeError> {
    if stride < cols {
        return Err(EncodeError::InvalidBufferSize(format!(
            "{} stride {} is smaller than the plane width {}",
            name, stride, cols
        )));
    }
    let expected = stride.saturating_mul(rows - 1).saturating_add(cols);
    if len < expected {
        return Err(EncodeError::InvalidBufferSize(format!(
            "{} plane too small: got {}, expected {}",
            name, len, expected
        )));
    }
    Ok(())
}

/// Decision for one macroblock.
#[derive(Debug, Clone)]
pub struct MacroblockResult {
    /// Macroblock column.
    pub x: usize,
    /// Macroblock row.
    pub y: usize,
    /// Segment the macroblock was coded with.
    pub segment: usize,
    /// Modes, levels, nz bitmap and rate-distortion components.
    pub score: ModeScore,
    /// Reconstruction the decoder will see before loop filtering.
    pub recon: MacroblockPixels,
}

/// Macroblock counts of the picture so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntraStats {
    /// Number of macroblocks using I4 prediction mode.
    pub block_count_i4: u32,
    /// Number of macroblocks using I16 prediction mode.
    pub block_count_i16: u32,
    /// Number of macroblocks with all-zero levels (skipped).
    pub block_count_skip: u32,
}

/// Drives the mode decision over a picture in raster order.
///
/// The encoder owns the neighbour caches, the diffusion state and the
/// deblocking statistics; the caller picks each macroblock's segment.
#[derive(Debug, Clone)]
pub struct IntraEncoder {
    config: IntraConfig,
    width: usize,
    height: usize,
    segments: Vec<SegmentParams>,
    iterator: MacroblockIterator,
    filter_stats: FilterStats,
    stats: IntraStats,
}

impl IntraEncoder {
    /// Set up a picture of `width` x `height` pixels with one segment per
    /// entry of `segment_quants` (1 to 4 quantizer indices).
    pub fn new(
        width: usize,
        height: usize,
        config: IntraConfig,
        segment_quants: &[u8],
    ) -> EncodeResult<Self> {
        validate_dimensions(width, height)?;
        if segment_quants.is_empty() || segment_quants.len() > NUM_SEGMENTS {
            return Err(EncodeError::InvalidParameter(format!(
                "{} segments, expected 1..={}",
                segment_quants.len(),
                NUM_SEGMENTS
            )));
        }
        let segments = segment_quants
            .iter()
            .map(|&q| SegmentParams::new(q, &config))
            .collect::<EncodeResult<Vec<_>>>()?;

        let (mb_w, mb_h) = mb_grid(width, height);
        debug!(
            "intra decision: {}x{} pixels, {}x{} macroblocks, {} segments, {:?}",
            width,
            height,
            mb_w,
            mb_h,
            segments.len(),
            config
        );

        Ok(Self {
            config,
            width,
            height,
            segments,
            iterator: MacroblockIterator::new(mb_w, mb_h),
            filter_stats: FilterStats::new(),
            stats: IntraStats::default(),
        })
    }

    /// Decide the next macroblock in raster order using segment `segment`.
    pub fn encode_next(
        &mut self,
        frame: &FrameView<'_>,
        segment: usize,
    ) -> EncodeResult<MacroblockResult> {
        if self.iterator.is_done() {
            return Err(EncodeError::Finished);
        }
        if frame.width != self.width || frame.height != self.height {
            return Err(EncodeError::InvalidParameter(format!(
                "frame is {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        let num_segments = self.segments.len();
        let Some(params) = self.segments.get_mut(segment) else {
            return Err(EncodeError::InvalidParameter(format!(
                "segment {} outside 0..{}",
                segment, num_segments
            )));
        };

        let (x, y) = self.iterator.position();
        let src = self.iterator.import(frame);
        let ctx = self.iterator.context();
        let (score, recon) = encode_macroblock(
            &src,
            &ctx,
            params,
            &self.config,
            self.iterator.diffusion_mut(),
            x,
        );

        if self.config.filter_stats {
            self.filter_stats
                .probe(segment, params, &self.config, &src, &recon, &score);
        }

        if score.is_i4() {
            self.stats.block_count_i4 += 1;
        } else {
            self.stats.block_count_i16 += 1;
        }
        if score.is_skip() {
            self.stats.block_count_skip += 1;
        }
        trace!(
            "mb ({}, {}) seg {}: {:?} uv {:?} score {} nz {:#09x}",
            x,
            y,
            segment,
            score.luma_mode,
            score.mode_uv,
            score.score,
            score.nz
        );

        self.iterator.save_boundary(&recon);
        if !self.iterator.advance() {
            debug!(
                "intra decision done: {} i4, {} i16, {} skipped",
                self.stats.block_count_i4, self.stats.block_count_i16, self.stats.block_count_skip
            );
        }

        Ok(MacroblockResult {
            x,
            y,
            segment,
            score,
            recon,
        })
    }

    /// Whether every macroblock has been coded.
    pub fn is_done(&self) -> bool {
        self.iterator.is_done()
    }

    /// Position of the next macroblock, or `None` once the picture is done.
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.iterator.is_done()).then(|| self.iterator.position())
    }

    /// Macroblocks still to be coded.
    pub fn remaining(&self) -> usize {
        self.iterator.count_down()
    }

    /// Parameters of segment `segment`, including its running `max_edge`.
    pub fn segment(&self, segment: usize) -> Option<&SegmentParams> {
        self.segments.get(segment)
    }

    /// Accumulated deblocking statistics.
    pub fn filter_stats(&self) -> &FilterStats {
        &self.filter_stats
    }

    /// Macroblock counts so far.
    pub fn stats(&self) -> &IntraStats {
        &self.stats
    }

    /// Rewind to the first macroblock and clear every accumulator.
    pub fn reset(&mut self) {
        self.iterator.reset();
        self.filter_stats = FilterStats::new();
        self.stats = IntraStats::default();
        for seg in &mut self.segments {
            seg.max_edge = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn frame_view_checks_planes() {
        let y = vec![0u8; 20 * 10];
        let uv = vec![0u8; 10 * 5];
        assert!(FrameView::new(&y, &uv, &uv, 20, 10, 20, 10).is_ok());
        // Odd sizes round the chroma planes up.
        assert!(FrameView::new(&y, &uv, &uv, 19, 9, 20, 10).is_ok());

        assert!(matches!(
            FrameView::new(&y, &uv, &uv, 0, 10, 20, 10),
            Err(EncodeError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            FrameView::new(&y, &uv, &uv, 20, 10, 19, 10),
            Err(EncodeError::InvalidBufferSize(_))
        ));
        assert!(matches!(
            FrameView::new(&y[..199], &uv, &uv, 20, 10, 20, 10),
            Err(EncodeError::InvalidBufferSize(_))
        ));
        assert!(matches!(
            FrameView::new(&y, &uv, &uv[..49], 20, 10, 20, 10),
            Err(EncodeError::InvalidBufferSize(_))
        ));
    }

    #[test]
    fn last_row_may_be_short() {
        // Stride padding is not required after the last row.
        let y = vec![0u8; 32 + 20];
        let uv = vec![0u8; 16 + 10];
        assert!(FrameView::new(&y, &uv, &uv, 20, 2, 32, 16).is_ok());
    }

    #[test]
    fn encoder_rejects_bad_setup() {
        let config = IntraConfig::default();
        assert!(matches!(
            IntraEncoder::new(16, 16, config.clone(), &[]),
            Err(EncodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            IntraEncoder::new(16, 16, config.clone(), &[1, 2, 3, 4, 5]),
            Err(EncodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            IntraEncoder::new(16, 16, config.clone(), &[128]),
            Err(EncodeError::InvalidParameter(_))
        ));
        assert!(matches!(
            IntraEncoder::new(16384, 16, config, &[10]),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn encode_next_validates_and_finishes() {
        let y = vec![128u8; 16 * 16];
        let uv = vec![128u8; 8 * 8];
        let frame = FrameView::new(&y, &uv, &uv, 16, 16, 16, 8).unwrap();
        let mut enc = IntraEncoder::new(16, 16, IntraConfig::default(), &[30, 60]).unwrap();

        assert!(matches!(
            enc.encode_next(&frame, 2),
            Err(EncodeError::InvalidParameter(_))
        ));
        let other = FrameView::new(&y, &uv, &uv, 15, 16, 16, 8).unwrap();
        assert!(matches!(
            enc.encode_next(&other, 0),
            Err(EncodeError::InvalidParameter(_))
        ));

        assert_eq!(enc.position(), Some((0, 0)));
        let mb = enc.encode_next(&frame, 1).unwrap();
        assert_eq!((mb.x, mb.y, mb.segment), (0, 0, 1));
        assert!(enc.is_done());
        assert_eq!(enc.position(), None);
        assert!(matches!(enc.encode_next(&frame, 0), Err(EncodeError::Finished)));

        assert_eq!(enc.stats().block_count_i16, 1);
        assert_eq!(enc.stats().block_count_skip, 1);

        enc.reset();
        assert_eq!(enc.remaining(), 1);
        assert_eq!(enc.stats(), &IntraStats::default());
    }
}
