//! End-to-end mode decision over whole pictures through `IntraEncoder`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use zenvp8::common::types::{ChromaMode, LumaMode};
use zenvp8::encoder::cost::{select_best_mode, sse};
use zenvp8::encoder::filter_stats::MAX_LF_LEVELS;
use zenvp8::encoder::{
    DiffusionErrorState, EncodeError, FrameView, IntraConfig, IntraEncoder, MacroblockResult,
};

/// Owned 4:2:0 picture with tight strides.
struct Picture {
    width: usize,
    height: usize,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl Picture {
    fn filled(width: usize, height: usize, value: u8) -> Self {
        let (cw, ch) = (width.div_ceil(2), height.div_ceil(2));
        Self {
            width,
            height,
            y: vec![value; width * height],
            u: vec![value; cw * ch],
            v: vec![value; cw * ch],
        }
    }

    fn random(width: usize, height: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pic = Self::filled(width, height, 0);
        // Smooth gradients with noise, so every mode family has a chance.
        for (i, p) in pic.y.iter_mut().enumerate() {
            let (x, y) = (i % width, i / width);
            *p = ((x * 3 + y * 2) % 200) as u8 + rng.gen_range(0..40);
        }
        for p in pic.u.iter_mut().chain(pic.v.iter_mut()) {
            *p = rng.gen_range(90..170);
        }
        pic
    }

    fn view(&self) -> FrameView<'_> {
        FrameView::new(
            &self.y,
            &self.u,
            &self.v,
            self.width,
            self.height,
            self.width,
            self.width.div_ceil(2),
        )
        .unwrap()
    }
}

fn encode_all(pic: &Picture, config: IntraConfig, quants: &[u8]) -> (IntraEncoder, Vec<MacroblockResult>) {
    let frame = pic.view();
    let mut encoder = IntraEncoder::new(pic.width, pic.height, config, quants).unwrap();
    let mut results = Vec::new();
    let mut n = 0;
    while !encoder.is_done() {
        let segment = n % quants.len();
        results.push(encoder.encode_next(&frame, segment).unwrap());
        n += 1;
    }
    (encoder, results)
}

#[test]
fn flat_gray_macroblock_is_dc_and_skipped() {
    let pic = Picture::filled(16, 16, 128);
    let (_, results) = encode_all(&pic, IntraConfig::default(), &[40]);
    assert_eq!(results.len(), 1);

    let rd = &results[0].score;
    assert_eq!(rd.luma_mode, LumaMode::DC);
    assert_eq!(rd.mode_uv, ChromaMode::DC);
    assert_eq!(rd.nz, 0);
    assert_eq!(rd.d, 0);
    assert_eq!(rd.sd, 0);
    assert!(rd.is_skip());
    assert_eq!(results[0].recon.y, [128; 256]);
}

#[test]
fn single_pixel_spike_codes_ac() {
    let mut pic = Picture::filled(16, 16, 0);
    pic.y[6 * 16 + 5] = 255;
    for q in [10, 40, 80] {
        let (_, results) = encode_all(&pic, IntraConfig::default(), &[q]);
        let rd = &results[0].score;
        let has_ac = rd.y_ac_levels.iter().any(|b| b[1..].iter().any(|&l| l != 0));
        assert!(has_ac, "q={q} {:?}", rd.luma_mode);
        assert!(rd.d > 0, "q={q}");
        assert!(!rd.is_skip());
    }
}

#[test]
fn macroblocks_come_in_raster_order() {
    let pic = Picture::random(40, 24, 1);
    let frame = pic.view();
    let mut encoder = IntraEncoder::new(40, 24, IntraConfig::default(), &[30]).unwrap();
    assert_eq!(encoder.remaining(), 6);

    let mut seen = Vec::new();
    while let Some(pos) = encoder.position() {
        let mb = encoder.encode_next(&frame, 0).unwrap();
        assert_eq!((mb.x, mb.y), pos);
        seen.push(pos);
    }
    assert_eq!(seen, [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(encoder.remaining(), 0);
    assert!(matches!(encoder.encode_next(&frame, 0), Err(EncodeError::Finished)));
}

#[test]
fn decisions_are_deterministic() {
    let pic = Picture::random(48, 32, 7);
    let (_, first) = encode_all(&pic, IntraConfig::default(), &[20, 60]);
    let (_, second) = encode_all(&pic, IntraConfig::default(), &[20, 60]);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.score, b.score);
        assert_eq!(a.recon, b.recon);
    }
}

#[test]
fn distortion_matches_stitched_reconstruction() {
    let pic = Picture::random(32, 32, 3);
    let (encoder, results) = encode_all(&pic, IntraConfig::default(), &[35]);
    let frame = pic.view();

    for mb in &results {
        let mut src_y = [0u8; 256];
        for row in 0..16 {
            let start = (mb.y * 16 + row) * pic.width + mb.x * 16;
            src_y[row * 16..][..16].copy_from_slice(&frame.y()[start..start + 16]);
        }
        let mut src_u = [0u8; 64];
        let mut src_v = [0u8; 64];
        let cw = pic.width / 2;
        for row in 0..8 {
            let start = (mb.y * 8 + row) * cw + mb.x * 8;
            src_u[row * 8..][..8].copy_from_slice(&frame.u()[start..start + 8]);
            src_v[row * 8..][..8].copy_from_slice(&frame.v()[start..start + 8]);
        }
        let d = sse(&src_y, &mb.recon.y) + sse(&src_u, &mb.recon.u) + sse(&src_v, &mb.recon.v);
        assert_eq!(mb.score.d, i64::from(d), "mb ({}, {})", mb.x, mb.y);
    }

    let stats = encoder.stats();
    assert_eq!(stats.block_count_i4 + stats.block_count_i16, 4);
}

#[test]
fn four_by_four_levels_only_when_i4() {
    let pic = Picture::random(64, 32, 11);
    let (_, results) = encode_all(&pic, IntraConfig::new().with_method(6), &[10]);
    for mb in &results {
        let rd = &mb.score;
        if rd.is_i4() {
            assert_eq!(rd.y_dc_levels, [0; 16]);
            assert_eq!(rd.nz & (1 << 24), 0);
        } else {
            assert!(rd.y_ac_levels.iter().all(|b| b[0] == 0));
        }
        // nz bits agree with the levels.
        for n in 0..16 {
            let coded = rd.y_ac_levels[n].iter().any(|&l| l != 0);
            assert_eq!(rd.nz & (1 << n) != 0, coded, "block {n}");
        }
        for n in 0..8 {
            let coded = rd.uv_levels[n].iter().any(|&l| l != 0);
            assert_eq!(rd.nz & (1 << (16 + n)) != 0, coded, "chroma block {n}");
        }
    }
}

#[test]
fn method_zero_never_uses_i4() {
    let pic = Picture::random(48, 48, 5);
    let (encoder, results) = encode_all(&pic, IntraConfig::new().with_method(0), &[10]);
    assert!(results.iter().all(|mb| !mb.score.is_i4()));
    assert_eq!(encoder.stats().block_count_i4, 0);
}

#[test]
fn tournament_is_deterministic_and_bracketed() {
    let scores = [5i64, 5, 5, 9];
    let first = select_best_mode(&scores);
    for _ in 0..100 {
        assert_eq!(select_best_mode(&scores), first);
    }
    // Not the lowest index: round one goes to the right-hand twin.
    assert_eq!(first, 1);

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let len = rng.gen_range(1..=10);
        let scores: Vec<i64> = (0..len).map(|_| rng.gen_range(0..4)).collect();
        let best = select_best_mode(&scores);
        let min = *scores.iter().min().unwrap();
        assert_eq!(scores[best], min, "{scores:?}");
    }
}

#[test]
fn diffusion_conserves_bottom_right_error() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut state = DiffusionErrorState::new(3);
    for _ in 0..200 {
        let x = rng.gen_range(0..3);
        let derr: [[i8; 3]; 2] = core::array::from_fn(|_| core::array::from_fn(|_| rng.gen()));
        state.store(x, &derr);
        for ch in 0..2 {
            let [err1, err2, err3] = derr[ch];
            let (left, top) = (state.left()[ch], state.top(x)[ch]);
            assert_eq!(left[0], err1);
            assert_eq!(top[0], err2);
            assert_eq!(i32::from(left[1]), (3 * i32::from(err3)) >> 2);
            assert_eq!(i32::from(left[1]) + i32::from(top[1]), i32::from(err3));
        }
    }
}

#[test]
fn diffusion_only_runs_when_enabled() {
    let pic = Picture::random(32, 16, 21);
    let (_, off) = encode_all(&pic, IntraConfig::new().with_error_diffusion(false), &[60]);
    assert!(off.iter().all(|mb| mb.score.derr == [[0; 3]; 2]));

    let (_, on) = encode_all(&pic, IntraConfig::default(), &[60]);
    assert!(on.iter().any(|mb| mb.score.derr != [[0; 3]; 2]));
}

#[test]
fn prober_accumulates_per_segment() {
    let pic = Picture::random(64, 32, 8);
    let (encoder, results) = encode_all(&pic, IntraConfig::default(), &[20, 50]);
    let stats = encoder.filter_stats();

    for seg in 0..2 {
        let probed = results
            .iter()
            .filter(|mb| mb.segment == seg && (mb.score.is_i4() || !mb.score.is_skip()))
            .count();
        let base = stats.get(seg, 0);
        // Every probed macroblock adds at most 172 (one per SSIM window).
        assert!(base > 0.0 && base <= 172.0 * probed as f64, "seg {seg}: {base}");
        let levels = stats.segment(seg)[1..].iter().filter(|&&v| v > 0.0).count();
        assert!(levels > 0 && levels < MAX_LF_LEVELS);
    }
    assert!(stats.segment(2).iter().all(|&v| v == 0.0));
}

#[test]
fn prober_can_be_disabled() {
    let pic = Picture::random(32, 32, 8);
    let (encoder, _) = encode_all(&pic, IntraConfig::new().with_filter_stats(false), &[30]);
    assert!((0..4).all(|seg| encoder.filter_stats().segment(seg).iter().all(|&v| v == 0.0)));
}

#[test]
fn partial_macroblocks_replicate_edges() {
    // 20x18: the right and bottom macroblocks are mostly padding.
    let mut pic = Picture::filled(20, 18, 90);
    for y in 0..18 {
        pic.y[y * 20 + 19] = 200;
    }
    let (_, results) = encode_all(&pic, IntraConfig::default(), &[30]);
    assert_eq!(results.len(), 4);
    // The right-hand macroblock sees columns 16..20, then 200 repeated.
    let right = &results[1];
    let row = &right.recon.y[..16];
    assert!(row[8..].iter().all(|&p| p > 150), "{row:?}");
}

#[test]
fn reset_starts_a_new_picture() {
    let pic = Picture::random(32, 16, 4);
    let frame = pic.view();
    let mut encoder = IntraEncoder::new(32, 16, IntraConfig::default(), &[30]).unwrap();
    let first = encoder.encode_next(&frame, 0).unwrap();
    encoder.encode_next(&frame, 0).unwrap();
    encoder.reset();
    assert_eq!(encoder.position(), Some((0, 0)));
    let again = encoder.encode_next(&frame, 0).unwrap();
    assert_eq!(first.score, again.score);
    assert_eq!(first.recon, again.recon);
}

#[test]
fn frame_view_only_comes_from_validated_planes() {
    let y = vec![0u8; 24 * 20];
    let uv = vec![0u8; 12 * 10];
    let frame = FrameView::new(&y, &uv, &uv, 20, 20, 24, 12).unwrap();
    assert_eq!((frame.width(), frame.height()), (20, 20));
    assert_eq!((frame.y_stride(), frame.uv_stride()), (24, 12));
    assert_eq!(frame.y().len(), y.len());
    assert_eq!((frame.u().len(), frame.v().len()), (uv.len(), uv.len()));

    // One luma row short of covering the picture.
    let short = &y[..24 * 18 + 20];
    assert!(matches!(
        FrameView::new(short, &uv, &uv, 20, 20, 24, 12),
        Err(EncodeError::InvalidBufferSize(_))
    ));
}
