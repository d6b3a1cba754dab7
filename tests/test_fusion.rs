// tests/test_fusion.rs — End-to-end properties of the fusion pipeline.
//
// Only the public API is used, so these double as a check that the
// surface a boundary layer would call is usable on its own.

use approx::assert_abs_diff_eq;

use thermal_fusion::guidance::{decompose, luminance};
use thermal_fusion::inject::scale_detail;
use thermal_fusion::normalize::{normalize_optical, normalize_thermal};
use thermal_fusion::resample::upsample_thermal;
use thermal_fusion::{
    guided_detail_injection, Fusion, FusionParams, Image, RgbImage, ThermalScaling,
};

/// Mid-gray optical frame with a white square of side `side` centered in it.
fn square_scene(size: usize, side: usize) -> RgbImage {
    let lo = (size - side) / 2;
    let hi = lo + side;
    let mut img = RgbImage::from_pixel(size, size, [128, 128, 128]);
    for y in lo..hi {
        for x in lo..hi {
            img.set(x, y, [255, 255, 255]);
        }
    }
    img
}

/// Deterministic textured optical frame (LCG noise over a few rectangles).
fn textured_scene(w: usize, h: usize, seed: u32) -> RgbImage {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    let mut img = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let base = if (x / 16 + y / 12) % 2 == 0 { 60u8 } else { 190 };
            let n = next() / 8;
            img.set(x, y, [base.saturating_add(n), base, base.saturating_sub(n)]);
        }
    }
    img
}

/// Smooth thermal gradient with a hot spot, as raw 8-bit counts.
fn thermal_ramp(w: usize, h: usize) -> Image<u8> {
    Image::from_fn(w, h, |x, y| {
        let hot = if x > w / 3 && x < w / 2 && y > h / 3 && y < h / 2 { 80 } else { 0 };
        (20 + x * 100 / w.max(1) + y * 30 / h.max(1) + hot).min(255) as u8
    })
}

fn thermal_up_of(thermal: &Image<u8>, w: usize, h: usize) -> Image<f32> {
    let norm = normalize_thermal(thermal, ThermalScaling::Auto).unwrap();
    upsample_thermal(&norm, w, h).unwrap()
}

// ===== Shape and range =====

#[test]
fn output_matches_optical_shape() {
    for &(w, h, tw, th) in &[(64, 48, 8, 6), (37, 53, 5, 9), (20, 20, 40, 40)] {
        let optical = textured_scene(w, h, 7);
        let thermal = thermal_ramp(tw, th);
        let out = guided_detail_injection(&optical, &thermal, &FusionParams::default()).unwrap();
        assert_eq!(out.rgb.dimensions(), (w, h));
        assert_eq!(out.rgb.as_raw().len(), w * h * 3);
        assert_eq!(out.thermal.dimensions(), (w, h));
        assert_eq!(out.mask.dimensions(), (w, h));
    }
}

#[test]
fn fused_thermal_and_mask_in_unit_range() {
    for seed in [1u32, 42, 977] {
        let optical = textured_scene(80, 60, seed);
        let thermal = thermal_ramp(16, 12);
        let params = FusionParams { alpha: 3.0, blur_sigma: 2.0, ..Default::default() };
        let out = guided_detail_injection(&optical, &thermal, &params).unwrap();
        for (_, _, v) in out.thermal.pixels() {
            assert!(v.is_finite() && (0.0..=1.0).contains(&v), "fused sample {v}");
        }
        for (_, _, v) in out.mask.pixels() {
            assert!((0.0..=1.0).contains(&v), "mask sample {v}");
        }
    }
}

// ===== alpha =====

#[test]
fn zero_alpha_returns_upsampled_thermal() {
    let optical = textured_scene(64, 48, 3);
    let thermal = thermal_ramp(8, 6);
    let params = FusionParams { alpha: 0.0, ..Default::default() };
    let out = guided_detail_injection(&optical, &thermal, &params).unwrap();
    assert_eq!(out.thermal, thermal_up_of(&thermal, 64, 48));
}

#[test]
fn stronger_alpha_injects_more() {
    let optical = textured_scene(64, 48, 11);
    let thermal = thermal_ramp(8, 6);
    let up = thermal_up_of(&thermal, 64, 48);

    let deviation = |alpha: f32| {
        let params = FusionParams { alpha, ..Default::default() };
        let out = guided_detail_injection(&optical, &thermal, &params).unwrap();
        (out.thermal.zip_map(&up, |f, t| (f - t).abs()), out.mask)
    };

    let (mut prev, mask) = deviation(0.0);
    let mut grew = false;
    for alpha in [0.25f32, 0.5, 0.9, 1.5] {
        let (cur, _) = deviation(alpha);
        for (x, y, d) in cur.pixels() {
            assert!(
                d + 1e-7 >= prev.get(x, y),
                "deviation shrank at ({x},{y}) for alpha {alpha}: {} → {d}",
                prev.get(x, y)
            );
            if mask.get(x, y) > 0.0 && d > prev.get(x, y) {
                grew = true;
            }
        }
        prev = cur;
    }
    assert!(grew, "no pixel responded to alpha");
}

#[test]
fn max_alpha_on_sparse_scene_stays_finite() {
    // One bright pixel in a black frame: the mask is zero almost everywhere.
    let mut optical = RgbImage::new(40, 40);
    optical.set(20, 20, [255, 255, 255]);
    let thermal = Image::from_vec(4, 4, vec![100u8; 16]);
    let params = FusionParams { alpha: f32::MAX, edge_dilate: 1, ..Default::default() };
    let out = guided_detail_injection(&optical, &thermal, &params).unwrap();
    for (x, y, v) in out.thermal.pixels() {
        assert!(v.is_finite() && (0.0..=1.0).contains(&v), "fused ({x},{y}) = {v}");
    }
    // Where the mask is off the thermal band passes through untouched.
    assert_eq!(out.thermal.get(2, 2), 0.0);
}

// ===== Extreme but valid parameters =====

#[test]
fn huge_sigma_and_dilation_do_not_blow_up() {
    let optical = square_scene(40, 10);
    let thermal = thermal_ramp(8, 8);
    for params in [
        FusionParams { blur_sigma: 1e20, ..Default::default() },
        FusionParams { blur_sigma: 1e12, ..Default::default() },
        FusionParams { edge_dilate: i32::MAX, ..Default::default() },
        FusionParams { blur_sigma: f32::MAX, edge_dilate: i32::MAX, ..Default::default() },
    ] {
        let out = guided_detail_injection(&optical, &thermal, &params).unwrap();
        assert_eq!(out.rgb.dimensions(), (40, 40));
        assert!(
            out.thermal.pixels().all(|(_, _, v)| v.is_finite() && (0.0..=1.0).contains(&v)),
            "non-finite output for {params:?}"
        );
    }
}

// ===== Degenerate input =====

#[test]
fn constant_thermal_normalizes_to_zero() {
    let thermal = Image::from_vec(10, 10, vec![128u8; 100]);
    let norm = normalize_thermal(&thermal, ThermalScaling::Auto).unwrap();
    assert!(norm.pixels().all(|(_, _, v)| v == 0.0));

    let optical = square_scene(40, 10);
    let out = guided_detail_injection(&optical, &thermal, &FusionParams::default()).unwrap();
    assert!(out.thermal.pixels().all(|(_, _, v)| v.is_finite()));
}

#[test]
fn uniform_optical_takes_unit_divisor_path() {
    let optical = RgbImage::from_pixel(32, 24, [90, 140, 200]);
    let lum = luminance(&normalize_optical(&optical).unwrap());
    let parts = decompose(&lum, 5.0).unwrap();
    let (scaled, divisor) = scale_detail(&parts.detail);
    assert_eq!(divisor, 1.0);
    assert!(scaled.pixels().all(|(_, _, v)| v.is_finite()));

    let thermal = thermal_ramp(4, 3);
    let out = guided_detail_injection(&optical, &thermal, &FusionParams::default()).unwrap();
    // No structure to inject: the result is the upsampled thermal band.
    assert_eq!(out.thermal, thermal_up_of(&thermal, 32, 24));
    assert!(out.mask.pixels().all(|(_, _, v)| v == 0.0));
}

// ===== Reference scenario =====

#[test]
fn white_square_lifts_edges_only() {
    let optical = square_scene(100, 10); // square covers [45, 55)²
    let thermal = Image::from_vec(10, 10, vec![128u8; 100]);
    let params = FusionParams { alpha: 0.9, blur_sigma: 5.0, edge_dilate: 3, ..Default::default() };
    let out = guided_detail_injection(&optical, &thermal, &params).unwrap();

    assert_eq!(out.rgb.dimensions(), (100, 100));

    // Mask is on along the square's outline, off in flat regions.
    for &(x, y) in &[(44, 50), (55, 50), (50, 44), (50, 55)] {
        assert!(out.mask.get(x, y) > 0.5, "mask off at ({x},{y})");
    }
    for &(x, y) in &[(5, 5), (95, 95), (50, 50), (20, 80)] {
        assert_eq!(out.mask.get(x, y), 0.0, "mask on at ({x},{y})");
        assert_eq!(out.thermal.get(x, y), 0.0, "fused raised at ({x},{y})");
    }

    // Just inside the square the optical detail is positive → lifted.
    for &(x, y) in &[(45, 50), (54, 50), (50, 45), (50, 54)] {
        assert!(out.thermal.get(x, y) > 0.01, "edge not lifted at ({x},{y})");
    }

    // The rendering is brighter on the edge than in the background.
    let luma = |p: [u8; 3]| p[0] as u32 * 299 + p[1] as u32 * 587 + p[2] as u32 * 114;
    assert!(luma(out.rgb.get(45, 50)) > luma(out.rgb.get(5, 5)));
    assert_eq!(out.rgb.get(5, 5), out.rgb.get(50, 50));
}

// ===== Resolution independence =====

#[test]
fn doubling_thermal_resolution_keeps_output_shape() {
    let optical = textured_scene(90, 70, 5);
    let small = thermal_ramp(9, 7);
    let large = thermal_ramp(18, 14);
    let a = guided_detail_injection(&optical, &small, &FusionParams::default()).unwrap();
    let b = guided_detail_injection(&optical, &large, &FusionParams::default()).unwrap();
    assert_eq!(a.rgb.dimensions(), (90, 70));
    assert_eq!(b.rgb.dimensions(), (90, 70));
    // Same optical guide → same mask.
    assert_eq!(a.mask, b.mask);
}

#[test]
fn float_thermal_input_is_accepted() {
    let optical = textured_scene(40, 30, 9);
    let thermal = Image::from_fn(8, 6, |x, y| 290.0 + x as f32 * 0.5 + y as f32 * 0.25); // kelvin
    let out = guided_detail_injection(&optical, &thermal, &FusionParams::default()).unwrap();
    let (lo, hi) = out.thermal.min_max().unwrap();
    assert!(lo >= 0.0 && hi <= 1.0);
}

// ===== Determinism and sharing =====

#[test]
fn identical_inputs_identical_outputs() {
    let optical = textured_scene(50, 40, 21);
    let thermal = thermal_ramp(10, 8);
    let fusion = Fusion::default();
    let a = fusion.fuse(&optical, &thermal).unwrap();
    let b = fusion.fuse(&optical, &thermal).unwrap();
    assert_eq!(a.rgb, b.rgb);
    assert_eq!(a.thermal, b.thermal);
    assert_eq!(a.mask, b.mask);
}

#[test]
fn one_pipeline_shared_across_threads() {
    let fusion = Fusion::default();
    let optical = textured_scene(48, 32, 2);
    let thermal = thermal_ramp(6, 4);
    let expected = fusion.fuse(&optical, &thermal).unwrap();

    let (fusion, optical, thermal) = (&fusion, &optical, &thermal);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || fusion.fuse(optical, thermal).unwrap()))
            .collect();
        for handle in handles {
            let out = handle.join().unwrap();
            assert_eq!(out.thermal, expected.thermal);
        }
    });
}

#[test]
fn mean_of_fused_stays_close_to_thermal() {
    // Detail is zero-mean-ish and capped at 5% per sigma, so the overall
    // thermal level barely moves.
    let optical = textured_scene(64, 64, 13);
    let thermal = thermal_ramp(16, 16);
    let up = thermal_up_of(&thermal, 64, 64);
    let out = guided_detail_injection(&optical, &thermal, &FusionParams::default()).unwrap();
    assert_abs_diff_eq!(out.thermal.mean_std().0, up.mean_std().0, epsilon = 0.05);
}
