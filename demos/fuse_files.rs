// demos/fuse_files.rs
//
// Fuse an optical photo and a thermal frame read from disk.
//
// Usage:
//   cargo run --example fuse_files --release -- <optical> <thermal> \
//       [alpha] [blur_sigma] [edge_dilate] [--diagnostics]
//
//   RUST_LOG=thermal_fusion=debug cargo run --example fuse_files -- a.jpg t.png
//
// Optical files are decoded as RGB8, thermal files as 8-bit grayscale.
// Parameters that are missing or do not parse fall back to their defaults.
//
// Output:
//   vis_output/fused.png            — colormapped fused thermal
//   vis_output/fused_thermal.png    — fused thermal band (with --diagnostics)
//   vis_output/fused_mask.png       — injection mask (with --diagnostics)

use thermal_fusion::convert::f32_normalized_to_u8;
use thermal_fusion::{Fusion, FusionParams, Image, RgbImage};

use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];
const OUTPUT_DIR: &str = "vis_output";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let diagnostics = args.iter().any(|a| a == "--diagnostics");
    let positional: Vec<&str> = args
        .iter()
        .skip(1)
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .collect();

    if positional.len() < 2 {
        eprintln!(
            "Usage: {} <optical> <thermal> [alpha] [blur_sigma] [edge_dilate] [--diagnostics]",
            args[0]
        );
        eprintln!("  e.g.: {} scene.jpg scene_ir.png 0.9 5 3", args[0]);
        std::process::exit(1);
    }

    let optical_path = Path::new(positional[0]);
    let thermal_path = Path::new(positional[1]);
    for path in [optical_path, thermal_path] {
        if !allowed_file(path) {
            eprintln!(
                "Error: {} is not one of: {}",
                path.display(),
                ALLOWED_EXTENSIONS.join(", ")
            );
            std::process::exit(1);
        }
    }

    let params = FusionParams::from_form(
        positional.get(2).copied(),
        positional.get(3).copied(),
        positional.get(4).copied(),
    );
    println!(
        "alpha = {}, blur_sigma = {}, edge_dilate = {}",
        params.alpha, params.blur_sigma, params.edge_dilate
    );

    let optical = load_rgb(optical_path);
    let thermal = load_grayscale(thermal_path);
    println!(
        "optical {}x{}, thermal {}x{}",
        optical.width(),
        optical.height(),
        thermal.width(),
        thermal.height()
    );

    let t0 = Instant::now();
    let out = match Fusion::new(params).fuse(&optical, &thermal) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    println!("Fused in {:.1} ms", t0.elapsed().as_secs_f64() * 1e3);

    fs::create_dir_all(OUTPUT_DIR).unwrap();
    let (rgb, thermal_band, mask) = out.into_parts();
    save_rgb(&rgb, &Path::new(OUTPUT_DIR).join("fused.png"));
    println!("Fused image saved to {OUTPUT_DIR}/fused.png");

    if diagnostics {
        save_grayscale(&thermal_band, &Path::new(OUTPUT_DIR).join("fused_thermal.png"));
        save_grayscale(&mask, &Path::new(OUTPUT_DIR).join("fused_mask.png"));
        let covered = mask.pixels().filter(|&(_, _, m)| m > 0.0).count();
        println!(
            "Diagnostics saved; mask covers {:.1}% of the frame",
            100.0 * covered as f64 / (mask.width() * mask.height()) as f64
        );
    }
}

fn allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_rgb(path: &Path) -> RgbImage {
    let img = image::open(path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    RgbImage::from_vec(w as usize, h as usize, rgb.into_raw())
}

fn load_grayscale(path: &Path) -> Image<u8> {
    let img = image::open(path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    Image::from_vec(w as usize, h as usize, gray.into_raw())
}

fn save_rgb(img: &RgbImage, path: &Path) {
    let buf = image::RgbImage::from_raw(img.width() as u32, img.height() as u32, img.as_raw().to_vec())
        .unwrap_or_else(|| panic!("buffer size mismatch for {}", path.display()));
    buf.save(path)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
}

fn save_grayscale(img: &Image<f32>, path: &Path) {
    let gray = f32_normalized_to_u8(img);
    let buf = image::GrayImage::from_raw(gray.width() as u32, gray.height() as u32, gray.into_vec())
        .unwrap_or_else(|| panic!("buffer size mismatch for {}", path.display()));
    buf.save(path)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
}
