use crate::error::Result;
use crate::pipeline::RunReport;
use crate::tools;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Marker disc diameter in pixels, clamped to the image's smaller side.
const MARKER_DIAMETER: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    /// Composite a status dot at the image center, light on black
    /// backgrounds and dark otherwise.
    StatusDot,
    /// Rescale color saturation to the given percentage (100 = unchanged).
    Saturation(u32),
}

/// Applies `op` to every image file under `root`, recursively, writing each
/// result back over the original file. Per-file failures are logged and
/// recorded in the report; the traversal always continues.
pub fn transform_tree<P: AsRef<Path>>(
    root: P,
    op: TransformOp,
    report: &mut RunReport,
) -> Result<()> {
    let root = root.as_ref();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                println!("[!] skipped {}: {}", path.display(), e);
                report.record_failure(&path, e.to_string());
                continue;
            }
        };
        let path = entry.path();

        if !path.is_file() || !is_image_file(path) {
            continue;
        }

        match process_image(path, op) {
            Ok(()) => report.transformed += 1,
            Err(e) => {
                println!("[!] skipped {}: {}", path.display(), e);
                report.record_failure(path, e.to_string());
            }
        }
    }

    Ok(())
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let e = e.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// One image's round trip: normalize through pngcrush into a temp file,
/// decode, transform, write back to the original path.
fn process_image(path: &Path, op: TransformOp) -> Result<()> {
    let tmp = NamedTempFile::new()?;
    tools::revert_optimized_png(path, tmp.path())?;

    // The temp copy has no meaningful extension, so sniff the format
    let img = image::io::Reader::open(tmp.path())?
        .with_guessed_format()?
        .decode()?;

    let out = match op {
        TransformOp::StatusDot => stamp_status_dot(&img),
        TransformOp::Saturation(percent) => rescale_saturation(&img, percent),
    };

    // JPEG cannot carry an alpha channel
    let is_jpeg = path
        .extension()
        .map(|e| {
            let e = e.to_string_lossy().to_lowercase();
            e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false);
    if is_jpeg {
        DynamicImage::ImageRgba8(out).to_rgb8().save(path)?;
    } else {
        out.save(path)?;
    }

    Ok(())
}

/// Composites the status marker centered on the image. The variant follows
/// the single pixel at the exact center: pure black picks the light marker,
/// anything else (including an unreadable center) picks the dark one.
pub fn stamp_status_dot(img: &DynamicImage) -> RgbaImage {
    let mut out = img.to_rgba8();
    let (w, h) = out.dimensions();

    let diameter = MARKER_DIAMETER.min(w).min(h);
    if diameter == 0 {
        return out;
    }

    let marker = marker_disc(diameter, center_is_black(&out));
    imageops::overlay(
        &mut out,
        &marker,
        ((w - diameter) / 2) as i64,
        ((h - diameter) / 2) as i64,
    );

    out
}

fn center_is_black(img: &RgbaImage) -> bool {
    let (w, h) = img.dimensions();
    let (cx, cy) = (w / 2, h / 2);
    if cx >= w || cy >= h {
        // unreadable center counts as non-black
        return false;
    }
    let Rgba([r, g, b, _]) = *img.get_pixel(cx, cy);
    r == 0 && g == 0 && b == 0
}

fn marker_disc(diameter: u32, light: bool) -> RgbaImage {
    let color = if light {
        Rgba([255, 255, 255, 255])
    } else {
        Rgba([0, 0, 0, 255])
    };

    let mut disc = RgbaImage::new(diameter, diameter);
    let radius = diameter as f32 / 2.0;
    for (x, y, px) in disc.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if (dx * dx + dy * dy).sqrt() <= radius {
            *px = color;
        }
    }

    disc
}

/// Rescales every pixel's saturation to `percent` of its original value,
/// preserving hue, lightness and alpha.
pub fn rescale_saturation(img: &DynamicImage, percent: u32) -> RgbaImage {
    let factor = percent as f32 / 100.0;
    let mut out = img.to_rgba8();

    for px in out.pixels_mut() {
        let Rgba([r, g, b, a]) = *px;
        let (h, s, l) = rgb_to_hsl(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        );
        let (r, g, b) = hsl_to_rgb(h, (s * factor).clamp(0.0, 1.0), l);
        *px = Rgba([
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            a,
        ]);
    }

    out
}

fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
