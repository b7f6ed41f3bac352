//! Wrappers for the external binaries the pipeline depends on. Compiled
//! asset catalogs and iOS-optimized PNGs are opaque formats; both directions
//! go through Apple's tooling rather than anything reimplemented here.

use crate::error::{IpamarkError, Result};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Extracts a compiled Assets.car into a flat directory of images.
pub fn extract_car<P: AsRef<Path>, Q: AsRef<Path>>(car_path: P, output_dir: Q) -> Result<()> {
    let car_path = car_path.as_ref();
    let output_dir = output_dir.as_ref();

    fs::create_dir_all(output_dir)?;

    let output = Command::new("acextract")
        .arg("-i")
        .arg(car_path)
        .arg("-o")
        .arg(output_dir)
        .output()
        .map_err(|e| IpamarkError::CatalogExtract(format!("acextract: {}", e)))?;

    if !output.status.success() {
        return Err(IpamarkError::CatalogExtract(format!(
            "acextract failed for {}: {}",
            car_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// Compiles an .xcassets source directory into Assets.car inside `app_dir`.
pub fn compile_car<P: AsRef<Path>, Q: AsRef<Path>>(xcassets_dir: P, app_dir: Q) -> Result<()> {
    let xcassets_dir = xcassets_dir.as_ref();
    let app_dir = app_dir.as_ref();

    let output = Command::new("actool")
        .args(["--output-format", "human-readable-text"])
        .arg("--notices")
        .arg("--warnings")
        .args(["--platform", "iphoneos"])
        .args(["--minimum-deployment-target", "12.0"])
        .args(["--target-device", "iphone"])
        .args(["--target-device", "ipad"])
        .arg("--compile")
        .arg(app_dir)
        .arg(xcassets_dir)
        .output()
        .map_err(|e| IpamarkError::CatalogCompile(format!("actool: {}", e)))?;

    if !output.status.success() {
        return Err(IpamarkError::CatalogCompile(format!(
            "actool failed for {}: {}",
            xcassets_dir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// Reverts iphone-optimized PNG encoding so a general-purpose decoder can
/// read the file. Writes the normalized copy to `output_path`.
pub fn revert_optimized_png<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
) -> Result<()> {
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    let output = Command::new("xcrun")
        .args(["-sdk", "iphoneos", "pngcrush", "-revert-iphone-optimizations"])
        .arg(input_path)
        .arg(output_path)
        .output()
        .map_err(|e| IpamarkError::ImageNormalize(format!("xcrun pngcrush: {}", e)))?;

    if !output.status.success() {
        return Err(IpamarkError::ImageNormalize(format!(
            "pngcrush failed for {}: {}",
            input_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}
