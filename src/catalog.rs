use crate::assets::{parse_image_name, AssetKind, ImageDescriptor};
use crate::error::Result;
use crate::pipeline::RunReport;
use serde::Serialize;
use std::fs;
use std::path::Path;

const APPICON_FOLDER: &str = "Assets.xcassets/AppIcon.appiconset/";
const MARKETING_SIZE: &str = "1024x1024";

#[derive(Serialize)]
struct IconContents {
    images: Vec<IconEntry>,
}

#[derive(Serialize)]
struct IconEntry {
    size: String,
    #[serde(rename = "expected-size")]
    expected_size: String,
    filename: String,
    folder: String,
    idiom: String,
    scale: String,
}

#[derive(Serialize)]
struct LaunchContents {
    images: Vec<LaunchEntry>,
    info: Info,
}

#[derive(Serialize)]
struct LaunchEntry {
    filename: String,
    idiom: String,
    scale: String,
}

#[derive(Serialize)]
struct Info {
    author: String,
    version: u32,
}

impl IconEntry {
    fn from_descriptor(d: &ImageDescriptor) -> Self {
        // App Store marketing icon is pinned regardless of parsed fields
        if d.nominal_size == MARKETING_SIZE {
            return Self {
                size: MARKETING_SIZE.to_string(),
                expected_size: "1024".to_string(),
                filename: "1024.png".to_string(),
                folder: APPICON_FOLDER.to_string(),
                idiom: "ios-marketing".to_string(),
                scale: "1x".to_string(),
            };
        }

        Self {
            size: d.nominal_size.clone(),
            expected_size: d.expected_size.clone(),
            filename: format!("{}.png", d.expected_size),
            folder: APPICON_FOLDER.to_string(),
            idiom: d.idiom.clone(),
            scale: d.scale.clone(),
        }
    }
}

/// Destination filename inside AppIcon.appiconset/ for a source image.
fn icon_destination(d: &ImageDescriptor) -> String {
    if d.nominal_size == MARKETING_SIZE {
        "1024.png".to_string()
    } else {
        format!("{}.png", d.expected_size)
    }
}

/// Builds an Assets.xcassets source directory from a flat directory of
/// extracted catalog images. Files that do not parse as catalog images are
/// ignored; per-file copy failures are recorded in the report instead of
/// aborting the build.
pub fn build<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    report: &mut RunReport,
) -> Result<()> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    let mut app_icons = Vec::new();
    let mut launch_images = Vec::new();

    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(descriptor) = parse_image_name(&name) else {
            continue;
        };
        match descriptor.kind {
            AssetKind::AppIcon => app_icons.push(descriptor),
            AssetKind::LaunchImage => launch_images.push(descriptor),
        }
    }

    // read_dir order is filesystem-dependent; sort for stable manifests
    app_icons.sort_by(|a, b| a.filename.cmp(&b.filename));
    launch_images.sort_by(|a, b| a.filename.cmp(&b.filename));

    fs::create_dir_all(output_dir)?;

    if !app_icons.is_empty() {
        let icon_dir = output_dir.join("AppIcon.appiconset");
        fs::create_dir_all(&icon_dir)?;

        let contents = IconContents {
            images: app_icons.iter().map(IconEntry::from_descriptor).collect(),
        };
        fs::write(
            icon_dir.join("Contents.json"),
            serde_json::to_string_pretty(&contents)?,
        )?;

        for d in &app_icons {
            let src = input_dir.join(&d.filename);
            let dest = icon_dir.join(icon_destination(d));
            if let Err(e) = fs::copy(&src, &dest) {
                println!("[!] failed to copy {}: {}", d.filename, e);
                report.record_failure(&src, e.to_string());
            }
        }
    }

    if !launch_images.is_empty() {
        let launch_dir = output_dir.join("LaunchImage.imageset");
        fs::create_dir_all(&launch_dir)?;

        let contents = LaunchContents {
            images: launch_images
                .iter()
                .map(|d| LaunchEntry {
                    filename: d.universal_filename(),
                    idiom: "universal".to_string(),
                    scale: d.scale.clone(),
                })
                .collect(),
            info: Info {
                author: "xcode".to_string(),
                version: 1,
            },
        };
        fs::write(
            launch_dir.join("Contents.json"),
            serde_json::to_string_pretty(&contents)?,
        )?;

        for d in &launch_images {
            let src = input_dir.join(&d.filename);
            let dest = launch_dir.join(d.universal_filename());
            if let Err(e) = fs::copy(&src, &dest) {
                println!("[!] failed to copy {}: {}", d.filename, e);
                report.record_failure(&src, e.to_string());
            }
        }
    }

    println!("[*] built asset catalog source at {}", output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_input(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"png").unwrap();
        }
    }

    #[test]
    fn builds_icon_and_launch_sets() {
        let input = TempDir::new().unwrap();
        seed_input(
            input.path(),
            &[
                "AppIcon60x60@2x.png",
                "AppIcon1024x1024.png",
                "LaunchImage@2x~iphone.png",
                "notes.txt",
            ],
        );
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();
        assert!(report.failures.is_empty());

        let icon_dir = xcassets.join("AppIcon.appiconset");
        assert!(icon_dir.join("120.png").exists());
        assert!(icon_dir.join("1024.png").exists());

        let launch_dir = xcassets.join("LaunchImage.imageset");
        assert!(launch_dir.join("LaunchImage@2x.png").exists());

        let contents: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(icon_dir.join("Contents.json")).unwrap())
                .unwrap();
        let images = contents["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);

        let regular = images
            .iter()
            .find(|i| i["size"] == "60x60")
            .expect("60x60 entry");
        assert_eq!(regular["expected-size"], "120");
        assert_eq!(regular["filename"], "120.png");
        assert_eq!(regular["folder"], "Assets.xcassets/AppIcon.appiconset/");
        assert_eq!(regular["idiom"], "universal");
        assert_eq!(regular["scale"], "2x");
    }

    #[test]
    fn marketing_icon_is_pinned() {
        // Even a scaled ipad variant of the 1024 icon must come out as the
        // 1x ios-marketing entry named 1024.png
        let input = TempDir::new().unwrap();
        seed_input(input.path(), &["AppIcon1024x1024@2x~ipad.png"]);
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();

        let icon_dir = xcassets.join("AppIcon.appiconset");
        assert!(icon_dir.join("1024.png").exists());

        let contents: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(icon_dir.join("Contents.json")).unwrap())
                .unwrap();
        let entry = &contents["images"][0];
        assert_eq!(entry["filename"], "1024.png");
        assert_eq!(entry["expected-size"], "1024");
        assert_eq!(entry["idiom"], "ios-marketing");
        assert_eq!(entry["scale"], "1x");
    }

    #[test]
    fn launch_contents_carry_info_block() {
        let input = TempDir::new().unwrap();
        seed_input(input.path(), &["LaunchImage@2x~ipad.png"]);
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();

        let contents: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(xcassets.join("LaunchImage.imageset/Contents.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(contents["info"]["author"], "xcode");
        assert_eq!(contents["info"]["version"], 1);
        assert_eq!(contents["images"][0]["filename"], "LaunchImage@2x.png");
        assert_eq!(contents["images"][0]["idiom"], "universal");
    }

    #[test]
    fn build_is_idempotent() {
        let input = TempDir::new().unwrap();
        seed_input(input.path(), &["AppIcon60x60@2x.png", "LaunchImage.png"]);
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();
        let first =
            fs::read_to_string(xcassets.join("AppIcon.appiconset/Contents.json")).unwrap();

        build(input.path(), &xcassets, &mut report).unwrap();
        let second =
            fs::read_to_string(xcassets.join("AppIcon.appiconset/Contents.json")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn copy_failure_is_recorded_not_fatal() {
        let input = TempDir::new().unwrap();
        seed_input(input.path(), &["AppIcon29x29.png"]);
        // a directory with a catalog image name parses but cannot be copied
        fs::create_dir(input.path().join("AppIcon60x60@2x.png")).unwrap();
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0]
            .0
            .ends_with("AppIcon60x60@2x.png"));

        // the rest of the set is still written
        let icon_dir = xcassets.join("AppIcon.appiconset");
        assert!(icon_dir.join("29.png").exists());
        assert!(icon_dir.join("Contents.json").exists());
    }

    #[test]
    fn empty_input_creates_no_sets() {
        let input = TempDir::new().unwrap();
        seed_input(input.path(), &["notes.txt"]);
        let output = TempDir::new().unwrap();
        let xcassets = output.path().join("Assets.xcassets");

        let mut report = RunReport::default();
        build(input.path(), &xcassets, &mut report).unwrap();

        assert!(!xcassets.join("AppIcon.appiconset").exists());
        assert!(!xcassets.join("LaunchImage.imageset").exists());
    }
}
