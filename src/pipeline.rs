use crate::error::{IpamarkError, Result};
use crate::transform::TransformOp;
use crate::{archive, catalog, tools, transform};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one pipeline run needs. The defaults mirror the paths the
/// tool historically assumed, but callers always pass the full struct.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The .ipa to modify.
    pub archive: PathBuf,
    /// Where the modified .ipa is written.
    pub output: PathBuf,
    /// Scratch directory, created at start and removed when the run ends.
    pub workdir: PathBuf,
    pub mode: TransformOp,
    /// Zip compression level for the repacked archive (0-9).
    pub compression_level: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            archive: PathBuf::from("app.ipa"),
            output: PathBuf::from("modified_icon.ipa"),
            workdir: PathBuf::from("output"),
            mode: TransformOp::StatusDot,
            compression_level: 6,
        }
    }
}

/// Per-run summary: how many images were transformed and which files were
/// skipped. Per-file failures never abort the run; they end up here.
#[derive(Debug, Default)]
pub struct RunReport {
    pub transformed: u32,
    pub failures: Vec<(PathBuf, String)>,
}

impl RunReport {
    pub fn record_failure<P: AsRef<Path>>(&mut self, path: P, reason: String) {
        self.failures.push((path.as_ref().to_path_buf(), reason));
    }
}

/// Scoped working directory: created up front, removed on drop. Dropping on
/// the error path cleans up partial state the same way as on success.
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // a stale tree from an interrupted run would leak into this one
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the whole pipeline: unpack, extract catalog, transform, rebuild
/// catalog, compile, repack. External-tool failures abort; per-image
/// failures accumulate in the returned report.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    if !config.archive.exists() {
        return Err(IpamarkError::FileNotFound(config.archive.clone()));
    }

    let workdir = WorkDir::create(&config.workdir)?;
    let staging = workdir.path().join("ipa_extract");

    println!("[*] extracting {}", config.archive.display());
    let app_dir = archive::unpack_app(&config.archive, &staging)?;

    let car_path = app_dir.join("Assets.car");
    if !car_path.exists() {
        return Err(IpamarkError::FileNotFound(car_path));
    }

    let assets_dir = workdir.path().join("assets");
    println!("[*] extracting asset catalog");
    tools::extract_car(&car_path, &assets_dir)?;

    let mut report = RunReport::default();

    println!("[*] transforming extracted assets");
    transform::transform_tree(&assets_dir, config.mode, &mut report)?;

    println!("[*] transforming bundle images");
    transform::transform_tree(&app_dir, config.mode, &mut report)?;

    let xcassets_dir = workdir.path().join("Assets.xcassets");
    catalog::build(&assets_dir, &xcassets_dir, &mut report)?;

    println!("[*] compiling asset catalog");
    tools::compile_car(&xcassets_dir, &app_dir)?;

    println!("[*] repacking {}", config.output.display());
    archive::pack(&staging, &config.output, config.compression_level)?;

    Ok(report)
}
