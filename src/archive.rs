use crate::error::{IpamarkError, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const MACOS_METADATA_PREFIX: &str = "__MACOSX/";

/// Extracts every entry of a zip archive under `dest`, preserving relative
/// paths and overwriting existing files. macOS metadata entries are skipped.
pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, dest: Q) -> Result<()> {
    let archive_path = archive_path.as_ref();
    let dest = dest.as_ref();

    let file = File::open(archive_path)
        .map_err(|e| IpamarkError::ArchiveRead(archive_path.to_path_buf(), e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| IpamarkError::ArchiveRead(archive_path.to_path_buf(), e.to_string()))?;

    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        if file.name().starts_with(MACOS_METADATA_PREFIX) {
            continue;
        }

        let outpath = dest.join(file.name());

        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(p) = outpath.parent() {
                if !p.exists() {
                    fs::create_dir_all(p)?;
                }
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;

            // Preserve Unix permissions
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
                }
            }
        }
    }

    Ok(())
}

/// Unpacks an .ipa and returns the path of the .app bundle inside Payload/.
pub fn unpack_app<P: AsRef<Path>, Q: AsRef<Path>>(ipa_path: P, dest: Q) -> Result<PathBuf> {
    let dest = dest.as_ref();

    unpack(ipa_path, dest)?;

    let payload = dest.join("Payload");
    if !payload.is_dir() {
        return Err(IpamarkError::InvalidIpa(
            "No Payload folder found".to_string(),
        ));
    }

    let app_path = find_app_in_payload(&payload)?;
    if !app_path.join("Info.plist").exists() {
        return Err(IpamarkError::InvalidIpa(
            "No Info.plist found, invalid app".to_string(),
        ));
    }

    Ok(app_path)
}

fn find_app_in_payload(payload: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(payload)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.extension().map(|e| e == "app").unwrap_or(false) {
            return Ok(path);
        }
    }
    Err(IpamarkError::InvalidIpa("No .app folder found".to_string()))
}

/// Packs every file under `dir` into a new zip archive at `output`,
/// preserving relative structure. System metadata entries are left out.
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(dir: P, output: Q, compression_level: u32) -> Result<()> {
    let dir = dir.as_ref();
    let output = output.as_ref();

    let file = File::create(output)
        .map_err(|e| IpamarkError::ArchiveWrite(output.to_path_buf(), e.to_string()))?;
    let mut zip = zip::ZipWriter::new(file);

    let compression = match compression_level {
        0 => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    };

    let options = SimpleFileOptions::default().compression_method(compression);
    // Stored entries reject an explicit level; only set one when deflating.
    let options = match compression {
        CompressionMethod::Stored => options,
        _ => options.compression_level(Some(compression_level as i64)),
    };

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let path = entry.path();
        let name = path.strip_prefix(dir).expect("path is within dir");

        if is_metadata_entry(name) {
            continue;
        }

        if path.is_file() {
            let name_str = name.to_string_lossy().replace('\\', "/");
            zip.start_file(name_str, options)?;
            let mut f = File::open(path)?;
            let mut buffer = Vec::new();
            f.read_to_end(&mut buffer)?;
            zip.write_all(&buffer)?;
        } else if path.is_dir() && path != dir {
            let name_str = format!("{}/", name.to_string_lossy().replace('\\', "/"));
            zip.add_directory(name_str, options)?;
        }
    }

    zip.finish()?;

    Ok(())
}

fn is_metadata_entry(name: &Path) -> bool {
    name.components().any(|c| {
        let c = c.as_os_str().to_string_lossy();
        c == "__MACOSX" || c == ".DS_Store"
    })
}
