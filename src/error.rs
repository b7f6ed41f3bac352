use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpamarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid IPA: {0}")]
    InvalidIpa(String),

    #[error("Cannot read archive {0}: {1}")]
    ArchiveRead(PathBuf, String),

    #[error("Cannot write archive {0}: {1}")]
    ArchiveWrite(PathBuf, String),

    #[error("Catalog extraction failed: {0}")]
    CatalogExtract(String),

    #[error("Catalog compilation failed: {0}")]
    CatalogCompile(String),

    #[error("PNG normalization failed: {0}")]
    ImageNormalize(String),
}

pub type Result<T> = std::result::Result<T, IpamarkError>;
