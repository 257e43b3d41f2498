use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

const ALLOWED_EXTENSIONS: [&str; 8] = ["pdf", "doc", "docx", "txt", "rtf", "jpg", "jpeg", "png"];

/// Upload category; each lands in its own subdirectory under the uploads root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Document,
}

impl UploadKind {
    fn dir(self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Document => "documents",
        }
    }
}

/// Local disk storage served back under `/uploads`.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stores the bytes under a fresh name and returns the public path.
    pub async fn store(&self, kind: UploadKind, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        let ext = checked_extension(filename, data)?;

        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir).await?;

        let safe_filename = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(dir.join(&safe_filename), data).await.map_err(|e| {
            tracing::error!("Failed to write upload: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(format!("/uploads/{}/{}", kind.dir(), safe_filename))
    }
}

/// Lower-cased extension, if allowed and consistent with the file's leading
/// bytes.
fn checked_extension(filename: &str, data: &[u8]) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("Invalid JPEG file content".into()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("Invalid PNG file content".into()));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_needs_pdf_magic() {
        assert_eq!(checked_extension("cv.PDF", b"%PDF-1.7").unwrap(), "pdf");
        assert!(checked_extension("cv.pdf", b"hello").is_err());
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert!(checked_extension("run.exe", b"MZ").is_err());
        assert!(checked_extension("noext", b"data").is_err());
    }

    #[tokio::test]
    async fn stored_files_get_public_paths() {
        let root = std::env::temp_dir().join(format!("placement-storage-{}", Uuid::new_v4()));
        let storage = FileStorage::new(&root);
        let path = storage
            .store(UploadKind::Document, "marks.txt", b"semester 1")
            .await
            .unwrap();
        assert!(path.starts_with("/uploads/documents/"));
        assert!(path.ends_with(".txt"));

        let on_disk = root.join(path.trim_start_matches("/uploads/"));
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"semester 1");
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
