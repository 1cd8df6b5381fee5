//! Attachment constraints shared by the client and the standalone backend.

use super::ValidationError;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted upload: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted file extensions (lowercase, without dot).
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "pdf", "docx", "txt"];

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// A local file that passed the pre-upload checks.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl AttachmentFile {
    /// Check type and size of the file at `path` without reading its content.
    ///
    pub fn inspect(path: impl AsRef<Path>) -> Result<AttachmentFile, ValidationError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ValidationError::UnreadableFile {
                path: path.display().to_string(),
                message: "no file name".to_string(),
            })?
            .to_owned();
        check_extension(&file_name)?;
        let metadata = fs::metadata(path).map_err(|e| ValidationError::UnreadableFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(ValidationError::UnreadableFile {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }
        check_size(metadata.len())?;
        Ok(AttachmentFile {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }
}

/// Return the lowercase extension of a file name, if any.
///
pub fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn check_extension(file_name: &str) -> Result<(), ValidationError> {
    match extension(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ValidationError::UnsupportedType(ext)),
        None => Err(ValidationError::UnsupportedType(file_name.to_owned())),
    }
}

pub fn check_size(size: u64) -> Result<(), ValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge { size });
    }
    Ok(())
}

/// Whether a stored attachment can be previewed as an image.
///
pub fn is_image(file_name: &str) -> bool {
    extension(file_name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Strip the collision-avoidance prefix (`<hex>_`) from a stored name.
///
pub fn display_name(stored: &str) -> &str {
    match stored.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            rest
        }
        _ => stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn inspect_accepts_small_allowed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        fs::write(&path, b"hello").unwrap();

        let file = AttachmentFile::inspect(&path).unwrap();
        assert_eq!(file.file_name, "notes.TXT");
        assert_eq!(file.size, 5);
    }

    #[test]
    fn inspect_rejects_oversized_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        let file = File::create(&path).unwrap();
        file.set_len(11 * 1024 * 1024).unwrap();

        assert_eq!(
            AttachmentFile::inspect(&path),
            Err(ValidationError::FileTooLarge {
                size: 11 * 1024 * 1024
            })
        );
    }

    #[test]
    fn inspect_accepts_exactly_ten_mebibytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        File::create(&path).unwrap().set_len(MAX_FILE_SIZE).unwrap();
        assert!(AttachmentFile::inspect(&path).is_ok());
    }

    #[test]
    fn inspect_rejects_unsupported_type_before_touching_disk() {
        assert_eq!(
            AttachmentFile::inspect("/does/not/exist/tool.exe"),
            Err(ValidationError::UnsupportedType("exe".to_string()))
        );
    }

    #[test]
    fn display_name_strips_hex_prefix() {
        assert_eq!(display_name("1a2b3c4d_report.pdf"), "report.pdf");
        assert_eq!(display_name("my_report.pdf"), "my_report.pdf");
        assert_eq!(display_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn image_detection_is_case_insensitive() {
        assert!(is_image("abc_photo.JPG"));
        assert!(!is_image("abc_doc.pdf"));
    }
}
