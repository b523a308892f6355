use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Human readable size as stored in `documents.file_size`, e.g. `"2.5 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / BYTES_PER_MB)
}

/// Unique on-disk name keeping the original extension.
pub fn stored_file_name(original: &str) -> String {
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Public path under which a stored file is served.
pub fn public_path(url_prefix: &str, stored_name: &str) -> String {
    format!("{}/{}", url_prefix.trim_end_matches('/'), stored_name)
}

/// Recovers the stored name from a public path, rejecting anything that
/// would escape the upload directory.
pub fn stored_name_from_public_path(public: &str) -> Option<&str> {
    let name = public.rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(name)
}

/// Writes an upload into `dir`, creating it when missing.
pub fn save_upload(dir: &Path, stored_name: &str, data: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(stored_name);
    std::fs::write(&path, data)?;
    Ok(path)
}

/// Deletes the file behind a public path. `Ok(false)` when nothing was there.
pub fn remove_upload(dir: &Path, public: &str) -> io::Result<bool> {
    let Some(name) = stored_name_from_public_path(public) else {
        return Ok(false);
    };
    match std::fs::remove_file(dir.join(name)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes_with_one_decimal() {
        assert_eq!(format_file_size(0), "0.0 MB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(2_621_440), "2.5 MB");
    }

    #[test]
    fn stored_names_are_unique_and_keep_extension() {
        let a = stored_file_name("Contract.PDF");
        let b = stored_file_name("Contract.PDF");
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
        assert!(!stored_file_name("README").contains('.'));
    }

    #[test]
    fn public_paths_round_trip_to_stored_names() {
        let path = public_path("/uploads/", "abc.pdf");
        assert_eq!(path, "/uploads/abc.pdf");
        assert_eq!(stored_name_from_public_path(&path), Some("abc.pdf"));
        assert_eq!(stored_name_from_public_path("/uploads/.."), None);
        assert_eq!(stored_name_from_public_path("/uploads/"), None);
    }

    #[test]
    fn saved_uploads_can_be_removed_once() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let path = save_upload(&uploads, "a.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        assert!(remove_upload(&uploads, "/uploads/a.pdf").unwrap());
        assert!(!remove_upload(&uploads, "/uploads/a.pdf").unwrap());
        assert!(!remove_upload(&uploads, "/uploads/..").unwrap());
    }
}
