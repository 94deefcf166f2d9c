use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @const: Characters not allowed in file names on common filesystems
static INVALID_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]+"#).unwrap());

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)?;

        Ok(())
    }

    /// Return a path that does not collide with an existing file.
    ///
    /// If `name.ext` exists, tries `name(1).ext`, `name(2).ext` and so on.
    pub fn unique_path<P: AsRef<Path>>(path: P) -> PathBuf {
        let path = path.as_ref();
        if !path.exists() {
            return path.to_path_buf();
        }

        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut file_number = 1;
        loop {
            let candidate = directory.join(format!("{}({}){}", stem, file_number, extension));
            if !candidate.exists() {
                return candidate;
            }
            file_number += 1;
        }
    }

    /// Replace characters that are not allowed in file names with underscores
    pub fn safe_file_name(input: &str) -> String {
        let replaced = INVALID_FILENAME_CHARS.replace_all(input, "_");
        let trimmed = replaced.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            "untitled".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safeFileName_withInvalidChars_shouldReplaceWithUnderscore() {
        assert_eq!(FileManager::safe_file_name("a/b:c?d"), "a_b_c_d");
    }

    #[test]
    fn test_safeFileName_withOnlyInvalidChars_shouldFallBack() {
        assert_eq!(FileManager::safe_file_name("???"), "untitled");
    }

    #[test]
    fn test_safeFileName_withTrailingDots_shouldTrimThem() {
        assert_eq!(FileManager::safe_file_name("My Video..."), "My Video");
    }

    #[test]
    fn test_uniquePath_withNoCollision_shouldReturnInput() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        assert_eq!(FileManager::unique_path(&path), path);
    }

    #[test]
    fn test_uniquePath_withCollisions_shouldSuffixCounter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        fs::write(&path, b"x").unwrap();
        fs::write(dir.path().join("video(1).mp4"), b"x").unwrap();

        let unique = FileManager::unique_path(&path);
        assert_eq!(unique, dir.path().join("video(2).mp4"));
    }

    #[test]
    fn test_writeToFile_withNestedPath_shouldCreateParentsAndRoundTrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.txt");

        FileManager::write_to_file(&path, "hello").unwrap();
        assert!(FileManager::file_exists(&path));
        assert_eq!(FileManager::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_copyFile_withMissingSource_shouldFail() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileManager::copy_file(dir.path().join("absent"), dir.path().join("out"));
        assert!(result.is_err());
    }
}
