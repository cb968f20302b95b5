//! Directory scanner - finds page files below the pages root

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A page file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    /// Logical path: directory names and the file name without extension, `/`-joined
    pub path: String,
    /// Full file name on disk
    pub filename: PathBuf,
}

/// Walks a root directory for files ending with an extension
pub struct DirectoryScanner<'a> {
    root: &'a Path,
    extension: &'a str,
}

impl<'a> DirectoryScanner<'a> {
    /// Create a new scanner
    pub fn new(root: &'a Path, extension: &'a str) -> Self {
        Self { root, extension }
    }

    /// Find all page files
    ///
    /// Entries are visited in file name order within each directory, so the
    /// result is the same on every platform. A missing or unreadable root is a
    /// configuration error.
    pub fn scan(&self) -> Result<Vec<PageFile>> {
        let metadata = fs::metadata(self.root).map_err(|e| {
            Error::Configuration(format!("pages root {:?} is not readable: {}", self.root, e))
        })?;
        if !metadata.is_dir() {
            return Err(Error::Configuration(format!(
                "pages root {:?} is not a directory",
                self.root
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(self.root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                // an unreadable entry only matters if it would have been a page
                Err(e) => {
                    let path = e.path().map_or_else(|| self.root.to_path_buf(), Path::to_path_buf);
                    if path != self.root && !self.matches(path.file_name()) {
                        tracing::debug!("Skipping unreadable entry {:?}: {}", path, e);
                        continue;
                    }
                    return Err(Error::io(path, e.into()));
                }
            };

            if !entry.file_type().is_file() || !self.matches(Some(entry.file_name())) {
                continue;
            }

            let name = entry.file_name().to_str().ok_or_else(|| self.not_utf8(entry.path()))?;
            let Some(stem) = name.strip_suffix(self.extension) else {
                continue;
            };

            let path = self.logical_path(entry.path(), stem)?;
            files.push(PageFile {
                path,
                filename: entry.into_path(),
            });
        }

        tracing::debug!("Found {} page files under {:?}", files.len(), self.root);
        Ok(files)
    }

    /// Join the directories between root and file with the extensionless name
    fn logical_path(&self, file: &Path, stem: &str) -> Result<String> {
        let relative = file.strip_prefix(self.root).unwrap_or(file);

        let mut segments = Vec::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                let segment = component
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| self.not_utf8(file))?;
                segments.push(segment);
            }
        }
        segments.push(stem);

        Ok(segments.join("/"))
    }

    /// Whether a file name ends with the extension, compared on raw bytes
    fn matches(&self, name: Option<&OsStr>) -> bool {
        name.is_some_and(|name| name.as_encoded_bytes().ends_with(self.extension.as_bytes()))
    }

    fn not_utf8(&self, path: &Path) -> Error {
        Error::Encoding {
            path: path.to_path_buf(),
            encoding: "utf-8 file name".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "title: x\n\nbody").unwrap();
    }

    #[test]
    fn test_logical_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "blog/2024/hello.html");
        touch(dir.path(), "blog/notes.txt");
        touch(dir.path(), "static/style.css");

        let files = DirectoryScanner::new(dir.path(), ".html").scan().unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["blog/2024/hello", "index"]);
        assert_eq!(files[1].filename, dir.path().join("index.html"));
    }

    #[test]
    fn test_only_suffix_is_stripped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "archive.html.html");
        touch(dir.path(), "sub.html/page.html");

        let files = DirectoryScanner::new(dir.path(), ".html").scan().unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["archive.html", "sub.html/page"]);
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.md");
        touch(dir.path(), "b.html");

        let files = DirectoryScanner::new(dir.path(), ".md").scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "a");
    }

    #[test]
    fn test_missing_root_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = DirectoryScanner::new(&missing, ".html").scan().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_file_root_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "page.html");

        let root = dir.path().join("page.html");
        let err = DirectoryScanner::new(&root, ".html").scan().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_entries_that_are_not_pages_are_skipped() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("README")).unwrap();
        let latin1 = OsString::from_vec(b"caf\xe9.bak".to_vec());
        // some filesystems refuse names that are not valid UTF-8
        let _ = fs::write(dir.path().join(latin1), "x");

        let files = DirectoryScanner::new(dir.path(), ".html").scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "index");
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_page_symlink_is_io_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("gone.html"))
            .unwrap();

        let err = DirectoryScanner::new(dir.path(), ".html").scan().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_empty_root_has_no_pages() {
        let dir = TempDir::new().unwrap();
        assert!(DirectoryScanner::new(dir.path(), ".html").scan().unwrap().is_empty());
    }
}
