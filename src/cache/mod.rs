//! File cache
//!
//! Parsed pages are kept per source file together with the modification time
//! they were read at. A page is reused as long as the file's modification
//! time has not changed, so rebuilding the collection only re-parses files
//! that were touched.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::Encoding;
use crate::content::{Page, Renderers};
use crate::error::{Error, Result};

/// Where file content and modification times come from
pub trait FileSource: Send + Sync {
    /// Last modification time of a file
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Full content of a file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// A parsed page and the modification time of the file it came from
struct CacheEntry {
    page: Arc<Page>,
    mtime: SystemTime,
}

/// Parsed pages keyed by file name
///
/// Entries are only ever replaced, never evicted: the number of entries is
/// bounded by the number of distinct files seen.
pub struct FileCache {
    source: Arc<dyn FileSource>,
    encoding: Encoding,
    renderers: Renderers,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl FileCache {
    /// Create a cache reading from the filesystem
    pub fn new(encoding: Encoding, renderers: Renderers) -> Self {
        Self::with_source(Arc::new(FsSource), encoding, renderers)
    }

    /// Create a cache reading through a custom source
    pub fn with_source(
        source: Arc<dyn FileSource>,
        encoding: Encoding,
        renderers: Renderers,
    ) -> Self {
        Self {
            source,
            encoding,
            renderers,
            entries: HashMap::new(),
        }
    }

    /// Load the page stored in `filename`, parsing it only if it changed
    pub fn load(&mut self, path: &str, filename: &Path) -> Result<Arc<Page>> {
        let mtime = self
            .source
            .modified(filename)
            .map_err(|e| Error::io(filename, e))?;

        if let Some(cached) = self.entries.get(filename) {
            if cached.mtime == mtime {
                tracing::debug!("Cache hit: {:?}", filename);
                return Ok(cached.page.clone());
            }
            tracing::debug!("Cache stale: {:?}", filename);
        }

        let bytes = self.source.read(filename).map_err(|e| Error::io(filename, e))?;
        let text = self.encoding.decode(bytes).ok_or_else(|| Error::Encoding {
            path: filename.to_path_buf(),
            encoding: self.encoding.to_string(),
        })?;

        let page = Arc::new(Page::parse(path, &text, self.renderers.clone())?);
        tracing::debug!("Parsed page '{}' from {:?}", path, filename);

        self.entries.insert(
            filename.to_path_buf(),
            CacheEntry {
                page: page.clone(),
                mtime,
            },
        );
        Ok(page)
    }

    /// Whether a parsed page is held for `filename`
    pub fn contains(&self, filename: &Path) -> bool {
        self.entries.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCache")
            .field("encoding", &self.encoding)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
