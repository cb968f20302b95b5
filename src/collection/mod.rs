//! Page collection
//!
//! [`FlatPages`] owns the pages of one root directory. The page map is built
//! on first access by walking the root, and kept until [`FlatPages::reload`].
//! Parsed pages live in a [`FileCache`] that survives reloads, so a rebuild
//! only parses files whose modification time changed.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use crate::cache::{FileCache, FileSource};
use crate::config::Options;
use crate::content::{DirectoryScanner, Page, PageFile};
use crate::error::{Error, Result};
use crate::query::{PageList, Predicate};

/// Pages keyed by logical path, in discovery order
pub type PageMap = IndexMap<String, Arc<Page>>;

struct State {
    cache: FileCache,
    /// The built map of the current epoch, if any
    pages: Option<Arc<PageMap>>,
}

/// A collection of flat pages
///
/// All methods take `&self`; the build step runs under a lock so a map is
/// built at most once per epoch even when the collection is shared.
pub struct FlatPages {
    options: Options,
    state: Mutex<State>,
}

impl FlatPages {
    /// Create a collection reading from the filesystem
    pub fn new(options: Options) -> Self {
        let cache = FileCache::new(options.encoding, options.renderers.clone());
        Self::with_cache(options, cache)
    }

    /// Create a collection reading file content through a custom source
    pub fn with_source(options: Options, source: Arc<dyn FileSource>) -> Self {
        let cache = FileCache::with_source(source, options.encoding, options.renderers.clone());
        Self::with_cache(options, cache)
    }

    fn with_cache(options: Options, cache: FileCache) -> Self {
        Self {
            options,
            state: Mutex::new(State { cache, pages: None }),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Directory the pages are read from
    pub fn root(&self) -> &Path {
        &self.options.root
    }

    /// All pages, building the map if this epoch has none yet
    pub fn pages(&self) -> Result<Arc<PageMap>> {
        let mut state = self.state.lock();
        if let Some(pages) = &state.pages {
            return Ok(pages.clone());
        }

        let pages = Arc::new(self.build(&mut state.cache)?);
        state.pages = Some(pages.clone());
        Ok(pages)
    }

    fn build(&self, cache: &mut FileCache) -> Result<PageMap> {
        let start = std::time::Instant::now();
        let files = DirectoryScanner::new(&self.options.root, &self.options.extension).scan()?;

        let pages = insert_all(files, cache)?;

        tracing::debug!(
            "Loaded {} pages from {:?} in {:.2}ms",
            pages.len(),
            self.options.root,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(pages)
    }

    /// Forget the built map; the next access walks the root again
    ///
    /// Parsed pages stay cached and are reused when their file is unchanged.
    pub fn reload(&self) {
        if self.state.lock().pages.take().is_some() {
            tracing::debug!("Pages under {:?} marked for reload", self.options.root);
        }
    }

    /// Reload if the auto reload policy asks for it; returns whether it did
    pub fn auto_reset(&self, debug: bool) -> bool {
        let reload = self.options.auto_reload.should_reload(debug);
        if reload {
            self.reload();
        }
        reload
    }

    /// The page at `path`, if there is one
    pub fn get(&self, path: &str) -> Result<Option<Arc<Page>>> {
        Ok(self.pages()?.get(path).cloned())
    }

    /// The page at `path`, or [`Error::NotFound`]
    pub fn get_or_not_found(&self, path: &str) -> Result<Arc<Page>> {
        self.get(path)?
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    /// Iterate over the pages of the current epoch
    pub fn iter(&self) -> Result<Pages> {
        Ok(Pages {
            pages: self.pages()?,
            index: 0,
        })
    }

    /// All pages as a queryable list
    pub fn all(&self) -> Result<PageList> {
        Ok(self.iter()?.collect())
    }

    pub fn order_by(&self, key: &str) -> Result<PageList> {
        self.all()?.order_by(key)
    }

    pub fn filter(&self, predicates: &[Predicate]) -> Result<PageList> {
        Ok(self.all()?.filter(predicates))
    }

    /// A negated filter
    pub fn exclude(&self, predicates: &[Predicate]) -> Result<PageList> {
        Ok(self.all()?.exclude(predicates))
    }

    /// Number of files with a parsed page in the cache
    pub fn cached_files(&self) -> usize {
        self.state.lock().cache.len()
    }
}

/// Load scanned files into a map, later files replacing earlier ones on the same path
fn insert_all(files: Vec<PageFile>, cache: &mut FileCache) -> Result<PageMap> {
    let mut pages = PageMap::with_capacity(files.len());
    for file in files {
        let page = cache.load(&file.path, &file.filename)?;
        if pages.insert(file.path.clone(), page).is_some() {
            tracing::warn!(
                "Duplicate page path '{}', {:?} replaces the earlier file",
                file.path,
                file.filename
            );
        }
    }
    Ok(pages)
}

impl std::fmt::Debug for FlatPages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatPages")
            .field("root", &self.options.root)
            .field("extension", &self.options.extension)
            .finish_non_exhaustive()
    }
}

/// Owning iterator over one page map snapshot
#[derive(Debug, Clone)]
pub struct Pages {
    pages: Arc<PageMap>,
    index: usize,
}

impl Iterator for Pages {
    type Item = Arc<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, page) = self.pages.get_index(self.index)?;
        self.index += 1;
        Some(page.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pages.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pages {}
