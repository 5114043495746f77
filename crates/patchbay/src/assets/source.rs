//! Where symbol image bytes come from.

use std::{
    collections::HashMap,
    fs,
    path::{Component, Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::{self, BoxFuture, FutureExt};
use log::trace;

use super::AssetError;

/// Resolves an asset URL to raw bytes.
///
/// Implementations decide what a URL means; the cache only calls
/// [`AssetSource::fetch`] and never retries.
pub trait AssetSource: Send + Sync {
    /// Starts fetching `url`. The returned future owns everything it needs.
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>>;
}

/// Reads assets from a directory, treating URLs as paths relative to it.
///
/// A leading `/` is stripped, so `/symbols/vca.png` resolves to
/// `<root>/symbols/vca.png`. URLs with a scheme or a `..` segment are
/// rejected.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an asset URL to a file under the root.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::UnsupportedUrl`] for remote or escaping URLs.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, AssetError> {
        if url.contains("://") {
            return Err(AssetError::UnsupportedUrl(url.to_string()));
        }

        let relative = Path::new(url.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(AssetError::UnsupportedUrl(url.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
        let path = match self.resolve(url) {
            Ok(path) => path,
            Err(err) => return future::ready(Err(err)).boxed(),
        };
        let url = url.to_string();

        async move {
            trace!(path = path.display().to_string(); "Reading asset file");
            fs::read(&path).map_err(|source| AssetError::Io { url, source })
        }
        .boxed()
    }
}

/// In-memory asset store keyed by URL.
///
/// Counts fetches per URL, which makes it the source of choice for tests
/// and for embedders that bundle their symbol images.
#[derive(Debug, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Arc<[u8]>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset, builder style.
    pub fn with_asset(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Adds or replaces an asset.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(url.into(), Arc::from(bytes.into()));
    }

    /// Number of times `url` has been fetched.
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of fetches across all URLs.
    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
        *self
            .fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default() += 1;

        let result = self
            .assets
            .get(url)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(url.to_string()));
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn test_fs_resolve_strips_leading_slash() {
        let source = FsAssetSource::new("/srv/assets");
        assert_eq!(
            source.resolve("/symbols/vca.png").unwrap(),
            PathBuf::from("/srv/assets/symbols/vca.png")
        );
        assert_eq!(
            source.resolve("symbols/vca.png").unwrap(),
            PathBuf::from("/srv/assets/symbols/vca.png")
        );
    }

    #[test]
    fn test_fs_resolve_rejects_escapes() {
        let source = FsAssetSource::new("/srv/assets");
        assert!(matches!(
            source.resolve("/../etc/passwd"),
            Err(AssetError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            source.resolve("https://cdn.example.com/vca.png"),
            Err(AssetError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            source.resolve("/"),
            Err(AssetError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn test_fs_fetch_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("symbols")).unwrap();
        fs::write(dir.path().join("symbols/lfo.png"), b"bytes").unwrap();

        let source = FsAssetSource::new(dir.path());
        let bytes = block_on(source.fetch("/symbols/lfo.png")).unwrap();
        assert_eq!(bytes, b"bytes");

        let missing = block_on(source.fetch("/symbols/vca.png"));
        assert!(matches!(missing, Err(AssetError::Io { .. })));
    }

    #[test]
    fn test_memory_source_counts_fetches() {
        let source = MemoryAssetSource::new().with_asset("/a.png", vec![1, 2, 3]);

        assert_eq!(block_on(source.fetch("/a.png")).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            block_on(source.fetch("/b.png")),
            Err(AssetError::NotFound(_))
        ));
        let _ = block_on(source.fetch("/a.png"));

        assert_eq!(source.fetch_count("/a.png"), 2);
        assert_eq!(source.fetch_count("/b.png"), 1);
        assert_eq!(source.total_fetches(), 3);
    }
}
