//! Symbol image loading and caching.
//!
//! [`ImageAssetCache`] is an explicit, injectable service: construct one per
//! application (or per test), hand clones of it to editors and viewers, and
//! call [`ImageAssetCache::clear`] on teardown.
//!
//! Preloads are coalesced at two levels:
//!
//! - a batch (the deduplicated id list) that is already known returns a clone
//!   of the same shared future, so concurrent callers resolve to the very
//!   same `Arc<ImageMap>`;
//! - each asset is fetched at most once per cache lifetime, even when it is
//!   part of several overlapping batches.
//!
//! A failed asset is logged and left out of the resulting map. It never fails
//! the batch.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use futures::executor::block_on;
//! use patchbay::assets::{ImageAssetCache, MemoryAssetSource};
//! use patchbay::registry::SymbolRegistry;
//!
//! let cache = ImageAssetCache::new(
//!     Arc::new(SymbolRegistry::builtin()),
//!     Arc::new(MemoryAssetSource::new()),
//! );
//!
//! // Nothing is stored in the source, so every asset fails
//! let images = block_on(cache.preload(["vco-sine", "lfo"]));
//! assert!(images.is_empty());
//! assert_eq!(cache.progress(), 100);
//! ```

mod source;

pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};

use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use image::RgbaImage;
use indexmap::IndexMap;
use log::{debug, info, warn};
use thiserror::Error;

use patchbay_core::{geometry::Size, registry::SymbolRegistry};

/// Errors raised while loading a single asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("symbol `{0}` is not in the registry")]
    UnknownSymbol(String),

    #[error("asset `{0}` not found")]
    NotFound(String),

    #[error("unsupported asset URL `{0}`")]
    UnsupportedUrl(String),

    #[error("failed to read `{url}`: {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode `{url}`: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded images keyed by symbol id, in request order.
pub type ImageMap = IndexMap<String, Arc<SymbolImage>>;

/// A pending or completed preload. Clones share one underlying operation.
pub type PreloadHandle = Shared<BoxFuture<'static, Arc<ImageMap>>>;

type AssetFuture = Shared<BoxFuture<'static, Option<Arc<SymbolImage>>>>;

/// A loaded symbol image.
///
/// Raster formats are decoded to RGBA pixels. SVG documents are kept as
/// bytes only and have no intrinsic size.
#[derive(Debug)]
pub struct SymbolImage {
    symbol_id: String,
    url: String,
    bytes: Vec<u8>,
    mime: &'static str,
    pixels: Option<RgbaImage>,
}

impl SymbolImage {
    /// Decodes `bytes`, guessing the format from their content.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Decode`] when the bytes are neither SVG nor a
    /// supported raster format.
    pub fn decode(
        symbol_id: impl Into<String>,
        url: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, AssetError> {
        let symbol_id = symbol_id.into();
        let url = url.into();

        if looks_like_svg(&bytes) {
            return Ok(Self {
                symbol_id,
                url,
                bytes,
                mime: "image/svg+xml",
                pixels: None,
            });
        }

        let decoded = image::guess_format(&bytes).and_then(|format| {
            image::load_from_memory_with_format(&bytes, format)
                .map(|image| (format, image.into_rgba8()))
        });
        match decoded {
            Ok((format, pixels)) => Ok(Self {
                symbol_id,
                url,
                bytes,
                mime: format.to_mime_type(),
                pixels: Some(pixels),
            }),
            Err(source) => Err(AssetError::Decode { url, source }),
        }
    }

    pub fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The undecoded asset bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Decoded pixels, absent for SVG assets
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    /// Intrinsic pixel size, absent for SVG assets
    pub fn size(&self) -> Option<Size> {
        self.pixels
            .as_ref()
            .map(|pixels| Size::new(pixels.width() as f32, pixels.height() as f32))
    }

    /// The asset as a `data:` URI.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[derive(Default)]
struct CacheState {
    /// Bumped by `clear`; futures from an older generation stop reporting.
    /// Futures hold the state weakly, so pending entries never keep it alive.
    generation: u64,
    assets: HashMap<String, AssetFuture>,
    batches: HashMap<Vec<String>, PreloadHandle>,
    latest: Option<Arc<ImageMap>>,
    total: usize,
    settled: usize,
}

/// Deduplicating, progress-tracking image cache.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ImageAssetCache {
    registry: Arc<SymbolRegistry>,
    source: Arc<dyn AssetSource>,
    state: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for ImageAssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ImageAssetCache")
            .field("symbols", &self.registry.len())
            .field("assets", &state.assets.len())
            .field("batches", &state.batches.len())
            .finish()
    }
}

impl ImageAssetCache {
    pub fn new(registry: Arc<SymbolRegistry>, source: Arc<dyn AssetSource>) -> Self {
        Self {
            registry,
            source,
            state: Arc::default(),
        }
    }

    /// The catalog used to resolve ids to asset URLs.
    pub fn registry(&self) -> &Arc<SymbolRegistry> {
        &self.registry
    }

    /// Starts (or joins) a preload of the given symbol ids.
    ///
    /// Duplicate ids are ignored. Asking again for the same id list returns
    /// a clone of the existing handle, whether it is still pending or done.
    pub fn preload<I, S>(&self, ids: I) -> PreloadHandle
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = batch_key(ids);
        let mut state = self.state();

        if let Some(handle) = state.batches.get(&key) {
            debug!(assets = key.len(); "Joining existing preload");
            return handle.clone();
        }

        info!(assets = key.len(); "Preloading symbol images");
        let generation = state.generation;
        let pending: Vec<(String, AssetFuture)> = key
            .iter()
            .map(|id| (id.clone(), self.asset_future(&mut state, id)))
            .collect();

        let shared_state = Arc::downgrade(&self.state);
        let handle = async move {
            let requested = pending.len();
            let results = join_all(
                pending
                    .into_iter()
                    .map(|(id, image)| async move { (id, image.await) }),
            )
            .await;

            let images: ImageMap = results
                .into_iter()
                .filter_map(|(id, image)| image.map(|image| (id, image)))
                .collect();
            let images = Arc::new(images);

            if let Some(shared_state) = shared_state.upgrade() {
                let mut state = lock(&shared_state);
                if state.generation == generation {
                    state.latest = Some(merge_loaded(state.latest.take(), &images));
                }
            }

            info!(requested = requested, loaded = images.len(); "Symbol images preloaded");
            images
        }
        .boxed()
        .shared();

        state.batches.insert(key, handle.clone());
        handle
    }

    /// Returns the result of a preload of exactly these ids if it has finished.
    pub fn completed<I, S>(&self, ids: I) -> Option<Arc<ImageMap>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = batch_key(ids);
        self.state()
            .batches
            .get(&key)
            .and_then(|handle| handle.peek().cloned())
    }

    /// True once a preload has finished and no requested asset is pending.
    pub fn is_fully_loaded(&self) -> bool {
        let state = self.state();
        state.latest.is_some() && state.settled == state.total
    }

    /// Every image loaded so far, once at least one preload has finished.
    ///
    /// Completed batches accumulate, so a small batch finishing after a
    /// larger one never hides images the cache already holds.
    pub fn get_cached_if_ready(&self) -> Option<Arc<ImageMap>> {
        self.state().latest.clone()
    }

    /// Percentage of requested assets that have settled, successful or not.
    ///
    /// Returns 100 when nothing has been requested.
    pub fn progress(&self) -> u8 {
        let state = self.state();
        if state.total == 0 {
            return 100;
        }
        ((state.settled as f64 / state.total as f64) * 100.0).round() as u8
    }

    /// Drops every cached and in-flight entry.
    ///
    /// Futures already handed out still complete, but no longer update this
    /// cache.
    pub fn clear(&self) {
        let mut state = self.state();
        let generation = state.generation + 1;
        *state = CacheState {
            generation,
            ..CacheState::default()
        };
        debug!(generation = generation; "Image cache cleared");
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        lock(&self.state)
    }

    /// Returns the shared future for one asset, creating it on first use.
    fn asset_future(&self, state: &mut CacheState, symbol_id: &str) -> AssetFuture {
        if let Some(existing) = state.assets.get(symbol_id) {
            return existing.clone();
        }

        state.total += 1;
        let generation = state.generation;
        let shared_state = Arc::downgrade(&self.state);
        let source = Arc::clone(&self.source);
        let url = self
            .registry
            .get(symbol_id)
            .map(|definition| definition.asset_url().to_string());
        let symbol_id = symbol_id.to_string();
        let key = symbol_id.clone();

        let future = async move {
            let result = match url {
                Some(url) => match source.fetch(&url).await {
                    Ok(bytes) => SymbolImage::decode(symbol_id.as_str(), url, bytes),
                    Err(err) => Err(err),
                },
                None => Err(AssetError::UnknownSymbol(symbol_id.clone())),
            };

            let image = match result {
                Ok(image) => {
                    debug!(symbol_id = symbol_id.as_str(), mime = image.mime(); "Symbol image loaded");
                    Some(Arc::new(image))
                }
                Err(err) => {
                    warn!(symbol_id = symbol_id.as_str(), error:% = err; "Symbol image failed to load");
                    None
                }
            };

            if let Some(shared_state) = shared_state.upgrade() {
                let mut state = lock(&shared_state);
                if state.generation == generation {
                    state.settled += 1;
                }
            }

            image
        }
        .boxed()
        .shared();

        state.assets.insert(key, future.clone());
        future
    }
}

/// Folds a finished batch into the cumulative ready map.
///
/// Reuses whichever side already covers the other so callers holding a
/// batch result can still compare it by pointer.
fn merge_loaded(previous: Option<Arc<ImageMap>>, batch: &Arc<ImageMap>) -> Arc<ImageMap> {
    let Some(previous) = previous else {
        return Arc::clone(batch);
    };
    if previous.keys().all(|id| batch.contains_key(id)) {
        return Arc::clone(batch);
    }
    if batch.keys().all(|id| previous.contains_key(id)) {
        return previous;
    }

    let mut merged = (*previous).clone();
    merged.extend(batch.iter().map(|(id, image)| (id.clone(), Arc::clone(image))));
    Arc::new(merged)
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deduplicates ids, keeping first-appearance order.
fn batch_key<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut key = Vec::new();
    for id in ids {
        let id: &str = id.as_ref();
        if seen.insert(id.to_string()) {
            key.push(id.to_string());
        }
    }
    key
}


#[cfg(test)]
mod tests {
    use futures::{
        channel::oneshot,
        executor::block_on,
        future::{FutureExt, join},
    };

    use patchbay_core::registry::{SymbolCategory, SymbolDefinition};

    use super::{test_support::png, *};

    fn registry() -> Arc<SymbolRegistry> {
        Arc::new(
            SymbolRegistry::from_definitions([
                SymbolDefinition::new("vco", "VCO", SymbolCategory::Oscillator, "/vco.png"),
                SymbolDefinition::new("vcf", "VCF", SymbolCategory::Filter, "/vcf.png"),
                SymbolDefinition::new("vca", "VCA", SymbolCategory::Amplifier, "/vca.svg"),
                SymbolDefinition::new("env", "ENV", SymbolCategory::Envelope, "/missing.png"),
            ])
            .unwrap(),
        )
    }

    fn source() -> Arc<MemoryAssetSource> {
        Arc::new(
            MemoryAssetSource::new()
                .with_asset("/vco.png", png(40, 20, [255, 0, 0, 255]))
                .with_asset("/vcf.png", b"definitely not an image".to_vec())
                .with_asset(
                    "/vca.svg",
                    br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#.to_vec(),
                ),
        )
    }

    #[test]
    fn test_decode_png_and_svg() {
        let image = SymbolImage::decode("vco", "/vco.png", png(8, 4, [0, 0, 0, 255])).unwrap();
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.size(), Some(Size::new(8.0, 4.0)));
        assert!(image.data_uri().starts_with("data:image/png;base64,"));

        let svg = SymbolImage::decode("vca", "/vca.svg", b"<?xml version=\"1.0\"?><svg/>".to_vec())
            .unwrap();
        assert_eq!(svg.mime(), "image/svg+xml");
        assert!(svg.size().is_none());

        let broken = SymbolImage::decode("x", "/x.png", vec![0, 1, 2, 3]);
        assert!(matches!(broken, Err(AssetError::Decode { .. })));
    }

    #[test]
    fn test_failures_are_excluded_not_fatal() {
        let cache = ImageAssetCache::new(registry(), source());

        let images = block_on(cache.preload(["vco", "vcf", "vca", "env", "theremin"]));

        let ids: Vec<&str> = images.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["vco", "vca"]);
        assert!(images.len() <= 5);
        assert_eq!(cache.progress(), 100);
        assert!(cache.is_fully_loaded());
    }

    #[test]
    fn test_concurrent_preloads_share_result() {
        let source = source();
        let cache = ImageAssetCache::new(registry(), source.clone());

        let first = cache.preload(["vco", "vca"]);
        let second = cache.preload(["vco", "vca", "vco"]);
        let (a, b) = block_on(join(first, second));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.fetch_count("/vco.png"), 1);
        assert_eq!(source.fetch_count("/vca.svg"), 1);
    }

    #[test]
    fn test_overlapping_batches_fetch_each_asset_once() {
        let source = source();
        let cache = ImageAssetCache::new(registry(), source.clone());

        let first = block_on(cache.preload(["vco", "vcf"]));
        let second = block_on(cache.preload(["vcf", "vco", "vca"]));

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert!(Arc::ptr_eq(&first["vco"], &second["vco"]));
        assert_eq!(source.total_fetches(), 3);
    }

    #[test]
    fn test_progress_before_and_after() {
        let cache = ImageAssetCache::new(registry(), source());
        assert_eq!(cache.progress(), 100);
        assert!(!cache.is_fully_loaded());
        assert!(cache.get_cached_if_ready().is_none());

        let handle = cache.preload(["vco", "vcf", "vca"]);
        assert_eq!(cache.progress(), 0);
        assert!(cache.completed(["vco", "vcf", "vca"]).is_none());

        let images = block_on(handle);
        assert_eq!(cache.progress(), 100);
        let cached = cache.get_cached_if_ready().unwrap();
        assert!(Arc::ptr_eq(&cached, &images));
        assert!(cache.completed(["vco", "vcf", "vca"]).is_some());
    }

    #[test]
    fn test_clear_forgets_everything() {
        let source = source();
        let cache = ImageAssetCache::new(registry(), source.clone());
        block_on(cache.preload(["vco"]));

        cache.clear();
        assert!(cache.get_cached_if_ready().is_none());
        assert_eq!(cache.progress(), 100);

        block_on(cache.preload(["vco"]));
        assert_eq!(source.fetch_count("/vco.png"), 2);
    }

    #[test]
    fn test_stale_future_after_clear_does_not_report() {
        let cache = ImageAssetCache::new(registry(), source());
        let stale = cache.preload(["vco", "vca"]);

        cache.clear();
        let images = block_on(stale);

        assert_eq!(images.len(), 2);
        assert!(cache.get_cached_if_ready().is_none());
        assert_eq!(cache.progress(), 100);
    }

    #[test]
    fn test_smaller_batch_keeps_earlier_images_ready() {
        let cache = ImageAssetCache::new(registry(), source());

        block_on(cache.preload(["vco", "vca"]));
        block_on(cache.preload(["vco"]));

        let ready = cache.get_cached_if_ready().unwrap();
        let ids: Vec<&str> = ready.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["vco", "vca"]);
        assert!(cache.is_fully_loaded());
    }

    #[test]
    fn test_disjoint_batches_accumulate() {
        let cache = ImageAssetCache::new(registry(), source());

        block_on(cache.preload(["vca"]));
        block_on(cache.preload(["vco"]));

        let ready = cache.get_cached_if_ready().unwrap();
        assert_eq!(ready.len(), 2);
        assert!(ready.contains_key("vco") && ready.contains_key("vca"));
    }

    /// Source whose fetches resolve only when the test releases them.
    #[derive(Default)]
    struct GatedSource {
        pending: Mutex<HashMap<String, oneshot::Receiver<Result<Vec<u8>, AssetError>>>>,
    }

    impl GatedSource {
        fn gate(&self, url: &str) -> oneshot::Sender<Result<Vec<u8>, AssetError>> {
            let (sender, receiver) = oneshot::channel();
            self.pending.lock().unwrap().insert(url.to_string(), receiver);
            sender
        }
    }

    impl AssetSource for GatedSource {
        fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
            let receiver = self.pending.lock().unwrap().remove(url);
            let url = url.to_string();
            async move {
                match receiver {
                    Some(receiver) => receiver
                        .await
                        .unwrap_or_else(|_| Err(AssetError::NotFound(url))),
                    None => Err(AssetError::NotFound(url)),
                }
            }
            .boxed()
        }
    }

    #[test]
    fn test_progress_counts_each_settled_asset() {
        let source = Arc::new(GatedSource::default());
        let vco = source.gate("/vco.png");
        let vcf = source.gate("/vcf.png");
        let vca = source.gate("/vca.svg");
        let cache = ImageAssetCache::new(registry(), source);

        let handle = cache.preload(["vco", "vcf", "vca"]);
        assert!(handle.clone().now_or_never().is_none());
        assert_eq!(cache.progress(), 0);

        vco.send(Ok(png(4, 4, [0, 0, 0, 255]))).unwrap();
        assert!(handle.clone().now_or_never().is_none());
        assert_eq!(cache.progress(), 33);

        vcf.send(Err(AssetError::NotFound("/vcf.png".into())))
            .unwrap();
        assert!(handle.clone().now_or_never().is_none());
        assert_eq!(cache.progress(), 67);
        assert!(!cache.is_fully_loaded());

        vca.send(Ok(b"<svg/>".to_vec())).unwrap();
        let images = handle.now_or_never().unwrap();
        assert_eq!(cache.progress(), 100);
        assert_eq!(images.len(), 2);
        assert!(cache.is_fully_loaded());
    }
}
