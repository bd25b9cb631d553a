//! Pipeline orchestration: the single-flight worker loop and result cache.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::oneshot;

use crate::cache::{CacheKey, ResultCache};
use crate::config::Config;
use crate::error::{EnhanceError, EnhanceResult, Result};
use crate::queue::{EnhanceJob, JobQueue};
use crate::types::{EnhanceOutcome, EnhanceStats, EnhancedImage, JobState, Priority};

use super::decode::ImageDecoder;
use super::encode::{self, ImageEncoder};
use super::fetch::ImageFetcher;
use super::filter;

/// Worker loop state.
///
/// Exactly one caller drains the queue at a time; `drain` while `Draining`
/// is a no-op and the caller awaits its job's reply instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Draining,
}

/// Hook for observing per-job lifecycle transitions.
///
/// Implementations must be cheap; they run inline on the worker path.
pub trait JobObserver: Send + Sync {
    /// Called on every per-job state transition.
    fn on_transition(&self, source_url: &str, priority: Priority, state: JobState) {
        let _ = (source_url, priority, state);
    }
}

/// The enhancement pipeline: fetch, decode, filter, encode, cache.
///
/// An explicit, constructed object — embedding applications own one (usually
/// behind an `Arc`) and pass it where needed; there is no global instance.
/// Jobs are processed strictly sequentially in priority order; the cache is
/// only written by the drain loop.
pub struct Enhancer {
    config: Config,
    fetcher: ImageFetcher,
    decoder: ImageDecoder,
    encoder: ImageEncoder,
    queue: Mutex<JobQueue>,
    cache: Mutex<ResultCache>,
    state: Mutex<WorkerState>,
    stats: Mutex<EnhanceStats>,
    observer: Option<Arc<dyn JobObserver>>,
}

impl Enhancer {
    /// Create a pipeline from configuration.
    ///
    /// Fails if the HTTP client cannot be built from the `[http]` and
    /// `[limits]` sections.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = ImageFetcher::new(config.limits.clone(), &config.http)?;
        let decoder = ImageDecoder::new(config.limits.clone());
        let encoder = ImageEncoder::new(config.encode.clone());
        let cache = ResultCache::new(config.cache.capacity);
        Ok(Self {
            config,
            fetcher,
            decoder,
            encoder,
            queue: Mutex::new(JobQueue::new()),
            cache: Mutex::new(cache),
            state: Mutex::new(WorkerState::Idle),
            stats: Mutex::new(EnhanceStats::default()),
            observer: None,
        })
    }

    /// Attach a lifecycle observer.
    pub fn with_observer(mut self, observer: Arc<dyn JobObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Enhance the image at `url`, at the given queue priority.
    ///
    /// Resolution order:
    /// 1. Cache hit for (url, priority) — resolves immediately, no fetch.
    /// 2. Fetch failure — resolves `Ok(Degraded)` carrying the original URL,
    ///    so a flaky CDN never breaks the embedding UI.
    /// 3. Otherwise the job is queued and processed by priority; decode,
    ///    filter, and encode failures reject with `Err`.
    pub async fn enhance(
        &self,
        url: &str,
        priority: Priority,
    ) -> EnhanceResult<EnhanceOutcome> {
        let key = CacheKey::new(url, priority);
        if let Some(hit) = lock(&self.cache).get(&key) {
            lock(&self.stats).cache_hits += 1;
            tracing::debug!(url, %priority, "cache hit");
            return Ok(EnhanceOutcome::Enhanced(hit));
        }

        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url, "fetch failed, serving original: {e}");
                lock(&self.stats).degraded += 1;
                return Ok(EnhanceOutcome::Degraded {
                    source_url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let reply = self.submit_bytes(url, bytes, priority);
        self.drain().await;

        match reply.await {
            Ok(Ok(image)) => Ok(EnhanceOutcome::Enhanced(image)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EnhanceError::Canceled {
                url: url.to_string(),
            }),
        }
    }

    /// Enqueue pre-fetched source bytes and return the job's reply channel.
    ///
    /// Lower-level seam used by `enhance` and by embedders that already hold
    /// the bytes. The job is not processed until someone calls `drain`.
    pub fn submit_bytes(
        &self,
        url: &str,
        bytes: Vec<u8>,
        priority: Priority,
    ) -> oneshot::Receiver<EnhanceResult<Arc<EnhancedImage>>> {
        let (tx, rx) = oneshot::channel();
        self.notify(url, priority, JobState::Submitted);
        let job = EnhanceJob {
            source_url: url.to_string(),
            bytes,
            priority,
            submitted_at: Instant::now(),
            reply: tx,
        };
        lock(&self.queue).submit(job);
        self.notify(url, priority, JobState::Queued);
        tracing::debug!(url, %priority, "job queued");
        rx
    }

    /// Drain the queue until empty, processing jobs in priority order.
    ///
    /// Single-flight: if another caller is already draining, this returns
    /// immediately and that caller's loop will pick up the new job. A failed
    /// job rejects its own reply and never stalls the rest of the queue.
    pub async fn drain(&self) {
        {
            let mut state = lock(&self.state);
            if *state == WorkerState::Draining {
                return;
            }
            *state = WorkerState::Draining;
        }

        loop {
            // The empty-check and the transition back to Idle happen under
            // the state lock, so a job submitted concurrently is either seen
            // by this loop or finds the worker Idle and drains it itself.
            let job = {
                let mut state = lock(&self.state);
                let mut queue = lock(&self.queue);
                match queue.take_next() {
                    Some(job) => job,
                    None => {
                        *state = WorkerState::Idle;
                        break;
                    }
                }
            };

            let EnhanceJob {
                source_url,
                bytes,
                priority,
                submitted_at,
                reply,
            } = job;
            self.notify(&source_url, priority, JobState::Processing);
            tracing::debug!(url = %source_url, %priority, "processing job");

            match self.process(&source_url, bytes, priority, submitted_at).await {
                Ok(image) => {
                    lock(&self.cache)
                        .insert(CacheKey::new(&source_url, priority), Arc::clone(&image));
                    lock(&self.stats).completed += 1;
                    self.notify(&source_url, priority, JobState::Completed);
                    tracing::debug!(
                        url = %source_url,
                        elapsed_ms = image.elapsed_ms,
                        encoded_size = image.encoded_size,
                        "job completed"
                    );
                    let _ = reply.send(Ok(image));
                }
                Err(e) => {
                    lock(&self.stats).failed += 1;
                    self.notify(&source_url, priority, JobState::Failed);
                    tracing::warn!(url = %source_url, "job failed: {e}");
                    let _ = reply.send(Err(e));
                }
            }
        }
    }

    /// Run one job through decode, the filter stack, and encode.
    async fn process(
        &self,
        url: &str,
        bytes: Vec<u8>,
        priority: Priority,
        submitted_at: Instant,
    ) -> EnhanceResult<Arc<EnhancedImage>> {
        let decoded = self.decoder.decode(bytes, url).await?;

        // Filters and encode are CPU-bound; run them off the async threads.
        let filters = self.config.filters.clone();
        let encoder = self.encoder.clone();
        let url_owned = url.to_string();
        let (encoded, width, height) = tokio::task::spawn_blocking(move || {
            let mut raster = decoded.image.to_rgba8();
            filter::run_stack(&mut raster, &filters, &url_owned)?;
            let encoded = encoder.encode(&raster, &url_owned)?;
            Ok::<_, EnhanceError>((encoded, raster.width(), raster.height()))
        })
        .await
        .map_err(|e| EnhanceError::Filter {
            url: url.to_string(),
            stage: "stack".to_string(),
            message: format!("Task join error: {e}"),
        })??;

        Ok(Arc::new(EnhancedImage {
            source_url: url.to_string(),
            priority,
            content_hash: encode::content_hash(&encoded),
            width,
            height,
            format: "jpeg".to_string(),
            encoded_size: encoded.len() as u64,
            elapsed_ms: submitted_at.elapsed().as_millis() as u64,
            bytes: encoded,
        }))
    }

    /// Drop every cached result. Safe to call at any time; in-flight jobs
    /// are unaffected and will re-populate the cache when they complete.
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
        tracing::debug!("result cache cleared");
    }

    /// Lifetime counters for this pipeline.
    pub fn stats(&self) -> EnhanceStats {
        *lock(&self.stats)
    }

    /// Number of results currently cached.
    pub fn cache_len(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Number of jobs waiting in the queue.
    pub fn queue_len(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Current worker state.
    pub fn worker_state(&self) -> WorkerState {
        *lock(&self.state)
    }

    fn notify(&self, url: &str, priority: Priority, state: JobState) {
        if let Some(observer) = &self.observer {
            observer.on_transition(url, priority, state);
        }
    }
}

/// Lock a mutex, recovering the guard if a panicking thread poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 11) as u8, 128, 255])
        }));
        let mut out = std::io::Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn enhancer() -> Enhancer {
        Enhancer::new(Config::default()).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        transitions: Mutex<Vec<(String, JobState)>>,
    }

    impl JobObserver for Recorder {
        fn on_transition(&self, source_url: &str, _priority: Priority, state: JobState) {
            lock(&self.transitions).push((source_url.to_string(), state));
        }
    }

    impl Recorder {
        fn processing_order(&self) -> Vec<String> {
            lock(&self.transitions)
                .iter()
                .filter(|(_, state)| *state == JobState::Processing)
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    #[tokio::test]
    async fn test_submit_and_drain_completes_job() {
        let enhancer = enhancer();
        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(16, 16), Priority::Normal);
        enhancer.drain().await;

        let image = reply.await.unwrap().unwrap();
        assert_eq!(image.source_url, "mem://amp.png");
        assert_eq!(image.format, "jpeg");
        assert_eq!(&image.bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(image.encoded_size, image.bytes.len() as u64);
        assert_eq!(enhancer.cache_len(), 1);
        assert_eq!(enhancer.stats().completed, 1);
        assert_eq!(enhancer.worker_state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn test_high_priority_processed_before_earlier_low() {
        let recorder = Arc::new(Recorder::default());
        let enhancer = Enhancer::new(Config::default())
            .unwrap()
            .with_observer(recorder.clone());

        let low = enhancer.submit_bytes("mem://low.png", png_bytes(8, 8), Priority::Low);
        let high = enhancer.submit_bytes("mem://high.png", png_bytes(8, 8), Priority::High);
        enhancer.drain().await;

        assert_eq!(
            recorder.processing_order(),
            vec!["mem://high.png".to_string(), "mem://low.png".to_string()]
        );
        assert!(high.await.unwrap().is_ok());
        assert!(low.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_fifo_within_same_priority() {
        let recorder = Arc::new(Recorder::default());
        let enhancer = Enhancer::new(Config::default())
            .unwrap()
            .with_observer(recorder.clone());

        let _a = enhancer.submit_bytes("mem://a.png", png_bytes(8, 8), Priority::Normal);
        let _b = enhancer.submit_bytes("mem://b.png", png_bytes(8, 8), Priority::Normal);
        let _c = enhancer.submit_bytes("mem://c.png", png_bytes(8, 8), Priority::Normal);
        enhancer.drain().await;

        assert_eq!(
            recorder.processing_order(),
            vec![
                "mem://a.png".to_string(),
                "mem://b.png".to_string(),
                "mem://c.png".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch_and_queue() {
        let enhancer = enhancer();
        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(16, 16), Priority::High);
        enhancer.drain().await;
        let first = reply.await.unwrap().unwrap();

        // The URL is not fetchable; reaching the network would degrade, so
        // an Enhanced outcome proves the cache answered.
        let outcome = enhancer
            .enhance("mem://amp.png", Priority::High)
            .await
            .unwrap();
        let hit = outcome.image().expect("expected cache hit");
        assert_eq!(hit.content_hash, first.content_hash);
        assert_eq!(enhancer.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_cache_miss_for_different_priority() {
        let enhancer = enhancer();
        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(16, 16), Priority::High);
        enhancer.drain().await;
        reply.await.unwrap().unwrap();

        // Same URL at a different priority is a different cache key; the
        // fetch fails and the request degrades.
        let outcome = enhancer
            .enhance("mem://amp.png", Priority::Low)
            .await
            .unwrap();
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_original_url() {
        let enhancer = enhancer();
        let outcome = enhancer
            .enhance("http://relume.invalid/amp.png", Priority::High)
            .await
            .unwrap();

        match outcome {
            EnhanceOutcome::Degraded { source_url, reason } => {
                assert_eq!(source_url, "http://relume.invalid/amp.png");
                assert!(!reason.is_empty());
            }
            EnhanceOutcome::Enhanced(_) => panic!("expected degraded outcome"),
        }
        assert_eq!(enhancer.stats().degraded, 1);
        assert_eq!(enhancer.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_bad_job_does_not_stall_queue() {
        let enhancer = enhancer();
        let bad = enhancer.submit_bytes("mem://junk", b"not an image".to_vec(), Priority::High);
        let good = enhancer.submit_bytes("mem://ok.png", png_bytes(8, 8), Priority::Low);
        enhancer.drain().await;

        assert!(matches!(
            bad.await.unwrap().unwrap_err(),
            EnhanceError::Decode { .. }
        ));
        assert!(good.await.unwrap().is_ok());
        let stats = enhancer.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_clear_cache_before_drain_leaves_job_intact() {
        let enhancer = enhancer();
        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(8, 8), Priority::Normal);
        enhancer.clear_cache();
        enhancer.drain().await;

        assert!(reply.await.unwrap().is_ok());
        assert_eq!(enhancer.cache_len(), 1);
    }

    /// Observer that wipes the cache as soon as a job enters Processing,
    /// so the clear lands while that job is in flight.
    #[derive(Default)]
    struct ClearOnProcessing {
        target: Mutex<Option<Arc<Enhancer>>>,
        len_after_clear: Mutex<Option<usize>>,
    }

    impl JobObserver for ClearOnProcessing {
        fn on_transition(&self, _source_url: &str, _priority: Priority, state: JobState) {
            if state != JobState::Processing {
                return;
            }
            if let Some(enhancer) = lock(&self.target).as_ref() {
                enhancer.clear_cache();
                *lock(&self.len_after_clear) = Some(enhancer.cache_len());
            }
        }
    }

    #[tokio::test]
    async fn test_clear_cache_during_processing_job_still_resolves() {
        let observer = Arc::new(ClearOnProcessing::default());
        let enhancer = Arc::new(
            Enhancer::new(Config::default())
                .unwrap()
                .with_observer(observer.clone()),
        );
        *lock(&observer.target) = Some(Arc::clone(&enhancer));

        // Prime the cache with one entry so the mid-flight clear has
        // something to evict.
        let warm = enhancer.submit_bytes("mem://warm.png", png_bytes(8, 8), Priority::Normal);
        enhancer.drain().await;
        warm.await.unwrap().unwrap();
        assert_eq!(enhancer.cache_len(), 1);

        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(8, 8), Priority::Normal);
        enhancer.drain().await;

        // The clear fired while the job was processing, evicted the warm
        // entry, and the in-flight job still completed and re-cached.
        assert_eq!(*lock(&observer.len_after_clear), Some(0));
        assert!(reply.await.unwrap().is_ok());
        assert_eq!(enhancer.cache_len(), 1);
        let warm_again = enhancer
            .enhance("mem://warm.png", Priority::Normal)
            .await
            .unwrap();
        assert!(warm_again.is_degraded());
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let enhancer = enhancer();
        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(8, 8), Priority::Normal);
        enhancer.drain().await;
        reply.await.unwrap().unwrap();
        assert_eq!(enhancer.cache_len(), 1);

        enhancer.clear_cache();
        assert_eq!(enhancer.cache_len(), 0);

        // With the cache cleared the same request goes back to the network,
        // which fails for a mem:// URL — a cache miss, not a stale handle.
        let outcome = enhancer
            .enhance("mem://amp.png", Priority::Normal)
            .await
            .unwrap();
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_drain_on_empty_queue_returns_idle() {
        let enhancer = enhancer();
        enhancer.drain().await;
        assert_eq!(enhancer.worker_state(), WorkerState::Idle);
        assert_eq!(enhancer.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_job_reaches_terminal_states_in_order() {
        let recorder = Arc::new(Recorder::default());
        let enhancer = Enhancer::new(Config::default())
            .unwrap()
            .with_observer(recorder.clone());

        let reply = enhancer.submit_bytes("mem://amp.png", png_bytes(8, 8), Priority::Normal);
        enhancer.drain().await;
        reply.await.unwrap().unwrap();

        let states: Vec<JobState> = lock(&recorder.transitions)
            .iter()
            .map(|(_, state)| *state)
            .collect();
        assert_eq!(
            states,
            vec![
                JobState::Submitted,
                JobState::Queued,
                JobState::Processing,
                JobState::Completed
            ]
        );
    }

    #[test]
    fn test_new_rejects_unbuildable_http_client() {
        let mut config = Config::default();
        config.http.user_agent = "bad\nagent".to_string();
        assert!(Enhancer::new(config).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submit_and_drain_all_resolve() {
        let enhancer = Arc::new(Enhancer::new(Config::default()).unwrap());

        // Many tasks race submit + drain; the state lock guarantees every
        // job is either seen by the active drainer or drained by its own
        // caller, so no reply channel is left dangling.
        let mut handles = Vec::new();
        for i in 0..20u32 {
            let enhancer = Arc::clone(&enhancer);
            handles.push(tokio::spawn(async move {
                let priority = match i % 3 {
                    0 => Priority::High,
                    1 => Priority::Normal,
                    _ => Priority::Low,
                };
                let reply =
                    enhancer.submit_bytes(&format!("mem://{i}.png"), png_bytes(8, 8), priority);
                enhancer.drain().await;
                reply.await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_ok());
        }

        assert_eq!(enhancer.worker_state(), WorkerState::Idle);
        assert_eq!(enhancer.queue_len(), 0);
        assert_eq!(enhancer.stats().completed, 20);
    }
}
