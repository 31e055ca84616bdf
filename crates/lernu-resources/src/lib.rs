use std::path::PathBuf;
use std::sync::Arc;

use lernu_api::MediaSource;
use lernu_storage::Store;
use lernu_types::DownloadProgress;
use tokio::sync::RwLock;
use tokio::task::JoinSet;

#[derive(Clone, Copy)]
enum MediaKind {
    Audio,
    Image,
}

/// Keeps the audio/image files a unit's lessons depend on present in local
/// storage before the learner enters a lesson, and reclaims the space when
/// the learner moves on. Only one unit's media is kept at a time.
pub struct ResourceCache {
    store: Arc<Store>,
    progress: Arc<RwLock<Option<DownloadProgress>>>,
}

impl ResourceCache {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            progress: Arc::new(RwLock::new(None)),
        }
    }

    /// `None` when no download is in flight.
    pub async fn progress(&self) -> Option<DownloadProgress> {
        *self.progress.read().await
    }

    pub fn is_unit_downloaded(&self, unit_id: &str) -> bool {
        self.store.downloaded_units().contains(unit_id)
    }

    /// Make `unit_id` the single resident unit: drop every other downloaded
    /// unit's bundle, then fetch this one's missing files.
    pub async fn switch_unit<F>(
        &self,
        source: Arc<dyn MediaSource>,
        unit_id: &str,
        language: &str,
        on_progress: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(DownloadProgress),
    {
        for resident in self.store.downloaded_units() {
            if resident != unit_id {
                if let Err(e) = self
                    .delete_unit_resources(source.clone(), &resident, language)
                    .await
                {
                    tracing::warn!("failed to clean up unit {resident}: {e}");
                }
            }
        }

        if self.is_unit_downloaded(unit_id) {
            return Ok(());
        }
        self.download_unit_resources(source, unit_id, language, on_progress)
            .await
    }

    /// Fetch the unit's manifest and download every listed file not already
    /// on disk, in parallel. Individual file failures are logged and do not
    /// abort siblings; the unit is recorded as downloaded only when every
    /// file is present. The progress counter is cleared on the way out
    /// whatever the outcome.
    pub async fn download_unit_resources<F>(
        &self,
        source: Arc<dyn MediaSource>,
        unit_id: &str,
        language: &str,
        on_progress: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(DownloadProgress),
    {
        let result = self
            .download_inner(source, unit_id, language, on_progress)
            .await;
        *self.progress.write().await = None;
        result
    }

    async fn download_inner<F>(
        &self,
        source: Arc<dyn MediaSource>,
        unit_id: &str,
        language: &str,
        mut on_progress: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(DownloadProgress),
    {
        let manifest = source.unit_resources(unit_id, language).await?;

        let audio_dir = self.store.audio_dir();
        let image_dir = self.store.image_dir();
        tokio::fs::create_dir_all(&audio_dir).await?;
        tokio::fs::create_dir_all(&image_dir).await?;

        let jobs: Vec<(MediaKind, String, PathBuf)> = manifest
            .audio
            .iter()
            .map(|f| (MediaKind::Audio, f.clone(), audio_dir.join(f)))
            .chain(
                manifest
                    .images
                    .iter()
                    .map(|f| (MediaKind::Image, f.clone(), image_dir.join(f))),
            )
            .collect();

        let total = jobs.len();
        let mut completed = 0usize;
        let mut failed = 0usize;

        *self.progress.write().await = Some(DownloadProgress {
            total,
            completed: 0,
        });

        let mut tasks: JoinSet<Result<(), String>> = JoinSet::new();
        for (kind, filename, path) in jobs {
            // A file already on disk short-circuits its download but still
            // counts toward completion.
            if path.exists() {
                completed += 1;
                continue;
            }

            let source = source.clone();
            tasks.spawn(async move {
                let bytes = match kind {
                    MediaKind::Audio => source.audio(&filename).await,
                    MediaKind::Image => source.image(&filename).await,
                }
                .map_err(|e| format!("fetch {filename}: {e}"))?;

                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|e| format!("write {filename}: {e}"))
            });
        }

        let report = |completed: usize| DownloadProgress { total, completed };
        on_progress(report(completed));
        *self.progress.write().await = Some(report(completed));

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {
                    completed += 1;
                    on_progress(report(completed));
                    *self.progress.write().await = Some(report(completed));
                }
                Ok(Err(e)) => {
                    failed += 1;
                    tracing::warn!("resource download failed for unit {unit_id}: {e}");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("resource download task panicked: {e}");
                }
            }
        }

        if failed == 0 {
            if let Err(e) = self.store.set_unit_downloaded(unit_id, true) {
                tracing::warn!("failed to record downloaded unit {unit_id}: {e}");
            }
        } else {
            tracing::warn!(
                "unit {unit_id}: {failed} of {total} resources failed, unit not marked downloaded"
            );
        }

        Ok(())
    }

    /// Delete the unit's listed files (a missing file is fine) and drop the
    /// unit from the downloaded set.
    pub async fn delete_unit_resources(
        &self,
        source: Arc<dyn MediaSource>,
        unit_id: &str,
        language: &str,
    ) -> anyhow::Result<()> {
        let manifest = source.unit_resources(unit_id, language).await?;

        let audio_dir = self.store.audio_dir();
        let image_dir = self.store.image_dir();

        let paths = manifest
            .audio
            .iter()
            .map(|f| audio_dir.join(f))
            .chain(manifest.images.iter().map(|f| image_dir.join(f)));

        for path in paths {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to delete {}: {e}", path.display()),
            }
        }

        if let Err(e) = self.store.set_unit_downloaded(unit_id, false) {
            tracing::warn!("failed to drop downloaded unit {unit_id}: {e}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lernu_api::ApiError;
    use lernu_config::storage::StorageConfig;
    use lernu_types::UnitResources;

    /// In-memory backend: one manifest per unit, bytes per filename, fetch
    /// counting, optional per-file failure.
    struct FakeSource {
        manifests: HashMap<String, UnitResources>,
        failing: Vec<String>,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(manifests: HashMap<String, UnitResources>) -> Self {
            Self {
                manifests,
                failing: Vec::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|f| f == filename) {
                return Err(ApiError::Api(500));
            }
            Ok(filename.as_bytes().to_vec())
        }
    }

    #[async_trait::async_trait]
    impl MediaSource for FakeSource {
        async fn unit_resources(
            &self,
            unit_id: &str,
            _language: &str,
        ) -> Result<UnitResources, ApiError> {
            self.manifests
                .get(unit_id)
                .cloned()
                .ok_or(ApiError::Api(404))
        }

        async fn audio(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
            self.fetch(filename)
        }

        async fn image(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
            self.fetch(filename)
        }
    }

    fn unit_manifest() -> HashMap<String, UnitResources> {
        HashMap::from([(
            "u1".to_string(),
            UnitResources {
                audio: vec!["hello.mp3".into(), "bye.mp3".into()],
                images: vec!["cat.png".into()],
            },
        )])
    }

    fn cache_in(dir: &tempfile::TempDir) -> (Arc<Store>, ResourceCache) {
        let store = Arc::new(
            Store::open(&StorageConfig {
                data_dir: Some(dir.path().join("data")),
            })
            .unwrap(),
        );
        let cache = ResourceCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn download_writes_all_files_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let (store, cache) = cache_in(&dir);
        let source = Arc::new(FakeSource::new(unit_manifest()));

        let mut last = None;
        cache
            .download_unit_resources(source.clone(), "u1", "es", |p| last = Some(p))
            .await
            .unwrap();

        assert_eq!(last, Some(DownloadProgress {
            total: 3,
            completed: 3,
        }));
        assert!(store.audio_dir().join("hello.mp3").exists());
        assert!(store.audio_dir().join("bye.mp3").exists());
        assert!(store.image_dir().join("cat.png").exists());
        assert!(cache.is_unit_downloaded("u1"));
        assert_eq!(cache.progress().await, None);
    }

    #[tokio::test]
    async fn redownload_with_files_present_hits_network_zero_times() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, cache) = cache_in(&dir);
        let source = Arc::new(FakeSource::new(unit_manifest()));

        cache
            .download_unit_resources(source.clone(), "u1", "es", |_| {})
            .await
            .unwrap();
        let fetches_after_first = source.fetches.load(Ordering::SeqCst);

        let mut last = None;
        cache
            .download_unit_resources(source.clone(), "u1", "es", |p| last = Some(p))
            .await
            .unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), fetches_after_first);
        // still reports completed == total
        assert_eq!(last, Some(DownloadProgress {
            total: 3,
            completed: 3,
        }));
    }

    #[tokio::test]
    async fn file_failure_spares_siblings_and_leaves_unit_unmarked() {
        let dir = tempfile::tempdir().unwrap();
        let (store, cache) = cache_in(&dir);
        let mut source = FakeSource::new(unit_manifest());
        source.failing.push("bye.mp3".into());
        let source = Arc::new(source);

        cache
            .download_unit_resources(source, "u1", "es", |_| {})
            .await
            .unwrap();

        assert!(store.audio_dir().join("hello.mp3").exists());
        assert!(!store.audio_dir().join("bye.mp3").exists());
        assert!(!cache.is_unit_downloaded("u1"));
    }

    #[tokio::test]
    async fn delete_then_download_restores_the_file_set() {
        let dir = tempfile::tempdir().unwrap();
        let (store, cache) = cache_in(&dir);
        let source = Arc::new(FakeSource::new(unit_manifest()));

        cache
            .download_unit_resources(source.clone(), "u1", "es", |_| {})
            .await
            .unwrap();
        cache
            .delete_unit_resources(source.clone(), "u1", "es")
            .await
            .unwrap();

        assert!(!store.audio_dir().join("hello.mp3").exists());
        assert!(!cache.is_unit_downloaded("u1"));

        cache
            .download_unit_resources(source, "u1", "es", |_| {})
            .await
            .unwrap();

        assert!(store.audio_dir().join("hello.mp3").exists());
        assert!(store.audio_dir().join("bye.mp3").exists());
        assert!(store.image_dir().join("cat.png").exists());
        assert!(cache.is_unit_downloaded("u1"));
    }

    #[tokio::test]
    async fn delete_of_missing_files_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, cache) = cache_in(&dir);
        let source = Arc::new(FakeSource::new(unit_manifest()));

        cache
            .delete_unit_resources(source, "u1", "es")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn switch_unit_evicts_the_previous_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let (store, cache) = cache_in(&dir);

        let mut manifests = unit_manifest();
        manifests.insert("u2".to_string(), UnitResources {
            audio: vec!["tree.mp3".into()],
            images: vec![],
        });
        let source = Arc::new(FakeSource::new(manifests));

        cache
            .download_unit_resources(source.clone(), "u1", "es", |_| {})
            .await
            .unwrap();
        cache
            .switch_unit(source, "u2", "es", |_| {})
            .await
            .unwrap();

        assert!(!cache.is_unit_downloaded("u1"));
        assert!(cache.is_unit_downloaded("u2"));
        assert!(!store.audio_dir().join("hello.mp3").exists());
        assert!(store.audio_dir().join("tree.mp3").exists());
    }

    #[tokio::test]
    async fn switch_to_resident_unit_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, cache) = cache_in(&dir);
        let source = Arc::new(FakeSource::new(unit_manifest()));

        cache
            .download_unit_resources(source.clone(), "u1", "es", |_| {})
            .await
            .unwrap();
        let fetches = source.fetches.load(Ordering::SeqCst);

        cache
            .switch_unit(source.clone(), "u1", "es", |_| {})
            .await
            .unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), fetches);
    }
}
