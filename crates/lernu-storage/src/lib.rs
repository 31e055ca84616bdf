use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lernu_config::storage::StorageConfig;
use lernu_types::DailyLessonCount;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

const AUTH_KEY: &str = "auth";
const DAILY_COUNT_KEY: &str = "daily_lesson_count";
const DOWNLOADED_UNITS_KEY: &str = "downloaded_units";
const SOUND_ENABLED_KEY: &str = "sound_enabled";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no stored auth session")]
    NoSession,

    #[error("no data directory available on this platform")]
    NoDataDir,
}

/// Local identity persisted after sign-in; only the uid is needed by the core.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthSession {
    pub uid: String,
}

/// Durable key-value state under the app-private data root. Each key is one
/// JSON file; reads fall back to defaults on failure so a corrupt entry never
/// takes the app down.
pub struct Store {
    root: PathBuf,
    // Serializes daily-count read-modify-write so rapid double entry cannot
    // lose an increment.
    daily_lock: Mutex<()>,
}

impl Store {
    pub fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let root = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or(StoreError::NoDataDir)?
                .join("lernu"),
        };
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            daily_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloaded media lives under `audio/` and `image/` next to the
    /// key-value entries, keyed by server-provided filename.
    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join("image")
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::write(self.key_path(key), serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    pub fn auth_session(&self) -> Result<AuthSession, StoreError> {
        self.read_json(AUTH_KEY)?.ok_or(StoreError::NoSession)
    }

    pub fn save_auth_session(&self, session: &AuthSession) -> Result<(), StoreError> {
        self.write_json(AUTH_KEY, session)
    }

    pub fn clear_auth_session(&self) -> Result<(), StoreError> {
        let path = self.key_path(AUTH_KEY);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Stored quota counter; a missing or unreadable entry reads as the
    /// default (count 0, empty date), which unlocks rather than locks.
    pub fn daily_count(&self) -> DailyLessonCount {
        match self.read_json(DAILY_COUNT_KEY) {
            Ok(Some(count)) => count,
            Ok(None) => DailyLessonCount::default(),
            Err(e) => {
                tracing::warn!("failed to read daily lesson count, using default: {e}");
                DailyLessonCount::default()
            }
        }
    }

    /// Reset-or-increment for `today`, read and persisted under one lock.
    pub async fn increment_daily_count(
        &self,
        today: &str,
    ) -> Result<DailyLessonCount, StoreError> {
        let _guard = self.daily_lock.lock().await;

        let stored = self.daily_count();
        let next = if stored.date == today {
            DailyLessonCount {
                count: stored.count + 1,
                date: stored.date,
            }
        } else {
            DailyLessonCount {
                count: 1,
                date: today.to_string(),
            }
        };
        self.write_json(DAILY_COUNT_KEY, &next)?;
        Ok(next)
    }

    pub fn downloaded_units(&self) -> HashSet<String> {
        match self.read_json(DOWNLOADED_UNITS_KEY) {
            Ok(Some(units)) => units,
            Ok(None) => HashSet::new(),
            Err(e) => {
                tracing::warn!("failed to read downloaded unit set, using empty: {e}");
                HashSet::new()
            }
        }
    }

    pub fn set_unit_downloaded(&self, unit_id: &str, downloaded: bool) -> Result<(), StoreError> {
        let mut units = self.downloaded_units();
        let changed = if downloaded {
            units.insert(unit_id.to_string())
        } else {
            units.remove(unit_id)
        };
        if changed {
            self.write_json(DOWNLOADED_UNITS_KEY, &units)?;
        }
        Ok(())
    }

    pub fn sound_enabled(&self) -> bool {
        match self.read_json(SOUND_ENABLED_KEY) {
            Ok(Some(enabled)) => enabled,
            Ok(None) => true,
            Err(e) => {
                tracing::warn!("failed to read sound flag, defaulting to on: {e}");
                true
            }
        }
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.write_json(SOUND_ENABLED_KEY, &enabled)
    }
}
