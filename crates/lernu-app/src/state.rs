use std::sync::Arc;

use lernu_config::Config;
use lernu_player::LessonPlayer;
use lernu_storage::Store;
use lernu_types::{Learner, LessonProgress, Unit};
use tokio::sync::RwLock;

/// Per-screen-session data: rebuilt from fresh fetches on every catalog
/// refresh, never persisted.
#[derive(Default)]
pub struct Session {
    pub language: String,
    pub learner: Option<Learner>,
    pub units: Vec<Unit>,
    pub progress: Vec<LessonProgress>,
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub store: Arc<Store>,
    pub session: RwLock<Session>,
    /// Active lesson, `None` while no lesson is being played (the "loading"
    /// phase of the player lives here as an empty slot).
    pub player: RwLock<Option<LessonPlayer>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        let language = config.default_language.clone();

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            session: RwLock::new(Session {
                language,
                ..Session::default()
            }),
            player: RwLock::new(None),
        }
    }
}
