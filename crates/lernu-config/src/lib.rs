use std::env;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::storage::StorageConfig;

pub mod api;
pub mod storage;

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,

    /// Language code selected when no explicit choice was made yet
    pub default_language: String,
    /// Bound on event channel capacity between app and UI tasks
    pub channel_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let default_language = env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "es".to_string());

        let channel_capacity = env::var("CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);

        Config {
            api: ApiConfig::new(),
            storage: StorageConfig::new(),

            default_language,
            channel_capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
