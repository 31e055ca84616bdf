use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the app-private data root; platform default when unset
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn new() -> Self {
        let data_dir = env::var("LERNU_DATA_DIR").ok().map(PathBuf::from);

        Self { data_dir }
    }
}
