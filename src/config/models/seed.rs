//! Permission template seeding configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// Directory holding one JSON file per module
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Re-seed even when the store is already marked as seeded
    #[serde(default)]
    pub force: bool,
}

