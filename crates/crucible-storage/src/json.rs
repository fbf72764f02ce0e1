//! JSON file storage backend

use crate::error::{StorageError, StorageResult};
use crate::traits::RuleBackend;
use async_trait::async_trait;
use crucible_core::RuleStore;
use std::path::{Path, PathBuf};

/// Rule table stored as a single pretty-printed JSON file
///
/// Saves go to a sibling temp file first and are renamed into place, so a
/// reader never observes a half-written table.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "rules.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RuleBackend for JsonFileStorage {
    async fn initialize(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::info!("Creating empty rule table at {}", self.path.display());
            self.save_rules(&RuleStore::new()).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn load_rules(&self) -> StorageResult<RuleStore> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let rules: RuleStore = serde_json::from_slice(&data)?;
        tracing::info!(
            "Loaded {} elements and {} recipes from {}",
            rules.len(),
            rules.recipe_count(),
            self.path.display()
        );
        Ok(rules)
    }

    async fn save_rules(&self, rules: &RuleStore) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(rules)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &data).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(
            "Saved {} recipes to {}",
            rules.recipe_count(),
            self.path.display()
        );
        Ok(())
    }
}
