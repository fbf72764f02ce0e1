//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use crucible_core::{IngredientPair, RuleStore};

/// Trait for rule store persistence backends
#[async_trait]
pub trait RuleBackend: Send + Sync {
    /// Initialize the storage (create directories, seed an empty table, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    /// Load the complete rule table
    async fn load_rules(&self) -> StorageResult<RuleStore>;

    /// Replace the stored rule table
    async fn save_rules(&self, rules: &RuleStore) -> StorageResult<()>;

    /// Recipes for a single item; unknown items have none
    async fn get_recipes(&self, item: &str) -> StorageResult<Vec<IngredientPair>> {
        let rules = self.load_rules().await?;
        Ok(rules.recipes_for(item).to_vec())
    }
}
