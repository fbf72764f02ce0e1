//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::RuleBackend;
use async_trait::async_trait;
use crucible_core::{IngredientPair, RuleStore};
use std::sync::RwLock;

/// In-memory storage backend
///
/// Useful for testing and for embedding a rule table built in code.
pub struct MemoryStorage {
    rules: RwLock<RuleStore>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_rules(RuleStore::new())
    }

    pub fn with_rules(rules: RuleStore) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.rules.read().is_ok())
    }

    async fn load_rules(&self) -> StorageResult<RuleStore> {
        let rules = self
            .rules
            .read()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))?;
        Ok(rules.clone())
    }

    async fn save_rules(&self, rules: &RuleStore) -> StorageResult<()> {
        let mut stored = self
            .rules
            .write()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))?;
        *stored = rules.clone();
        Ok(())
    }

    async fn get_recipes(&self, item: &str) -> StorageResult<Vec<IngredientPair>> {
        let rules = self
            .rules
            .read()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))?;
        Ok(rules.recipes_for(item).to_vec())
    }
}
