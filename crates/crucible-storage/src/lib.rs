//! Crucible Storage - Persistence backends for the rule table
//!
//! This crate provides the backends the combination rules are loaded
//! from and saved to.

pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use json::JsonFileStorage;
pub use memory::MemoryStorage;
pub use traits::RuleBackend;
