//! Input validation limits for search requests and resource protection

use thiserror::Error;

/// Maximum length for item names (256 chars)
pub const MAX_ITEM_NAME_LEN: usize = 256;

/// Default node budget for a derivation graph build (10000)
pub const DEFAULT_MAX_GRAPH_NODES: usize = 10_000;

/// Hard ceiling for a derivation graph build (1000000)
pub const MAX_GRAPH_NODES: usize = 1_000_000;

/// Maximum nodes in a single materialized recipe tree (10000)
pub const MAX_TREE_NODES: usize = 10_000;

/// Maximum number of paths a multi-path request may ask for (1000)
pub const MAX_PATHS: usize = 1000;

/// Default number of concurrent search tasks (8)
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Maximum number of concurrent search tasks (256)
pub const MAX_CONCURRENCY: usize = 256;

/// Validation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Item name cannot be empty")]
    EmptyItemName,

    #[error("Item name too long: {len} chars (max {max})")]
    ItemNameTooLong { len: usize, max: usize },

    #[error("Too many paths requested: {count} (max {max})")]
    TooManyPaths { count: usize, max: usize },

    #[error("Graph node budget too large: {nodes} (max {max})")]
    GraphBudgetTooLarge { nodes: usize, max: usize },

    #[error("Concurrency must be between 1 and {max}: got {value}")]
    ConcurrencyOutOfRange { value: usize, max: usize },
}

/// Validate item name
pub fn validate_item_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyItemName);
    }
    if name.len() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::ItemNameTooLong {
            len: name.len(),
            max: MAX_ITEM_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate requested path count (0 means unbounded)
pub fn validate_max_paths(count: usize) -> Result<(), ValidationError> {
    if count > MAX_PATHS {
        return Err(ValidationError::TooManyPaths {
            count,
            max: MAX_PATHS,
        });
    }
    Ok(())
}

/// Validate graph node budget
pub fn validate_graph_budget(nodes: usize) -> Result<(), ValidationError> {
    if nodes > MAX_GRAPH_NODES {
        return Err(ValidationError::GraphBudgetTooLarge {
            nodes,
            max: MAX_GRAPH_NODES,
        });
    }
    Ok(())
}

/// Validate worker pool size
pub fn validate_concurrency(value: usize) -> Result<(), ValidationError> {
    if value == 0 || value > MAX_CONCURRENCY {
        return Err(ValidationError::ConcurrencyOutOfRange {
            value,
            max: MAX_CONCURRENCY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Brick").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_max_paths() {
        assert!(validate_max_paths(0).is_ok());
        assert!(validate_max_paths(5).is_ok());
        assert_eq!(
            validate_max_paths(5000),
            Err(ValidationError::TooManyPaths {
                count: 5000,
                max: MAX_PATHS
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            validate_item_name(" ").unwrap_err().to_string(),
            "Item name cannot be empty"
        );
        assert_eq!(
            validate_concurrency(0).unwrap_err().to_string(),
            format!("Concurrency must be between 1 and {}: got 0", MAX_CONCURRENCY)
        );
    }

    #[test]
    fn test_validate_concurrency() {
        assert!(validate_concurrency(DEFAULT_CONCURRENCY).is_ok());
        assert!(validate_concurrency(0).is_err());
        assert!(validate_concurrency(MAX_CONCURRENCY + 1).is_err());
    }
}
