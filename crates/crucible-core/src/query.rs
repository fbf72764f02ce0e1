//! Request types for recipe searches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::limits::{validate_item_name, validate_max_paths, ValidationError};

/// Search algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// Breadth-first, first path found
    #[default]
    #[serde(rename = "BFS", alias = "bfs")]
    Bfs,
    /// Depth-first, fewest recipes
    #[serde(rename = "DFS", alias = "dfs")]
    Dfs,
    /// Meet in the middle between target and base items
    #[serde(alias = "bidirectional")]
    Bidirectional,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "BFS",
            Self::Dfs => "DFS",
            Self::Bidirectional => "Bidirectional",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            "bidirectional" | "bidi" => Ok(Self::Bidirectional),
            other => Err(format!(
                "unknown algorithm '{}' (expected BFS, DFS or Bidirectional)",
                other
            )),
        }
    }
}

/// Number of results wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// One path
    #[default]
    Single,
    /// Up to `maxRecipes` distinct paths
    Multiple,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Multiple => f.write_str("multiple"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" | "multi" => Ok(Self::Multiple),
            other => Err(format!(
                "unknown search mode '{}' (expected single or multiple)",
                other
            )),
        }
    }
}

/// Search request, as accepted over HTTP and built by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Item to build
    pub target: String,

    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(default, rename = "searchMode")]
    pub mode: SearchMode,

    /// Maximum paths in multiple mode; absent or non-positive means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_recipes: Option<i64>,
}

impl SearchRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            algorithm: Algorithm::default(),
            mode: SearchMode::default(),
            max_recipes: None,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ask for up to `max` distinct paths
    pub fn multiple(mut self, max: i64) -> Self {
        self.mode = SearchMode::Multiple;
        self.max_recipes = Some(max);
        self
    }

    /// Requested path count, 0 meaning unbounded
    pub fn max_paths(&self) -> usize {
        match self.max_recipes {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => 0,
        }
    }

    /// Mode the request actually runs in
    ///
    /// BFS and DFS asked for exactly one path run the single search.
    pub fn effective_mode(&self) -> SearchMode {
        match (self.mode, self.algorithm) {
            (SearchMode::Multiple, Algorithm::Bfs | Algorithm::Dfs) if self.max_paths() == 1 => {
                SearchMode::Single
            }
            (mode, _) => mode,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_item_name(&self.target)?;
        validate_max_paths(self.max_paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"target":"Brick","algorithm":"DFS","searchMode":"multiple","maxRecipes":3}"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.target, "Brick");
        assert_eq!(request.algorithm, Algorithm::Dfs);
        assert_eq!(request.mode, SearchMode::Multiple);
        assert_eq!(request.max_paths(), 3);

        let minimal: SearchRequest = serde_json::from_str(r#"{"target":"Mud"}"#).unwrap();
        assert_eq!(minimal.algorithm, Algorithm::Bfs);
        assert_eq!(minimal.mode, SearchMode::Single);
        assert_eq!(minimal.max_paths(), 0);
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("bfs".parse::<Algorithm>(), Ok(Algorithm::Bfs));
        assert_eq!("Bidirectional".parse::<Algorithm>(), Ok(Algorithm::Bidirectional));
        assert!("astar".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Dfs.to_string(), "DFS");

        let alg: Algorithm = serde_json::from_str(r#""bidirectional""#).unwrap();
        assert_eq!(alg, Algorithm::Bidirectional);
    }

    #[test]
    fn test_effective_mode() {
        let bfs_one = SearchRequest::new("Brick").multiple(1);
        assert_eq!(bfs_one.effective_mode(), SearchMode::Single);

        let bidi_one = SearchRequest::new("Brick")
            .with_algorithm(Algorithm::Bidirectional)
            .multiple(1);
        assert_eq!(bidi_one.effective_mode(), SearchMode::Multiple);

        let unbounded = SearchRequest::new("Brick").multiple(-4);
        assert_eq!(unbounded.max_paths(), 0);
        assert_eq!(unbounded.effective_mode(), SearchMode::Multiple);
    }

    #[test]
    fn test_validate() {
        assert!(SearchRequest::new("Brick").validate().is_ok());
        assert_eq!(
            SearchRequest::new("  ").validate(),
            Err(ValidationError::EmptyItemName)
        );
        assert!(SearchRequest::new("Brick").multiple(5000).validate().is_err());
    }
}
