//! Combination rule store: item name to its alternative ingredient pairs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The fixed set of terminal items that have no recipe
pub const BASE_ITEMS: [&str; 4] = ["Air", "Earth", "Fire", "Water"];

/// Check if an item is one of the base items
pub fn is_base_item(name: &str) -> bool {
    BASE_ITEMS.contains(&name)
}

/// Two ingredients that combine into an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct IngredientPair {
    pub first: String,
    pub second: String,
}

impl IngredientPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Both ingredient names, in recipe order
    pub fn names(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

impl From<[String; 2]> for IngredientPair {
    fn from([first, second]: [String; 2]) -> Self {
        Self { first, second }
    }
}

impl From<IngredientPair> for [String; 2] {
    fn from(pair: IngredientPair) -> Self {
        [pair.first, pair.second]
    }
}

/// On-disk shape of the rule table. Pairs are loose lists so that
/// malformed entries can be skipped instead of failing the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawRules {
    #[serde(default)]
    elements: Vec<String>,
    #[serde(default)]
    recipes: BTreeMap<String, Vec<Vec<String>>>,
}

/// Read-only table of combination rules
///
/// Shared freely between search tasks once constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRules", into = "RawRules")]
pub struct RuleStore {
    elements: BTreeSet<String>,
    recipes: HashMap<String, Vec<IngredientPair>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe (builder form)
    pub fn with_recipe(
        mut self,
        item: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.add_recipe(item, first, second);
        self
    }

    /// Register an item without any recipe
    pub fn with_element(mut self, item: impl Into<String>) -> Self {
        self.elements.insert(item.into());
        self
    }

    /// Append a recipe alternative for `item`; every name involved becomes a known element
    pub fn add_recipe(
        &mut self,
        item: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) {
        let item = item.into();
        let pair = IngredientPair::new(first, second);
        self.elements.insert(item.clone());
        self.elements.insert(pair.first.clone());
        self.elements.insert(pair.second.clone());
        self.recipes.entry(item).or_default().push(pair);
    }

    /// Check if an item is a base item
    pub fn is_base(&self, item: &str) -> bool {
        is_base_item(item)
    }

    /// Recipes for an item, in preference order. Unknown items have none.
    pub fn recipes_for(&self, item: &str) -> &[IngredientPair] {
        self.recipes.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if the item is known to the store at all
    pub fn contains(&self, item: &str) -> bool {
        is_base_item(item) || self.elements.contains(item) || self.recipes.contains_key(item)
    }

    /// All known item names, sorted
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// Number of known items
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.recipes.is_empty()
    }

    /// Total number of recipe alternatives across all items
    pub fn recipe_count(&self) -> usize {
        self.recipes.values().map(Vec::len).sum()
    }
}

impl From<RawRules> for RuleStore {
    fn from(raw: RawRules) -> Self {
        let mut store = RuleStore {
            elements: raw.elements.into_iter().collect(),
            recipes: HashMap::with_capacity(raw.recipes.len()),
        };
        let mut skipped = 0usize;

        for (item, pairs) in raw.recipes {
            store.elements.insert(item.clone());
            let entry = store.recipes.entry(item.clone()).or_default();
            for pair in pairs {
                match <[String; 2]>::try_from(pair) {
                    Ok(pair) => entry.push(IngredientPair::from(pair)),
                    Err(pair) => {
                        skipped += 1;
                        tracing::warn!(
                            "Skipping malformed recipe for {}: expected 2 ingredients, got {}",
                            item,
                            pair.len()
                        );
                    }
                }
            }
        }

        if skipped > 0 {
            tracing::debug!("Rule load skipped {} malformed pairs", skipped);
        }
        store
    }
}

impl From<RuleStore> for RawRules {
    fn from(store: RuleStore) -> Self {
        let recipes = store
            .recipes
            .into_iter()
            .map(|(item, pairs)| {
                let pairs = pairs
                    .into_iter()
                    .map(|p| vec![p.first, p.second])
                    .collect();
                (item, pairs)
            })
            .collect();
        RawRules {
            elements: store.elements.into_iter().collect(),
            recipes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_items() {
        let store = RuleStore::new();
        for base in BASE_ITEMS {
            assert!(store.is_base(base));
            assert!(store.contains(base));
        }
        assert!(!store.is_base("Mud"));
    }

    #[test]
    fn test_builder_registers_elements() {
        let store = RuleStore::new()
            .with_recipe("Mud", "Water", "Earth")
            .with_recipe("Mud", "Earth", "Water");

        assert_eq!(store.recipes_for("Mud").len(), 2);
        assert_eq!(store.recipes_for("Mud")[0], IngredientPair::new("Water", "Earth"));
        assert!(store.recipes_for("Nothing").is_empty());
        assert!(store.contains("Mud"));
        assert!(!store.contains("Nothing"));
        assert_eq!(store.recipe_count(), 2);
    }

    #[test]
    fn test_deserialize_skips_malformed_pairs() {
        let json = r#"{
            "elements": ["Mud", "Steam"],
            "recipes": {
                "Mud": [["Water", "Earth"], ["Water"], ["Earth", "Water", "Fire"]],
                "Steam": [["Water", "Fire"]]
            }
        }"#;
        let store: RuleStore = serde_json::from_str(json).unwrap();

        assert_eq!(store.recipes_for("Mud"), &[IngredientPair::new("Water", "Earth")]);
        assert_eq!(store.recipes_for("Steam").len(), 1);
        assert_eq!(store.recipe_count(), 2);
    }

    #[test]
    fn test_serialize_roundtrip_keeps_recipes() {
        let store = RuleStore::new()
            .with_recipe("Brick", "Mud", "Fire")
            .with_recipe("Mud", "Water", "Earth");
        let json = serde_json::to_string(&store).unwrap();
        let back: RuleStore = serde_json::from_str(&json).unwrap();
        assert_eq!(store, back);
    }
}
