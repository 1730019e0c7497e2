//! Category pools of [`ProblemEntry`] values.

mod bank;
mod generators;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{ProblemEntry, ProblemError};
use crate::random::RandomSource;

pub use bank::vocabulary;
pub use generators::{GENERATED_POOL_SIZE, generated};

/// Reserved key for the union of every registered pool.
pub const RANDOM_CATEGORY: &str = "random";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("category key cannot be empty")]
    EmptyKey,

    #[error("category key \"{0}\" is reserved")]
    ReservedKey(String),

    #[error("category already registered: {0}")]
    DuplicateCategory(String),

    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// Supplies the problem pool for a category.
pub trait QuestionSource {
    /// Pool for `category`, in source order. [`RANDOM_CATEGORY`] yields the
    /// union of all pools.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCategory` for an unregistered key.
    fn pool(&self, category: &str) -> Result<Vec<&ProblemEntry>, CatalogError>;

    /// Registered category keys, excluding [`RANDOM_CATEGORY`].
    fn categories(&self) -> Vec<&str>;
}

/// In-memory mapping from category key to an ordered list of entries.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    pools: BTreeMap<String, Vec<ProblemEntry>>,
}

impl CategoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled vocabulary bank plus one freshly generated pool per
    /// generator family.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if a bundled entry fails validation.
    pub fn builtin<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (key, entries) in vocabulary()? {
            catalog.insert(key, entries)?;
        }
        for (key, entries) in generated(rng, GENERATED_POOL_SIZE)? {
            catalog.insert(key, entries)?;
        }
        tracing::debug!(categories = catalog.pools.len(), "built-in catalog ready");
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the key is blank, reserved or already taken.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entries: Vec<ProblemEntry>,
    ) -> Result<(), CatalogError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        if key == RANDOM_CATEGORY {
            return Err(CatalogError::ReservedKey(key));
        }
        if self.pools.contains_key(&key) {
            return Err(CatalogError::DuplicateCategory(key));
        }
        self.pools.insert(key, entries);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        category == RANDOM_CATEGORY || self.pools.contains_key(category)
    }
}

impl QuestionSource for CategoryCatalog {
    fn pool(&self, category: &str) -> Result<Vec<&ProblemEntry>, CatalogError> {
        if category == RANDOM_CATEGORY {
            return Ok(self.pools.values().flatten().collect());
        }
        self.pools
            .get(category)
            .map(|entries| entries.iter().collect())
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_owned()))
    }

    fn categories(&self) -> Vec<&str> {
        self.pools.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Value, ValueKind};
    use crate::random::StdRandom;

    fn entry(category: &str, n: i64) -> ProblemEntry {
        ProblemEntry::new(category, format!("{n} + 0"), Value::Integer(n), ValueKind::Integer)
            .unwrap()
    }

    #[test]
    fn random_is_the_union_in_key_order() {
        let mut catalog = CategoryCatalog::new();
        catalog.insert("b", vec![entry("b", 3)]).unwrap();
        catalog.insert("a", vec![entry("a", 1), entry("a", 2)]).unwrap();

        let all = catalog.pool(RANDOM_CATEGORY).unwrap();
        let values: Vec<&Value> = all.iter().map(|e| e.value()).collect();
        assert_eq!(values, [&Value::Integer(1), &Value::Integer(2), &Value::Integer(3)]);
        assert_eq!(catalog.categories(), ["a", "b"]);
        assert!(catalog.contains(RANDOM_CATEGORY));
    }

    #[test]
    fn unknown_and_reserved_keys_are_rejected() {
        let mut catalog = CategoryCatalog::new();
        assert!(matches!(
            catalog.pool("planets"),
            Err(CatalogError::UnknownCategory(_))
        ));
        assert!(matches!(
            catalog.insert(RANDOM_CATEGORY, vec![]),
            Err(CatalogError::ReservedKey(_))
        ));
        assert!(matches!(catalog.insert(" ", vec![]), Err(CatalogError::EmptyKey)));
        catalog.insert("a", vec![]).unwrap();
        assert!(matches!(
            catalog.insert("a", vec![]),
            Err(CatalogError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn builtin_catalog_has_every_family() {
        let catalog = CategoryCatalog::builtin(&mut StdRandom::seeded(11)).unwrap();
        for key in ["animals", "food", "colors", "arithmetic", "division", "binary", "hex", "logic"] {
            let pool = catalog.pool(key).unwrap();
            assert!(!pool.is_empty(), "{key} is empty");
            assert!(pool.iter().all(|e| e.category() == key));
        }
    }
}
