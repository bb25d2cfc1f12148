//! Shipping Category Exclusions
//!
//! A sorted, de-duplicated set of shipping category names. Line items whose product carries one
//! of these categories are not eligible for cart discounts.

use std::{cmp::Ordering, string::ToString};

use serde::{Deserialize, Deserializer};
use smallvec::SmallVec;

/// Shipping categories excluded from promotional eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionSet {
    categories: SmallVec<[String; 2]>,
}

impl ExclusionSet {
    /// Create an exclusion set from owned category names.
    #[must_use]
    pub fn new(categories: SmallVec<[String; 2]>) -> Self {
        let mut set = Self { categories };

        set.categories.sort();
        set.categories.dedup();

        set
    }

    /// Create an exclusion set from string slices.
    pub fn from_strs(categories: &[&str]) -> Self {
        Self::new(
            categories
                .iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 2]>>(),
        )
    }

    /// An exclusion set that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return whether `category` is excluded. Matching is exact and case-sensitive.
    pub fn contains(&self, category: &str) -> bool {
        self.categories
            .binary_search_by(|probe| probe.as_str().cmp(category))
            .is_ok()
    }

    /// Return whether an item with the given (possibly unset) category is excluded.
    ///
    /// Unset categories are never excluded.
    pub fn excludes(&self, category: Option<&str>) -> bool {
        category.is_some_and(|category| self.contains(category))
    }

    /// Add a category to the set.
    pub fn add(&mut self, category: &str) {
        if let Err(pos) = self
            .categories
            .binary_search_by(|probe| probe.as_str().cmp(category))
        {
            self.categories.insert(pos, category.to_string());
        }
    }

    /// Return whether every category in `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        let mut theirs = other.categories.iter();

        self.categories.iter().all(|ours| {
            theirs
                .by_ref()
                .find(|candidate| candidate.as_str().cmp(ours.as_str()) != Ordering::Less)
                .is_some_and(|candidate| candidate == ours)
        })
    }

    /// Iterate over the excluded categories in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Number of excluded categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Return whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<'de> Deserialize<'de> for ExclusionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let categories = Vec::<String>::deserialize(deserializer)?;

        Ok(Self::new(SmallVec::from_vec(categories)))
    }
}
