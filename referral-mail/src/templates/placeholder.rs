//! `{key}` placeholder substitution
//!
//! A [`PlaceholderSet`] carries a fixed, ordered list of keys chosen up front;
//! it is never derived from scanning a template. Filling replaces every
//! `{key}` occurrence with the key's value, one key at a time in set order.
//! A key whose value is still empty keeps its `{key}` token in the output so
//! that a partially filled message stays visibly incomplete.
//!
//! Keys are matched literally with no escaping, so keys should not appear
//! inside one another's braces.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Keys offered by the referral tool out of the box
pub const REFERRAL_KEYS: [&str; 3] = ["HRname", "role", "company"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Placeholder {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Literal `{key}` form
    pub fn token(&self) -> String {
        token(&self.key)
    }

    pub fn is_filled(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Literal `{key}` form of a placeholder key
pub fn token(key: &str) -> String {
    format!("{{{}}}", key)
}

/// Ordered placeholders with unique keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PlaceholderSet {
    entries: Vec<Placeholder>,
}

impl PlaceholderSet {
    /// Build a set of empty placeholders from `keys`
    pub fn new<I, S>(keys: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(keys.into_iter().map(|key| Placeholder::new(key, "")))
    }

    /// Build a set from already-valued placeholders
    pub fn from_entries<I>(entries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = Placeholder>,
    {
        let mut set = Self::default();
        for entry in entries {
            if entry.key.is_empty() || entry.key.contains(&['{', '}'][..]) {
                return Err(ValidationError::InvalidPlaceholderKey);
            }
            if set.get(&entry.key).is_some() {
                return Err(ValidationError::DuplicatePlaceholder(entry.key));
            }
            set.entries.push(entry);
        }
        Ok(set)
    }

    /// `HRname`, `role` and `company`, all empty
    pub fn referral_defaults() -> Self {
        Self {
            entries: REFERRAL_KEYS
                .iter()
                .map(|key| Placeholder::new(*key, ""))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Set the value of a known key; the key set itself never changes
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ValidationError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| ValidationError::UnknownPlaceholder(key.to_string()))?;
        entry.value = value.into();
        Ok(())
    }

    /// Reset every value to empty, keeping the keys
    pub fn clear_values(&mut self) {
        for entry in &mut self.entries {
            entry.value.clear();
        }
    }

    pub fn fill(&self, text: &str) -> String {
        fill(text, self)
    }

    /// Keys whose token appears in `text` while their value is empty
    pub fn missing_in(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|p| !p.is_filled() && text.contains(&p.token()))
            .map(|p| p.key.clone())
            .collect()
    }
}

/// Substitute every filled placeholder of `placeholders` into `text`
pub fn fill(text: &str, placeholders: &PlaceholderSet) -> String {
    let mut result = text.to_string();

    for placeholder in placeholders.iter().filter(|p| p.is_filled()) {
        result = result.replace(&placeholder.token(), &placeholder.value);
    }

    result
}
