use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names the wizard itself reads, independent of any template
pub mod keys {
    pub const TEMPLATE: &str = "template";
    pub const PRODUCT_NAME: &str = "productName";
    pub const PRODUCT_DESCRIPTION: &str = "productDescription";
    pub const ORIENTATION: &str = "orientation";
    pub const REFERENCE_INTENT: &str = "referenceIntent";
    pub const EXTRA_INSTRUCTIONS: &str = "extraInstructions";
}

pub const DEFAULT_ORIENTATION: &str = "portrait";
pub const NO_REFERENCE_INTENT: &str = "none";

/// Current answers of one wizard session, keyed by field name
///
/// Every value is a string; numeric answers are parsed where they are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueBag(BTreeMap<String, String>);

impl ValueBag {
    /// Bag holding the answers a fresh wizard starts with
    pub fn with_defaults() -> Self {
        let mut bag = Self::default();
        bag.set(keys::ORIENTATION, DEFAULT_ORIENTATION);
        bag.set(keys::REFERENCE_INTENT, NO_REFERENCE_INTENT);
        bag
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, or an empty string when unanswered
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// True when `name` holds a non-empty answer
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).map(|v| !v.is_empty()).unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Discards every answer and restores the defaults
    pub fn reset(&mut self) {
        *self = Self::with_defaults();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ValueBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
