//! Execution context for agents
//!
//! The `Context` struct is the key-value store that carries flow inputs and
//! earlier stage results into crews, and from crews into task prompts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Well-known context keys
pub mod keys {
    /// Day of month (1-31)
    pub const CURRENT_DAY: &str = "current_day";
    /// Month number (1-12)
    pub const CURRENT_MONTH: &str = "current_month";
    /// Four digit year
    pub const CURRENT_YEAR: &str = "current_year";
    /// `%Y-%m-%d`
    pub const CURRENT_DATE: &str = "current_date";
    /// `%B %d, %Y`
    pub const FULL_DATE: &str = "full_date";
    /// `%Y-%m-%d %H:%M:%S`
    pub const TIMESTAMP: &str = "timestamp";

    /// Raw output of the stock crew
    pub const STOCK_RESULT: &str = "stock_result";
    /// Raw output of the ETF crew
    pub const ETF_RESULT: &str = "etf_result";
    /// Raw output of the crypto crew
    pub const CRYPTO_RESULT: &str = "crypto_result";
    /// Raw output of the report crew
    pub const REPORT_RESULT: &str = "report_result";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use finwiz_core::Context;
///
/// let ctx = Context::new()
///     .with("current_date", serde_json::json!("2025-06-01"))
///     .with("stock_result", serde_json::json!("AAPL: buy"));
///
/// assert_eq!(ctx.current_date(), Some("2025-06-01"));
/// assert_eq!(ctx.get_str("stock_result"), Some("AAPL: buy"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`]
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert(key, value);
        self
    }

    // =========== Common Accessors ===========

    /// Get the `%Y-%m-%d` date of the run
    pub fn current_date(&self) -> Option<&str> {
        self.get_str(keys::CURRENT_DATE)
    }

    /// Get the timestamp of the run
    pub fn timestamp(&self) -> Option<&str> {
        self.get_str(keys::TIMESTAMP)
    }

    /// Get a string value, `None` when missing or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Merge another context into this one (other values override)
    pub fn merge(&mut self, other: Context) {
        self.data.extend(other.data);
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.data.iter()
    }

    /// Render every scalar entry as text, keyed and sorted by name.
    ///
    /// Strings are taken verbatim, numbers and booleans via `to_string`.
    /// Arrays and objects are rendered as compact JSON; nulls are skipped.
    pub fn text_vars(&self) -> BTreeMap<String, String> {
        self.data
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect()
    }
}
