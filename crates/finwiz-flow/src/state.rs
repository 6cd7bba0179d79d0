//! Results carried between stages

use finwiz_core::Context;
use finwiz_core::context::keys;
use serde::{Deserialize, Serialize};

/// Raw output of every FinWiz stage, empty until the stage has run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub stock_result: String,
    pub etf_result: String,
    pub crypto_result: String,
    pub report_result: String,
}

impl FlowState {
    fn slot(&mut self, key: &str) -> Option<&mut String> {
        match key {
            keys::STOCK_RESULT => Some(&mut self.stock_result),
            keys::ETF_RESULT => Some(&mut self.etf_result),
            keys::CRYPTO_RESULT => Some(&mut self.crypto_result),
            keys::REPORT_RESULT => Some(&mut self.report_result),
            _ => None,
        }
    }

    /// Value stored under a result key
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            keys::STOCK_RESULT => &self.stock_result,
            keys::ETF_RESULT => &self.etf_result,
            keys::CRYPTO_RESULT => &self.crypto_result,
            keys::REPORT_RESULT => &self.report_result,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Store a stage result; returns false for an unknown key
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.slot(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Copy the listed results into `context`
    pub fn apply_to(&self, context: &mut Context, keys: &[&str]) {
        for key in keys {
            if let Some(value) = self.get(key) {
                context.insert(*key, serde_json::Value::String(value.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_apply() {
        let mut state = FlowState::default();
        assert!(state.set(keys::ETF_RESULT, "VWRL"));
        assert!(!state.set("bond_result", "nope"));
        assert_eq!(state.get(keys::ETF_RESULT), Some("VWRL"));
        assert_eq!(state.get(keys::STOCK_RESULT), Some(""));

        let mut ctx = Context::new();
        state.apply_to(&mut ctx, &[keys::ETF_RESULT, keys::STOCK_RESULT]);
        assert_eq!(ctx.get_str(keys::ETF_RESULT), Some("VWRL"));
        assert_eq!(ctx.get_str(keys::STOCK_RESULT), Some(""));
        assert!(!ctx.contains_key(keys::CRYPTO_RESULT));
    }
}
