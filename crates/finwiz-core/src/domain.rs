//! The four research domains of a FinWiz run

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A research domain, one per crew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Stock,
    Etf,
    Crypto,
    Report,
}

impl Domain {
    /// All domains in pipeline order
    pub const ALL: [Domain; 4] = [Domain::Stock, Domain::Etf, Domain::Crypto, Domain::Report];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Stock => "stock",
            Domain::Etf => "etf",
            Domain::Crypto => "crypto",
            Domain::Report => "report",
        }
    }

    /// Knowledge collection name, `finwiz-{domain}`
    pub fn collection(self) -> String {
        format!("finwiz-{}", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" | "stocks" => Ok(Domain::Stock),
            "etf" | "etfs" => Ok(Domain::Etf),
            "crypto" => Ok(Domain::Crypto),
            "report" => Ok(Domain::Report),
            other => Err(crate::Error::Configuration(format!(
                "unknown domain '{other}', expected one of stock, etf, crypto, report"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("ETF".parse::<Domain>().unwrap(), Domain::Etf);
        assert_eq!(Domain::Crypto.to_string(), "crypto");
        assert!("bonds".parse::<Domain>().is_err());
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(Domain::Stock.collection(), "finwiz-stock");
    }
}
