//! Dated inputs every flow run starts from

use crate::context::{Context, keys};
use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Calendar values derived from a single clock reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowInputs {
    pub current_day: u32,
    pub current_month: u32,
    pub current_year: i32,
    /// `%Y-%m-%d`
    pub current_date: String,
    /// `%B %d, %Y`, e.g. `March 04, 2025`
    pub full_date: String,
    /// `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

impl FlowInputs {
    /// Inputs for the current local time
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    /// Inputs for an explicit point in time
    pub fn at<Tz: TimeZone>(moment: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            current_day: moment.day(),
            current_month: moment.month(),
            current_year: moment.year(),
            current_date: moment.format("%Y-%m-%d").to_string(),
            full_date: moment.format("%B %d, %Y").to_string(),
            timestamp: moment.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Write every field into `context` under its well-known key
    pub fn apply_to(&self, context: &mut Context) {
        context.insert(keys::CURRENT_DAY, json!(self.current_day));
        context.insert(keys::CURRENT_MONTH, json!(self.current_month));
        context.insert(keys::CURRENT_YEAR, json!(self.current_year));
        context.insert(keys::CURRENT_DATE, json!(self.current_date));
        context.insert(keys::FULL_DATE, json!(self.full_date));
        context.insert(keys::TIMESTAMP, json!(self.timestamp));
    }

    /// A fresh context holding only these inputs
    pub fn to_context(&self) -> Context {
        let mut context = Context::new();
        self.apply_to(&mut context);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_formats_from_fixed_moment() {
        let moment = Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 7).unwrap();
        let inputs = FlowInputs::at(&moment);

        assert_eq!(inputs.current_day, 4);
        assert_eq!(inputs.current_month, 3);
        assert_eq!(inputs.current_year, 2025);
        assert_eq!(inputs.current_date, "2025-03-04");
        assert_eq!(inputs.full_date, "March 04, 2025");
        assert_eq!(inputs.timestamp, "2025-03-04 09:05:07");
    }

    #[test]
    fn test_to_context_populates_keys() {
        let moment = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let ctx = FlowInputs::at(&moment).to_context();

        assert_eq!(ctx.len(), 6);
        assert_eq!(ctx.current_date(), Some("2024-12-31"));
        assert_eq!(ctx.timestamp(), Some("2024-12-31 23:59:59"));
        assert_eq!(ctx.get(keys::CURRENT_MONTH), Some(&json!(12)));
    }
}
