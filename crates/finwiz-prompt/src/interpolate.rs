//! `{name}` placeholder interpolation for crew definitions

use crate::{PromptError, Result};
use std::collections::BTreeMap;

/// Replace every `{name}` placeholder whose name is in `vars`.
///
/// Placeholders with no matching variable are left exactly as written, so
/// literal braces in prompts (JSON examples and the like) survive.
///
/// ```
/// use finwiz_prompt::interpolate;
/// use std::collections::BTreeMap;
///
/// let mut vars = BTreeMap::new();
/// vars.insert("current_date".to_string(), "2025-06-01".to_string());
///
/// let text = interpolate("Report for {current_date} ({unknown})", &vars)?;
/// assert_eq!(text, "Report for 2025-06-01 ({unknown})");
/// # Ok::<(), finwiz_prompt::PromptError>(())
/// ```
pub fn interpolate(text: &str, vars: &BTreeMap<String, String>) -> Result<String> {
    if vars.is_empty() || !text.contains('{') {
        return Ok(text.to_string());
    }

    let re = regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| PromptError::InvalidPattern(e.to_string()))?;

    let rendered = re.replace_all(text, |caps: &regex::Captures<'_>| {
        vars.get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(rendered.into_owned())
}

/// Placeholder names that appear in `text`, in order of first appearance
pub fn placeholders(text: &str) -> Result<Vec<String>> {
    let re = regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| PromptError::InvalidPattern(e.to_string()))?;

    let mut names: Vec<String> = Vec::new();
    for cap in re.captures_iter(text) {
        let name = cap[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_replaces_known_placeholders() {
        let v = vars(&[("current_year", "2025"), ("current_month", "6")]);
        let out = interpolate("Outlook {current_month}/{current_year}", &v).unwrap();
        assert_eq!(out, "Outlook 6/2025");
    }

    #[test]
    fn test_unknown_placeholders_untouched() {
        let v = vars(&[("full_date", "June 01, 2025")]);
        let out = interpolate("{full_date}: {stock_result}", &v).unwrap();
        assert_eq!(out, "June 01, 2025: {stock_result}");
    }

    #[test]
    fn test_json_braces_survive() {
        let v = vars(&[("ticker", "NVDA")]);
        let text = r#"Return {"ticker": "{ticker}", "price": 0}"#;
        let out = interpolate(text, &v).unwrap();
        assert_eq!(out, r#"Return {"ticker": "NVDA", "price": 0}"#);
    }

    #[test]
    fn test_repeated_placeholder() {
        let v = vars(&[("x", "1")]);
        assert_eq!(interpolate("{x}+{x}", &v).unwrap(), "1+1");
    }

    #[test]
    fn test_placeholders_in_order() {
        let names = placeholders("{b} and {a} then {b} and { spaced }").unwrap();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }
}
