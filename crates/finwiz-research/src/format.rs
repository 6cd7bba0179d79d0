//! Number formatting for markdown tool output

/// Round to whole units and group thousands with commas, e.g. `1,234,567`
pub fn grouped(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// `$1.23B`
pub fn billions(value: f64) -> String {
    format!("${:.2}B", value / 1e9)
}

/// `$4.56M`
pub fn millions(value: f64) -> String {
    format!("${:.2}M", value / 1e6)
}

/// Read a number from JSON that may be encoded as a string
pub fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grouped() {
        assert_eq!(grouped(0.0), "0");
        assert_eq!(grouped(999.4), "999");
        assert_eq!(grouped(1_234_567.8), "1,234,568");
        assert_eq!(grouped(-12_345.0), "-12,345");
        assert_eq!(grouped(f64::NAN), "N/A");
    }

    #[test]
    fn test_scaled() {
        assert_eq!(billions(1_250_000_000.0), "$1.25B");
        assert_eq!(millions(3_400_000.0), "$3.40M");
    }

    #[test]
    fn test_number_from_string_or_number() {
        assert_eq!(number(&json!("0.0743")), Some(0.0743));
        assert_eq!(number(&json!(12)), Some(12.0));
        assert_eq!(number(&json!("None")), None);
    }
}
