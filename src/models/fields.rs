//! Coercion of raw form text into typed column values.
//!
//! Every function trims its input. Blank optional values become `None`, which
//! is what lets several devices leave a unique column empty at the same time.

use chrono::NaiveDate;

use super::network::{MAX_PREFIX, parse_ipv4};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trimmed text, `None` when blank.
#[must_use]
pub fn optional_text(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn required_text(raw: &str) -> Result<String, String> {
    optional_text(raw).ok_or_else(|| "This field is required".to_string())
}

/// Parses an optional whole number such as an inventory tag.
pub fn optional_int(raw: &str) -> Result<Option<i32>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| format!("'{value}' is not a whole number"))
}

pub fn required_int(raw: &str) -> Result<i32, String> {
    optional_int(raw)?.ok_or_else(|| "This field is required".to_string())
}

pub fn optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("'{value}' is not a date (YYYY-MM-DD)"))
}

pub fn required_date(raw: &str) -> Result<NaiveDate, String> {
    optional_date(raw)?.ok_or_else(|| "This field is required".to_string())
}

/// Parses an optional IPv4 address and returns it in canonical dotted form.
pub fn optional_ipv4(raw: &str) -> Result<Option<String>, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_ipv4(value)
        .map(|ip| Some(ip.to_string()))
        .ok_or_else(|| format!("'{value}' is not an IPv4 address"))
}

pub fn required_ipv4(raw: &str) -> Result<String, String> {
    optional_ipv4(raw)?.ok_or_else(|| "This field is required".to_string())
}

/// Parses a prefix length in `0..=32`.
pub fn prefix_length(raw: &str) -> Result<i32, String> {
    let bits = required_int(raw)?;
    if (0..=MAX_PREFIX).contains(&bits) {
        Ok(bits)
    } else {
        Err(format!("Subnet must be between 0 and {MAX_PREFIX}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_optional_values_are_none() {
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_int(""), Ok(None));
        assert_eq!(optional_date(" "), Ok(None));
        assert_eq!(optional_ipv4(""), Ok(None));
    }

    #[test]
    fn test_optional_int() {
        assert_eq!(optional_int(" 4021 "), Ok(Some(4021)));
        assert!(optional_int("12a").is_err());
        assert!(optional_int("1.5").is_err());
        assert!(optional_int("99999999999").is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Vignola "), Ok("Vignola".to_string()));
        assert!(required_text("").is_err());
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            required_date("2024-03-01"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert!(required_date("01/03/2024").is_err());
        assert!(required_date("2024-02-30").is_err());
        assert!(required_date("").is_err());
    }

    #[test]
    fn test_ipv4_is_canonicalised() {
        assert_eq!(
            optional_ipv4(" 10.0.0.7 "),
            Ok(Some("10.0.0.7".to_string()))
        );
        assert!(required_ipv4("printer.local").is_err());
    }

    #[test]
    fn test_prefix_length() {
        assert_eq!(prefix_length("24"), Ok(24));
        assert_eq!(prefix_length("0"), Ok(0));
        assert!(prefix_length("33").is_err());
        assert!(prefix_length("-1").is_err());
        assert!(prefix_length("").is_err());
    }
}
