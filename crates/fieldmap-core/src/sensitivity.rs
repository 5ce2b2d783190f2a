//! Sensitive field classification and value masking
//!
//! A field is sensitive when its name contains one of [`SENSITIVE_KEYWORDS`]
//! as a whole word, compared case-insensitively. `compass` is not sensitive,
//! `contact email` and `pin` are. Masked renderings keep at most the first
//! and last character of the value.

use crate::value::render;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Keywords that mark a field name as sensitive
pub const SENSITIVE_KEYWORDS: [&str; 22] = [
    "ssn", "social", "password", "pass", "pin", "cvv", "card", "credit", "phone", "mobile",
    "telephone", "email", "mail", "dob", "birth", "address", "street", "zip", "postcode",
    "account", "iban", "swift",
];

/// Rendering used for null or empty sensitive values
pub const NULL_MASK: &str = "[NULL]";

static SENSITIVE_PATTERN: OnceLock<Regex> = OnceLock::new();
static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn sensitive_pattern() -> &'static Regex {
    SENSITIVE_PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(?:{})\b", SENSITIVE_KEYWORDS.join("|")))
            .expect("sensitive keyword pattern is valid")
    })
}

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:email|mail)\b").expect("email keyword pattern is valid")
    })
}

/// Classification of a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    /// Value may be reported as-is
    Public,
    /// Value must be masked
    Sensitive,
    /// Value must be masked, keeping the domain of email addresses
    Email,
}

impl Sensitivity {
    /// Classify a field name
    pub fn classify(field_name: &str) -> Self {
        if !sensitive_pattern().is_match(field_name) {
            Self::Public
        } else if email_pattern().is_match(field_name) {
            Self::Email
        } else {
            Self::Sensitive
        }
    }

    pub fn is_sensitive(self) -> bool {
        self != Self::Public
    }

    /// Masked rendering of an optional value for a field of this class
    pub fn mask(self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => NULL_MASK.to_string(),
            Some(value) => mask_value(&render(value), self == Self::Email),
        }
    }
}

/// Whether a field name is sensitive
pub fn is_sensitive(field_name: &str) -> bool {
    Sensitivity::classify(field_name).is_sensitive()
}

/// Mask a rendered value
pub fn mask_value(value: &str, is_email: bool) -> String {
    if value.is_empty() {
        return NULL_MASK.to_string();
    }
    if is_email {
        if let Some((local, domain)) = value.split_once('@') {
            return mask_email(local, domain);
        }
    }
    mask_chars(value)
}

fn mask_email(local: &str, domain: &str) -> String {
    if local.chars().count() <= 2 {
        return format!("***@{}", domain);
    }
    format!("{}@{}", mask_chars(local), domain)
}

fn mask_chars(value: &str) -> String {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if value.chars().count() > 2 => format!("{}***{}", first, last),
        _ => "**".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whole_word_keywords() {
        assert!(is_sensitive("ssn"));
        assert!(is_sensitive("SSN"));
        assert!(is_sensitive("email"));
        assert!(is_sensitive("home address"));
        assert!(is_sensitive("card-number"));
        assert!(is_sensitive("Pin"));
    }

    #[test]
    fn test_keywords_inside_identifiers_do_not_match() {
        assert!(!is_sensitive("compass"));
        assert!(!is_sensitive("passenger"));
        assert!(!is_sensitive("fullName"));
        assert!(!is_sensitive("code"));
        // underscores are word characters
        assert!(!is_sensitive("user_email"));
    }

    #[test]
    fn test_email_classification() {
        assert_eq!(Sensitivity::classify("email"), Sensitivity::Email);
        assert_eq!(Sensitivity::classify("Mail"), Sensitivity::Email);
        assert_eq!(Sensitivity::classify("phone"), Sensitivity::Sensitive);
        assert_eq!(Sensitivity::classify("name"), Sensitivity::Public);
    }

    #[test]
    fn test_generic_masking() {
        assert_eq!(mask_value("123-45-6789", false), "1***9");
        assert_eq!(mask_value("ab", false), "**");
        assert_eq!(mask_value("a", false), "**");
        assert_eq!(mask_value("", false), NULL_MASK);
    }

    #[test]
    fn test_email_masking() {
        assert_eq!(mask_value("ada@example.org", true), "a***a@example.org");
        assert_eq!(mask_value("a@example.org", true), "***@example.org");
        assert_eq!(mask_value("al@example.org", true), "***@example.org");
        // without '@' the generic rule applies
        assert_eq!(mask_value("not-an-email", true), "n***l");
    }

    #[test]
    fn test_email_field_without_email_value() {
        assert_eq!(mask_value("ada@example.org", false), "a***g");
    }

    #[test]
    fn test_mask_counts_characters_not_bytes() {
        assert_eq!(mask_value("éé", false), "**");
        assert_eq!(mask_value("Zoë", false), "Z***ë");
    }

    #[test]
    fn test_mask_json_values() {
        assert_eq!(Sensitivity::Sensitive.mask(None), NULL_MASK);
        assert_eq!(Sensitivity::Sensitive.mask(Some(&Value::Null)), NULL_MASK);
        assert_eq!(Sensitivity::Sensitive.mask(Some(&json!(""))), NULL_MASK);
        assert_eq!(Sensitivity::Sensitive.mask(Some(&json!(4111222233334444u64))), "4***4");
        assert_eq!(Sensitivity::Email.mask(Some(&json!("ada@example.org"))), "a***a@example.org");
    }
}
