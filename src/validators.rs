//! Reusable answer validators.

use crate::answers::{Answer, Answers};
use regex::Regex;

type Check = Box<dyn Fn(&Answer, &Answers) -> Result<(), String>>;

const PACKAGE_PATTERN: &str = r"^[a-zA-Z_$][\w$]*(\.[a-zA-Z_$][\w$]*)*$";
const CLASS_PATTERN: &str = r"^[A-Z_$][\w$]*$";

fn text_of(value: &Answer) -> &str {
    value.as_str().unwrap_or_default()
}

/// Rejects empty or whitespace-only text.
pub fn not_blank(message: &'static str) -> Check {
    Box::new(move |value, _| {
        if text_of(value).trim().is_empty() {
            Err(message.to_string())
        } else {
            Ok(())
        }
    })
}

/// Requires the whole text to match `pattern`.
///
/// Panics if `pattern` is not a valid regular expression; patterns are
/// compile-time constants of the command definitions.
pub fn matches(pattern: &str, message: &'static str) -> Check {
    let re = Regex::new(&format!("^(?:{pattern})$")).unwrap_or_else(|e| panic!("{e}"));
    Box::new(move |value, _| {
        if re.is_match(text_of(value)) {
            Ok(())
        } else {
            Err(message.to_string())
        }
    })
}

/// Requires a dot-separated Java package name.
pub fn is_package() -> Check {
    matches(PACKAGE_PATTERN, "Invalid package name")
}

/// Requires a Java class name starting with an upper-case letter.
pub fn is_class() -> Check {
    matches(CLASS_PATTERN, "Invalid class name")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: &Check, value: &str) -> Result<(), String> {
        check(&Answer::from(value), &Answers::new())
    }

    #[test]
    fn test_is_package() {
        let check = is_package();
        assert!(run(&check, "com.company.sample").is_ok());
        assert!(run(&check, "sample").is_ok());
        assert!(run(&check, "com..sample").is_err());
        assert!(run(&check, "com.1sample").is_err());
    }

    #[test]
    fn test_is_class() {
        let check = is_class();
        assert!(run(&check, "InvoiceListener").is_ok());
        assert!(run(&check, "invoiceListener").is_err());
        assert!(run(&check, "Invoice Listener").is_err());
    }

    #[test]
    fn test_matches_whole_value() {
        let check = matches("[a-z][a-z0-9]*", "bad namespace");
        assert!(run(&check, "sales2").is_ok());
        assert_eq!(run(&check, "Sales"), Err("bad namespace".to_string()));
        assert!(run(&check, "sales-2").is_err());
    }

    #[test]
    fn test_not_blank() {
        let check = not_blank("Empty names not allowed");
        assert!(run(&check, " ").is_err());
        assert!(run(&check, "x").is_ok());
    }
}
