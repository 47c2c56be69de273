//! Payload schema validation primitives.
//!
//! A schema takes a raw, loosely-typed payload and either produces the typed
//! value the domain works with or a list of every issue found. Validation never
//! stops at the first problem so callers can report all of them at once.

use serde::Serialize;

/// A single problem found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field the issue refers to (empty for the payload as a whole).
    pub path: String,
    /// Machine-readable issue kind (`required`, `too_small`, `too_big`, ...).
    pub code: &'static str,
    pub message: String,
}

/// Every issue found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of exactly one issue.
    pub fn single(path: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(path, code, message);
        errors
    }

    pub fn push(&mut self, path: impl Into<String>, code: &'static str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            code,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Record a `required` issue when `value` is absent.
    pub fn require<T>(&mut self, path: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.push(path, "required", format!("{path} is required"));
        }
        value
    }

    /// Required text field: trimmed, non-empty, at most `max_chars` characters.
    pub fn required_text(
        &mut self,
        path: &'static str,
        value: Option<String>,
        max_chars: usize,
    ) -> Option<String> {
        let value = self.require(path, value)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(path, "too_small", format!("{path} must not be empty"));
            return None;
        }
        if trimmed.chars().count() > max_chars {
            self.push(
                path,
                "too_big",
                format!("{path} must be at most {max_chars} characters"),
            );
            return None;
        }
        Some(trimmed.to_string())
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if issue.path.is_empty() {
                f.write_str(&issue.message)?;
            } else {
                write!(f, "{}: {}", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Schema contract: raw payload in, typed value or issue list out.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_value_is_reported_as_required() {
        let mut errors = ValidationErrors::new();
        let out: Option<String> = errors.require("email", None);
        assert!(out.is_none());
        assert_eq!(errors.issues().len(), 1);
        assert_eq!(errors.issues()[0].path, "email");
        assert_eq!(errors.issues()[0].code, "required");
    }

    #[test]
    fn required_text_trims_and_checks_bounds() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            errors.required_text("name", Some("  Ann  ".to_string()), 10),
            Some("Ann".to_string())
        );
        assert!(errors.is_empty());

        assert!(errors.required_text("name", Some("   ".to_string()), 10).is_none());
        assert!(errors.required_text("title", Some("x".repeat(11)), 10).is_none());

        let codes: Vec<_> = errors.issues().iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["too_small", "too_big"]);
    }

    #[test]
    fn display_joins_all_issues() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "required", "email is required");
        errors.push("", "invalid_type", "expected a JSON object");
        assert_eq!(
            errors.to_string(),
            "email: email is required; expected a JSON object"
        );
    }

    #[test]
    fn serializes_as_issue_array() {
        let errors = ValidationErrors::single("password", "required", "password is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["path"], "password");
        assert_eq!(json[0]["code"], "required");
    }

    proptest! {
        /// Property: any text with visible content within bounds is accepted as its trimmed form.
        #[test]
        fn bounded_text_round_trips_trimmed(s in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,40}") {
            let mut errors = ValidationErrors::new();
            let out = errors.required_text("field", Some(format!("  {s} ")), 64);
            prop_assert!(errors.is_empty());
            prop_assert_eq!(out, Some(s.trim().to_string()));
        }
    }
}
