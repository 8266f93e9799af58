//! Input validation for request bodies and path parameters
//!
//! Checks accumulate into a list of field issues so a client sees every
//! problem with a submission at once.

use crate::error::{FieldIssue, InfoCareError, Result};

/// Collects field-level issues for one input
#[derive(Debug, Default)]
pub struct Checker {
    issues: Vec<FieldIssue>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) {
        if value.trim().chars().count() < min {
            self.issue(field, format!("must have at least {} characters", min));
        }
    }

    /// CPF in the formatted `xxx.xxx.xxx-xx` shape
    pub fn cpf(&mut self, field: &str, value: &str) {
        if !is_formatted_cpf(value) {
            self.issue(field, "must be in the format xxx.xxx.xxx-xx");
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.issue(field, "must be a valid e-mail address");
        }
    }

    /// E.164 phone number; the empty string is accepted as "clear"
    pub fn phone(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !is_e164(value) {
            self.issue(field, "must be in E.164 format, e.g. +5516999998888");
        }
    }

    pub fn positive(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.issue(field, "must be a positive integer");
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(InfoCareError::invalid_fields(self.issues))
        }
    }
}

/// Validate an identifier taken from a URL path
pub fn path_id(field: &str, value: i64) -> Result<i64> {
    let mut check = Checker::new();
    check.positive(field, value);
    check.finish().map(|_| value)
}

fn is_formatted_cpf(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 14
        && bytes.iter().enumerate().all(|(i, b)| match i {
            3 | 7 => *b == b'.',
            11 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn is_e164(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('+') else {
        return false;
    };
    (11..=17).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}
