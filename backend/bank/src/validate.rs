//! # Registration Validator
//!
//! Checks a raw form submission against the current field schema.
//!
//! - Runs field by field in schema order, hidden fields included
//! - Never short-circuits: every broken rule adds one message
//! - An empty result means the submission is valid
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::fields::{FieldDescriptor, FieldType};

pub type Submission = Map<String, Value>;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+\-()]+$").expect("phone pattern"));

const MIN_PHONE_DIGITS: usize = 10;

pub fn validate(submission: &Submission, schema: &[FieldDescriptor]) -> Vec<String> {
    let mut errors = Vec::new();

    for field in schema {
        let value = submission.get(&field.name);

        if is_empty(value) {
            if field.required {
                errors.push(format!("{} is required", field.label));
            }
            continue;
        }

        let Some(text) = value.and_then(as_text) else {
            continue;
        };

        let valid = match field.field_type {
            FieldType::Email => EMAIL.is_match(&text),
            FieldType::Tel => is_phone(&text),
            FieldType::Url => Url::parse(&text).is_ok(),
            _ => true,
        };

        if !valid {
            errors.push(format!("Please provide a valid {}", field.label));
        }
    }

    errors
}

pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Scalar values as text; arrays and objects have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_phone(text: &str) -> bool {
    PHONE.is_match(text) && text.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
}
