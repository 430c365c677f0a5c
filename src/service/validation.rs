//! Input validation from per-field config rules.

use crate::config::ValidationRule;
use crate::error::AdminError;
use crate::hooks::Record;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate create input. All required fields must be present and non-null.
    pub fn validate(record: &Record, rules: &HashMap<String, ValidationRule>) -> Result<(), AdminError> {
        let mut fields: Vec<&String> = rules.keys().collect();
        fields.sort();
        for field in fields {
            let rule = &rules[field];
            let val = record.get(field);
            if rule.required == Some(true) && val.map_or(true, Value::is_null) {
                return Err(AdminError::Validation(format!("{} is required", field)));
            }
            if let Some(v) = val {
                validate_field(field, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate edit input: only fields present are checked, but a required field may not be nulled.
    pub fn validate_partial(record: &Record, rules: &HashMap<String, ValidationRule>) -> Result<(), AdminError> {
        for (field, v) in record {
            let Some(rule) = rules.get(field) else { continue };
            if rule.required == Some(true) && v.is_null() {
                return Err(AdminError::Validation(format!("{} is required", field)));
            }
            validate_field(field, v, rule)?;
        }
        Ok(())
    }
}

fn validate_field(field: &str, v: &Value, rule: &ValidationRule) -> Result<(), AdminError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = &rule.format {
        validate_format(field, v, format)?;
    }
    if let (Some(max), Some(s)) = (rule.max_length, v.as_str()) {
        if s.chars().count() > max as usize {
            return Err(AdminError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
    }
    if let (Some(min), Some(s)) = (rule.min_length, v.as_str()) {
        if s.chars().count() < min as usize {
            return Err(AdminError::Validation(format!(
                "{} must be at least {} characters",
                field, min
            )));
        }
    }
    if let Some(pattern) = &rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AdminError::Validation(format!("invalid pattern for {}", field)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AdminError::Validation(format!("{} does not match required pattern", field)));
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(AdminError::Validation(format!(
                "{} must be one of: {}",
                field,
                allowed.iter().take(5).map(Value::to_string).collect::<Vec<_>>().join(", ")
            )));
        }
    }
    if let (Some(min), Some(n)) = (rule.minimum, v.as_f64()) {
        if n < min {
            return Err(AdminError::Validation(format!("{} must be at least {}", field, min)));
        }
    }
    if let (Some(max), Some(n)) = (rule.maximum, v.as_f64()) {
        if n > max {
            return Err(AdminError::Validation(format!("{} must be at most {}", field, max)));
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(field: &str, v: &Value, format: &str) -> Result<(), AdminError> {
    let Some(s) = v.as_str() else { return Ok(()) };
    match format.to_lowercase().as_str() {
        "email" => {
            let ok = s
                .split_once('@')
                .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
            if !ok {
                return Err(AdminError::Validation(format!("{} must be a valid email", field)));
            }
        }
        "uuid" => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(AdminError::Validation(format!("{} must be a valid UUID", field)));
            }
        }
        other => tracing::debug!(field, format = other, "unknown validation format ignored"),
    }
    Ok(())
}
