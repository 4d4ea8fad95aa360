//! Request body validation from container rules.

use crate::config::ValidationRule;
use crate::error::AppError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Check `body` against per-column rules, in column-name order so the reported error is stable.
    pub fn validate(body: &HashMap<String, Value>, rules: &HashMap<String, ValidationRule>) -> Result<(), AppError> {
        let mut columns: Vec<&String> = rules.keys().collect();
        columns.sort();
        for col in columns {
            let rule = &rules[col];
            match body.get(col) {
                None | Some(Value::Null) if rule.required == Some(true) => {
                    return Err(AppError::Validation(format!("{} is required", col)));
                }
                Some(v) if !v.is_null() => check_field(col, v, rule)?,
                _ => {}
            }
        }
        Ok(())
    }
}

fn fail(msg: String) -> Result<(), AppError> {
    Err(AppError::Validation(msg))
}

fn check_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if let Some(format) = &rule.format {
        check_format(col, v, format)?;
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length.filter(|&m| len > m as usize) {
            return fail(format!("{} must be at most {} characters", col, max));
        }
        if let Some(min) = rule.min_length.filter(|&m| len < m as usize) {
            return fail(format!("{} must be at least {} characters", col, min));
        }
        if let Some(pattern) = &rule.pattern {
            let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
            if !re.is_match(s) {
                return fail(format!("{} does not match required pattern", col));
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| same_value(v, a)) {
            return fail(format!("{} must be one of: {:?}", col, allowed.iter().take(5).collect::<Vec<_>>()));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum.filter(|&m| n < m) {
            return fail(format!("{} must be at least {}", col, min));
        }
        if let Some(max) = rule.maximum.filter(|&m| n > m) {
            return fail(format!("{} must be at most {}", col, max));
        }
    }
    Ok(())
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn check_format(col: &str, v: &Value, format: &str) -> Result<(), AppError> {
    let ok = match format.to_lowercase().as_str() {
        "email" => v.as_str().map_or(true, |s| s.len() >= 3 && s.contains('@')),
        "uuid" => v.as_str().map_or(true, |s| uuid::Uuid::parse_str(s).is_ok()),
        // ids arrive decoded, so an id column that still holds a string was not a valid hash
        "integer" => v.is_i64() || v.is_u64(),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        fail(format!("{} must be a valid {}", col, format.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(v: Value) -> HashMap<String, ValidationRule> {
        serde_json::from_value(v).unwrap()
    }

    fn body(v: Value) -> HashMap<String, Value> {
        serde_json::from_value(v).unwrap()
    }

    fn message(r: Result<(), AppError>) -> String {
        match r {
            Err(AppError::Validation(m)) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn required_fields() {
        let r = rules(json!({"name": {"required": true}}));
        assert_eq!(message(RequestValidator::validate(&body(json!({})), &r)), "name is required");
        assert_eq!(message(RequestValidator::validate(&body(json!({"name": null})), &r)), "name is required");
        RequestValidator::validate(&body(json!({"name": "ann"})), &r).unwrap();
    }

    #[test]
    fn string_rules() {
        let r = rules(json!({"code": {"min_length": 2, "max_length": 4, "pattern": "^[A-Z]+$"}}));
        assert!(RequestValidator::validate(&body(json!({"code": "A"})), &r).is_err());
        assert!(RequestValidator::validate(&body(json!({"code": "ABCDE"})), &r).is_err());
        assert!(RequestValidator::validate(&body(json!({"code": "ab"})), &r).is_err());
        RequestValidator::validate(&body(json!({"code": "AB"})), &r).unwrap();
    }

    #[test]
    fn numeric_and_allowed_rules() {
        let r = rules(json!({"age": {"minimum": 0, "maximum": 130}, "role": {"allowed": ["admin", "user"]}}));
        assert!(RequestValidator::validate(&body(json!({"age": -1})), &r).is_err());
        assert!(RequestValidator::validate(&body(json!({"role": "root"})), &r).is_err());
        RequestValidator::validate(&body(json!({"age": 30, "role": "user"})), &r).unwrap();
    }

    #[test]
    fn formats() {
        let r = rules(json!({"email": {"format": "email"}, "ref": {"format": "uuid"}, "role_id": {"format": "integer"}}));
        assert!(RequestValidator::validate(&body(json!({"email": "nope"})), &r).is_err());
        assert!(RequestValidator::validate(&body(json!({"ref": "x"})), &r).is_err());
        assert_eq!(
            message(RequestValidator::validate(&body(json!({"role_id": "zX3k"})), &r)),
            "role_id must be a valid integer"
        );
        RequestValidator::validate(
            &body(json!({"email": "a@b.c", "ref": "67e55044-10b1-426f-9247-bb680e5fe0c8", "role_id": 7})),
            &r,
        )
        .unwrap();
    }
}
