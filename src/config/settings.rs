//! Process settings read from the environment, after loading `.env` when present.

use crate::error::ConfigError;
use crate::hashid::{parse_bool_like, HashIdCodec, DEFAULT_ALPHABET, DEFAULT_MAX_DEPTH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriteriaSettings {
    pub hash_id: bool,
    pub salt: String,
    pub min_length: usize,
    pub alphabet: String,
    pub max_decode_depth: usize,
    pub strict_in_guard: bool,
    /// Routes whose `:id` is a plain integer even with hash ids enabled.
    pub skipped_routes: Vec<String>,
    /// `limit=0` lists without a LIMIT instead of using the default page size.
    pub pagination_skip: bool,
}

impl Default for CriteriaSettings {
    fn default() -> Self {
        CriteriaSettings {
            hash_id: true,
            salt: String::new(),
            min_length: 0,
            alphabet: DEFAULT_ALPHABET.to_string(),
            max_decode_depth: DEFAULT_MAX_DEPTH,
            strict_in_guard: true,
            skipped_routes: Vec::new(),
            pagination_skip: false,
        }
    }
}

impl CriteriaSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = CriteriaSettings::default();
        if let Some(v) = lookup("HASH_ID") {
            s.hash_id = flag("HASH_ID", &v)?;
        }
        if let Some(v) = lookup("HASH_ID_SALT") {
            s.salt = v;
        }
        if let Some(v) = lookup("HASH_ID_LENGTH") {
            s.min_length = number("HASH_ID_LENGTH", &v)?;
        }
        if let Some(v) = lookup("HASH_ID_ALPHABET").filter(|v| !v.is_empty()) {
            s.alphabet = v;
        }
        if let Some(v) = lookup("CRITERIA_MAX_DECODE_DEPTH") {
            s.max_decode_depth = number("CRITERIA_MAX_DECODE_DEPTH", &v)?;
        }
        if let Some(v) = lookup("CRITERIA_STRICT_IN_GUARD") {
            s.strict_in_guard = flag("CRITERIA_STRICT_IN_GUARD", &v)?;
        }
        if let Some(v) = lookup("HASH_ID_SKIPPED_ROUTES") {
            s.skipped_routes = v
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("CRITERIA_PAGINATION_SKIP") {
            s.pagination_skip = flag("CRITERIA_PAGINATION_SKIP", &v)?;
        }
        Ok(s)
    }

    /// Codec for these settings; disabled (but still valid) when `HASH_ID` is off.
    pub fn codec(&self) -> Result<HashIdCodec, ConfigError> {
        Ok(HashIdCodec::new(&self.salt, self.min_length, &self.alphabet)?.with_enabled(self.hash_id))
    }
}

fn flag(key: &str, v: &str) -> Result<bool, ConfigError> {
    parse_bool_like(v).ok_or_else(|| ConfigError::Validation(format!("{} must be a boolean, got '{}'", key, v)))
}

fn number(key: &str, v: &str) -> Result<usize, ConfigError> {
    v.trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{} must be a non-negative integer, got '{}'", key, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = CriteriaSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, CriteriaSettings::default());
        assert!(s.codec().unwrap().is_enabled());
    }

    #[test]
    fn reads_every_key() {
        let s = CriteriaSettings::from_lookup(lookup(&[
            ("HASH_ID", "false"),
            ("HASH_ID_SALT", "pepper"),
            ("HASH_ID_LENGTH", "10"),
            ("CRITERIA_MAX_DECODE_DEPTH", "4"),
            ("CRITERIA_STRICT_IN_GUARD", "off"),
            ("HASH_ID_SKIPPED_ROUTES", "legacy, audit"),
            ("CRITERIA_PAGINATION_SKIP", "true"),
        ]))
        .unwrap();
        assert!(!s.hash_id);
        assert_eq!(s.salt, "pepper");
        assert_eq!(s.min_length, 10);
        assert_eq!(s.max_decode_depth, 4);
        assert!(!s.strict_in_guard);
        assert_eq!(s.skipped_routes, vec!["legacy", "audit"]);
        assert!(s.pagination_skip);
        assert!(!s.codec().unwrap().is_enabled());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(CriteriaSettings::from_lookup(lookup(&[("HASH_ID", "maybe")])).is_err());
        assert!(CriteriaSettings::from_lookup(lookup(&[("HASH_ID_LENGTH", "-1")])).is_err());
        let s = CriteriaSettings::from_lookup(lookup(&[("HASH_ID_ALPHABET", "abc")])).unwrap();
        assert!(s.codec().is_err());
    }
}
