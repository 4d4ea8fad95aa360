//! Path-addressed id decoding/encoding over nested JSON payloads.
//!
//! An [`IdPath`] such as `items.*.product_id` names the id-bearing fields of a payload;
//! `*` fans out over every element of an array (or every value of an object).

use crate::error::ConfigError;
use crate::hashid::HashIdCodec;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Default recursion ceiling for payload walks.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Wildcard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdPath {
    segments: Vec<PathSegment>,
}

impl IdPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl FromStr for IdPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::InvalidIdPath(s.to_string()));
        }
        let mut segments = Vec::new();
        for part in s.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ConfigError::InvalidIdPath(s.to_string()));
            }
            segments.push(if part == "*" {
                PathSegment::Wildcard
            } else {
                PathSegment::Key(part.to_string())
            });
        }
        Ok(IdPath { segments })
    }
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Key(k) => k.as_str(),
                PathSegment::Wildcard => "*",
            })
            .collect();
        f.write_str(&parts.join("."))
    }
}

/// Parse a list of path patterns (from config).
pub fn parse_id_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<IdPath>, ConfigError> {
    patterns.iter().map(|p| p.as_ref().parse()).collect()
}

/// Values that are never treated as hashed ids: numbers, booleans, null and the literal "null".
fn is_passthrough(v: &Value) -> bool {
    match v {
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => s.eq_ignore_ascii_case("null") || s.trim().parse::<i64>().is_ok() || is_bool_like(s),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Boolean-like strings (`1/0`, `true/false`, `on/off`, `yes/no`), case-insensitive.
pub fn is_bool_like(s: &str) -> bool {
    parse_bool_like(s).is_some()
}

pub fn parse_bool_like(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Walks payloads, decoding (or encoding) values at configured paths.
pub struct PayloadWalker<'a> {
    codec: &'a HashIdCodec,
    max_depth: usize,
}

impl<'a> PayloadWalker<'a> {
    pub fn new(codec: &'a HashIdCodec, max_depth: usize) -> Self {
        PayloadWalker { codec, max_depth }
    }

    /// Decode hashed ids in place. No-op when the codec is disabled.
    pub fn decode_at_paths(&self, value: &mut Value, paths: &[IdPath]) {
        if !self.codec.is_enabled() {
            return;
        }
        for path in paths {
            self.walk(value, path.segments(), 0, &|leaf: &mut Value| self.decode_leaf(leaf));
        }
    }

    /// Encode integer ids in place for responses. No-op when the codec is disabled.
    pub fn encode_at_paths(&self, value: &mut Value, paths: &[IdPath]) {
        if !self.codec.is_enabled() {
            return;
        }
        for path in paths {
            self.walk(value, path.segments(), 0, &|leaf: &mut Value| self.encode_leaf(leaf));
        }
    }

    fn walk(&self, value: &mut Value, rest: &[PathSegment], depth: usize, leaf: &dyn Fn(&mut Value)) {
        if depth > self.max_depth {
            tracing::warn!(max_depth = self.max_depth, "id path walk exceeded depth ceiling, subtree left as is");
            return;
        }
        let Some((segment, tail)) = rest.split_first() else {
            leaf(value);
            return;
        };
        match segment {
            PathSegment::Wildcard => match value {
                Value::Array(items) => {
                    for item in items.iter_mut() {
                        self.walk(item, tail, depth + 1, leaf);
                    }
                }
                Value::Object(map) => {
                    for (_, item) in map.iter_mut() {
                        self.walk(item, tail, depth + 1, leaf);
                    }
                }
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
            },
            PathSegment::Key(key) => match value {
                Value::Object(map) => {
                    if let Some(child) = map.get_mut(key.as_str()) {
                        self.walk(child, tail, depth + 1, leaf);
                    }
                }
                Value::Array(items) => {
                    if let Some(child) = key.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                        self.walk(child, tail, depth + 1, leaf);
                    }
                }
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
            },
        }
    }

    fn decode_leaf(&self, leaf: &mut Value) {
        if is_passthrough(leaf) {
            return;
        }
        if let Value::String(token) = leaf {
            if let Some(id) = self.codec.decode(token) {
                *leaf = Value::Number(id.into());
            }
        }
    }

    fn encode_leaf(&self, leaf: &mut Value) {
        if let Some(id) = leaf.as_u64() {
            *leaf = Value::String(self.codec.encode(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashid::DEFAULT_ALPHABET;
    use serde_json::json;

    fn codec() -> HashIdCodec {
        HashIdCodec::new("payload salt", 6, DEFAULT_ALPHABET).unwrap()
    }

    fn paths(p: &[&str]) -> Vec<IdPath> {
        parse_id_paths(p).unwrap()
    }

    #[test]
    fn parses_and_displays_paths() {
        let p: IdPath = "items.*.product_id".parse().unwrap();
        assert_eq!(p.segments().len(), 3);
        assert_eq!(p.segments()[1], PathSegment::Wildcard);
        assert_eq!(p.to_string(), "items.*.product_id");
        assert!("items..id".parse::<IdPath>().is_err());
        assert!("".parse::<IdPath>().is_err());
    }

    #[test]
    fn decodes_top_level_and_nested_wildcards() {
        let c = codec();
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let mut body = json!({
            "user_id": c.encode(7),
            "items": [
                {"product_id": c.encode(11), "qty": 2},
                {"product_id": c.encode(12), "qty": 1}
            ],
            "note": "keep me"
        });
        walker.decode_at_paths(&mut body, &paths(&["user_id", "items.*.product_id"]));
        assert_eq!(body["user_id"], json!(7));
        assert_eq!(body["items"][0]["product_id"], json!(11));
        assert_eq!(body["items"][1]["product_id"], json!(12));
        assert_eq!(body["note"], json!("keep me"));
    }

    #[test]
    fn wildcard_over_list_of_ids() {
        let c = codec();
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let mut body = json!({"roles_ids": [c.encode(1), c.encode(2)]});
        walker.decode_at_paths(&mut body, &paths(&["roles_ids.*"]));
        assert_eq!(body, json!({"roles_ids": [1, 2]}));
    }

    #[test]
    fn decoding_is_idempotent() {
        let c = codec();
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let p = paths(&["id", "items.*.id"]);
        let mut body = json!({"id": c.encode(3), "items": [{"id": c.encode(4)}, {"id": "true"}]});
        walker.decode_at_paths(&mut body, &p);
        let once = body.clone();
        walker.decode_at_paths(&mut body, &p);
        assert_eq!(body, once);
        assert_eq!(body["items"][1]["id"], json!("true"));
    }

    #[test]
    fn missing_segments_and_invalid_tokens_are_left_alone() {
        let c = codec();
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let mut body = json!({"owner": null, "id": "definitely-not-a-hash", "scalar": 5});
        walker.decode_at_paths(&mut body, &paths(&["owner.id", "missing.*.id", "id", "scalar.*"]));
        assert_eq!(body, json!({"owner": null, "id": "definitely-not-a-hash", "scalar": 5}));
    }

    #[test]
    fn depth_ceiling_halts_traversal() {
        let c = codec();
        let walker = PayloadWalker::new(&c, 1);
        let token = c.encode(9);
        let mut body = json!({"a": {"b": {"id": token.clone()}}});
        walker.decode_at_paths(&mut body, &paths(&["a.b.id"]));
        assert_eq!(body["a"]["b"]["id"], json!(token));
    }

    #[test]
    fn disabled_codec_is_a_no_op() {
        let c = codec().with_enabled(false);
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let token = c.encode(9);
        let mut body = json!({"id": token.clone()});
        walker.decode_at_paths(&mut body, &paths(&["id"]));
        assert_eq!(body["id"], json!(token));
    }

    #[test]
    fn encodes_for_responses() {
        let c = codec();
        let walker = PayloadWalker::new(&c, DEFAULT_MAX_DEPTH);
        let mut rows = json!([{"id": 1, "owner": {"id": 2}}, {"id": 3, "owner": null}]);
        walker.encode_at_paths(&mut rows, &paths(&["*.id", "*.owner.id"]));
        assert_eq!(rows[0]["id"], json!(c.encode(1)));
        assert_eq!(rows[0]["owner"]["id"], json!(c.encode(2)));
        assert_eq!(rows[1]["id"], json!(c.encode(3)));
        assert_eq!(rows[1]["owner"], Value::Null);
    }
}
