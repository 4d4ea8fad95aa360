//! Pre-pass over explicit `field:value` search tokens.

use crate::criteria::SearchExpression;
use crate::hashid::{parse_bool_like, HashIdCodec};

fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    s.bytes().any(|b| b.is_ascii_digit()) && s.parse::<f64>().is_ok()
}

/// Normalize boolean-like values to `1`/`0`, then (codec enabled) replace hashed ids with
/// their integer. Numeric values and undecodable tokens are kept as given. The bare term is
/// never touched.
pub fn decode_search_data(expr: &mut SearchExpression, codec: &HashIdCodec) {
    for token in expr.tokens.iter_mut() {
        let Some(raw) = token.raw_value.as_mut() else { continue };
        if raw.is_empty() {
            continue;
        }
        if let Some(b) = parse_bool_like(raw) {
            *raw = if b { "1" } else { "0" }.to_string();
            continue;
        }
        if !codec.is_enabled() || is_numeric(raw) {
            continue;
        }
        if let Some(id) = codec.decode(raw) {
            tracing::debug!(field = %token.field, "search value decoded from hashed id");
            *raw = id.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::parse_search;
    use crate::hashid::DEFAULT_ALPHABET;

    fn codec() -> HashIdCodec {
        HashIdCodec::new("search salt", 4, DEFAULT_ALPHABET).unwrap()
    }

    fn values(expr: &SearchExpression) -> Vec<&str> {
        expr.tokens.iter().filter_map(|t| t.raw_value.as_deref()).collect()
    }

    #[test]
    fn hashed_ids_are_decoded() {
        let c = codec();
        let token = c.encode(77);
        let mut e = parse_search(&format!("user_id:{};name:john", token));
        decode_search_data(&mut e, &c);
        assert_eq!(values(&e), vec!["77", "john"]);
    }

    #[test]
    fn numeric_values_are_preserved() {
        let mut e = parse_search("id:5;price:2.50");
        decode_search_data(&mut e, &codec());
        assert_eq!(values(&e), vec!["5", "2.50"]);
    }

    #[test]
    fn bool_like_values_are_normalized() {
        let mut e = parse_search("active:true;deleted:Off;flag:1");
        decode_search_data(&mut e, &codec());
        assert_eq!(values(&e), vec!["1", "0", "1"]);
    }

    #[test]
    fn disabled_codec_only_normalizes() {
        let c = codec().with_enabled(false);
        let token = c.encode(77);
        let mut e = parse_search(&format!("user_id:{};active:yes", token));
        decode_search_data(&mut e, &c);
        assert_eq!(values(&e), vec![token.as_str(), "1"]);
    }

    #[test]
    fn bare_term_and_empty_values_untouched() {
        let c = codec();
        let token = c.encode(9);
        let mut e = parse_search(&format!("name:;{}", token));
        decode_search_data(&mut e, &c);
        assert_eq!(values(&e), vec![""]);
        assert_eq!(e.bare.as_deref(), Some(token.as_str()));
    }
}
