//! Routing-boundary id check: unlike payload decoding, a bad token is a client error.

use crate::error::AppError;
use crate::hashid::HashIdCodec;

/// Resolve the `:id` segment of `route`.
///
/// With the codec enabled the token must decode, unless `route` is listed in `skipped`, in
/// which case it must be a plain integer. With the codec disabled it must be a plain integer.
pub fn decode_route_id(codec: &HashIdCodec, token: &str, route: &str, skipped: &[String]) -> Result<u64, AppError> {
    let hashed = codec.is_enabled() && !skipped.iter().any(|s| s == route);
    let id = if hashed {
        codec.decode(token)
    } else {
        token.parse::<u64>().ok()
    };
    id.ok_or_else(|| {
        tracing::warn!(route = %route, token = %token, "route id rejected");
        AppError::IncorrectId(token.to_string())
    })
}
