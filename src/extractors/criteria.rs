//! Extract reserved criteria parameters (plus `limit`/`offset`) from the query string.

use crate::config::ParamNames;
use crate::criteria::CriteriaParams;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct CriteriaQuery {
    pub params: CriteriaParams,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Every query parameter as received, for url-parameter merging.
    pub raw: HashMap<String, String>,
}

impl CriteriaQuery {
    /// Unparseable `limit`/`offset` values are ignored.
    pub fn from_map(raw: HashMap<String, String>, names: &ParamNames) -> Self {
        CriteriaQuery {
            params: CriteriaParams::from_query(&raw, names),
            limit: raw.get("limit").and_then(|v| v.parse().ok()),
            offset: raw.get("offset").and_then(|v| v.parse().ok()),
            raw,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CriteriaQuery
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let Query(raw) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(CriteriaQuery::from_map(raw, &app.model.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_reserved_and_paging_parameters() {
        let raw: HashMap<String, String> = [
            ("search", "name:ann"),
            ("orderBy", "name"),
            ("limit", "5"),
            ("offset", "x"),
            ("role_id", "abc"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let q = CriteriaQuery::from_map(raw, &ParamNames::default());
        assert_eq!(q.params.search.as_deref(), Some("name:ann"));
        assert_eq!(q.params.order_by.as_deref(), Some("name"));
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.offset, None);
        assert_eq!(q.raw.get("role_id").map(String::as_str), Some("abc"));
    }
}
