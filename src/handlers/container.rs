//! Container handlers: criteria-driven list, hashed-id read, create with id decoding.

use crate::config::ResolvedContainer;
use crate::criteria::RequestCriteria;
use crate::error::AppError;
use crate::extractors::CriteriaQuery;
use crate::hashid::{decode_route_id, PayloadWalker};
use crate::response::{success_many, success_one};
use crate::service::{CriteriaService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn container<'a>(state: &'a AppState, path_segment: &str, operation: &str) -> Result<&'a ResolvedContainer, AppError> {
    let c = state
        .model
        .container(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))?;
    if !c.allows(operation) {
        return Err(AppError::BadRequest(format!("{} not allowed", operation)));
    }
    Ok(c)
}

fn walker(state: &AppState) -> PayloadWalker<'_> {
    PayloadWalker::new(&state.codec, state.settings.max_decode_depth)
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    query: CriteriaQuery,
) -> Result<impl IntoResponse, AppError> {
    let c = container(&state, &path_segment, "list")?;
    let criteria = RequestCriteria::new(&state.codec, &state.model.accepted_conditions, state.settings.strict_in_guard)
        .compile(&query.params, &c.searchable, &c.table_name);
    let mut rows = CriteriaService::list(
        &state.pool,
        &state.model,
        c,
        &criteria,
        query.limit,
        query.offset,
        state.settings.pagination_skip,
    )
    .await?;
    let w = walker(&state);
    for row in rows.iter_mut() {
        w.encode_at_paths(row, &c.encode_paths);
    }
    Ok(success_many(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let c = container(&state, &path_segment, "read")?;
    let id = decode_route_id(&state.codec, &id_str, &path_segment, &state.settings.skipped_routes)?;
    let mut row = CriteriaService::read(&state.pool, c, id)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    walker(&state).encode_at_paths(&mut row, &c.encode_paths);
    Ok(success_one(StatusCode::OK, row))
}

/// Configured url parameters override body keys; hashed ids are then decoded at the
/// container's decode paths before validation.
pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    query: CriteriaQuery,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let c = container(&state, &path_segment, "create")?;
    let mut body = body;
    let Value::Object(map) = &mut body else {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    };
    for name in &c.url_parameters {
        if let Some(v) = query.raw.get(name) {
            map.insert(name.clone(), Value::String(v.clone()));
        }
    }
    let w = walker(&state);
    w.decode_at_paths(&mut body, &c.decode_paths);
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &c.validation)?;
    let mut row = CriteriaService::create(&state.pool, c, &body).await?;
    w.encode_at_paths(&mut row, &c.encode_paths);
    Ok(success_one(StatusCode::CREATED, row))
}
