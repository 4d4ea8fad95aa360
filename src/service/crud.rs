//! Container reads and writes against PostgreSQL, driven by compiled request criteria.

use crate::config::{ResolvedContainer, ResolvedModel};
use crate::criteria::CompiledCriteria;
use crate::error::AppError;
use crate::query::sql::{insert, select_by_id};
use crate::query::{PgBindValue, QueryBuf, SqlSelect};
use serde_json::Value;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Column, PgPool, Row, TypeInfo};
use std::collections::HashMap;

pub struct CriteriaService;

impl CriteriaService {
    /// List rows matching the criteria. Limit defaults to 100, capped by the container.
    pub async fn list(
        pool: &PgPool,
        model: &ResolvedModel,
        container: &ResolvedContainer,
        criteria: &CompiledCriteria,
        limit: Option<u32>,
        offset: Option<u32>,
        allow_skip: bool,
    ) -> Result<Vec<Value>, AppError> {
        let mut select = SqlSelect::new(model, container);
        criteria.apply(&mut select);
        select.paginate(limit, offset, allow_skip);
        let q = select.finish()?;
        Self::query_many(pool, &q).await
    }

    pub async fn read(pool: &PgPool, container: &ResolvedContainer, id: u64) -> Result<Option<Value>, AppError> {
        let mut q = select_by_id(container);
        q.params.push(Value::from(id));
        Ok(Self::query_many(pool, &q).await?.into_iter().next())
    }

    /// Insert one row and return it as stored.
    pub async fn create(
        pool: &PgPool,
        container: &ResolvedContainer,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = insert(container, body)?;
        Self::query_many(pool, &q)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn ping(pool: &PgPool) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    let mut map = serde_json::Map::new();
    for (idx, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), cell_to_value(row, idx, col.type_info().name()));
    }
    Value::Object(map)
}

fn get<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(idx).ok().flatten()
}

fn cell_to_value(row: &PgRow, idx: usize, type_name: &str) -> Value {
    let v = match type_name {
        "INT2" => get::<i16>(row, idx).map(Value::from),
        "INT4" => get::<i32>(row, idx).map(Value::from),
        "INT8" => get::<i64>(row, idx).map(Value::from),
        "FLOAT4" => get::<f32>(row, idx).and_then(|n| serde_json::Number::from_f64(n as f64)).map(Value::Number),
        "FLOAT8" => get::<f64>(row, idx).and_then(serde_json::Number::from_f64).map(Value::Number),
        "BOOL" => get::<bool>(row, idx).map(Value::Bool),
        "UUID" => get::<uuid::Uuid>(row, idx).map(|u| Value::String(u.to_string())),
        "TIMESTAMPTZ" => get::<chrono::DateTime<chrono::Utc>>(row, idx).map(|d| Value::String(d.to_rfc3339())),
        "TIMESTAMP" => get::<chrono::NaiveDateTime>(row, idx)
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => get::<chrono::NaiveDate>(row, idx).map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        "JSON" | "JSONB" => get::<Value>(row, idx),
        _ => get::<String>(row, idx).map(Value::String),
    };
    v.unwrap_or(Value::Null)
}
