//! Load container config from a JSON file, a string, or a payload table in the database.

use crate::config::resolved::{RelationSpec, ResolvedContainer, ResolvedModel};
use crate::config::types::*;
use crate::config::validate;
use crate::criteria::{Operator, SearchableField};
use crate::error::ConfigError;
use crate::hashid::parse_id_paths;
use sqlx::PgPool;
use std::path::Path;

/// Build resolved model from a config document (validates first).
pub fn resolve(file: &CriteriaFile) -> Result<ResolvedModel, ConfigError> {
    validate(file)?;
    let mut containers = Vec::with_capacity(file.containers.len());
    for c in &file.containers {
        containers.push(resolve_container(c)?);
    }
    let accepted = file.accepted_conditions.iter().map(|op| Operator::parse(op)).collect();
    Ok(ResolvedModel::new(containers, file.params.clone(), accepted))
}

fn resolve_container(c: &ContainerConfig) -> Result<ResolvedContainer, ConfigError> {
    let searchable = c
        .fields_searchable
        .iter()
        .flat_map(|f| match f {
            SearchableFieldConfig::Name(name) => vec![SearchableField::new(name.trim(), Operator::Eq)],
            SearchableFieldConfig::WithOperator(map) => map
                .iter()
                .map(|(name, op)| SearchableField::new(name.trim(), Operator::parse(op.as_str().unwrap_or("="))))
                .collect(),
        })
        .collect();
    let relations = c
        .relations
        .iter()
        .map(|r| RelationSpec {
            name: r.name.clone(),
            direction: r.direction,
            target: r.target.clone(),
            local_key: r.local_key.clone(),
            foreign_key: r.foreign_key.clone(),
        })
        .collect();
    Ok(ResolvedContainer {
        path_segment: c.path_segment.clone(),
        schema_name: c.schema.clone(),
        table_name: c.table.clone(),
        primary_key: c.primary_key.clone(),
        operations: c.operations.clone(),
        searchable,
        column_types: c.column_types.clone(),
        relations,
        decode_paths: parse_id_paths(&c.decode)?,
        encode_paths: parse_id_paths(&c.encode)?,
        url_parameters: c.url_parameters.clone(),
        validation: c.validation.clone(),
        max_limit: c.max_limit,
    })
}

pub fn load_from_str(json: &str) -> Result<CriteriaFile, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<CriteriaFile, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading criteria config");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_from_str(&raw)
}

/// Load container configs stored one per row as `payload jsonb` in `schema.table`.
pub async fn load_from_pool(pool: &PgPool, schema: &str, table: &str) -> Result<CriteriaFile, ConfigError> {
    let sql = format!(
        "SELECT payload FROM \"{}\".\"{}\" ORDER BY id",
        schema.replace('"', "\"\""),
        table.replace('"', "\"\"")
    );
    tracing::debug!(sql = %sql, "query");
    let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let mut containers = Vec::with_capacity(rows.len());
    for row in rows {
        let c: ContainerConfig = serde_json::from_value(row).map_err(|e| ConfigError::Load(e.to_string()))?;
        containers.push(c);
    }
    Ok(CriteriaFile {
        containers,
        ..CriteriaFile::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "containers": [
            {
                "path_segment": "users",
                "table": "users",
                "fields_searchable": ["name", {"email": "LIKE"}, "profile.city"],
                "relations": [
                    {"name": "profile", "target": "profiles", "direction": "to_one", "foreign_key": "user_id"}
                ],
                "decode": ["role_id", "roles.*"]
            },
            {"path_segment": "profiles", "table": "profiles", "schema": "app"}
        ],
        "accepted_conditions": ["=", "like", "in"]
    }"#;

    #[test]
    fn resolves_document() {
        let model = resolve(&load_from_str(DOC).unwrap()).unwrap();
        let users = model.container("users").unwrap();
        let names: Vec<(&str, &Operator)> = users.searchable.iter().map(|f| (f.field.as_str(), &f.operator)).collect();
        assert_eq!(
            names,
            vec![("name", &Operator::Eq), ("email", &Operator::Like), ("profile.city", &Operator::Eq)]
        );
        let rel = users.relation("profile").unwrap();
        assert_eq!(rel.local_key, "id");
        assert_eq!(rel.target, "profiles");
        assert_eq!(users.decode_paths.len(), 2);
        assert_eq!(users.encode_paths[0].to_string(), "id");
        assert_eq!(model.container("profiles").unwrap().schema_name, "app");
        assert_eq!(model.accepted_conditions, vec![Operator::Eq, Operator::Like, Operator::In]);
        assert!(model.container("nope").is_none());
    }

    #[test]
    fn operator_object_fields_resolve_in_written_order() {
        let doc = r#"{"containers": [{"path_segment": "users", "table": "users",
            "fields_searchable": [{"name": "like", "email": "="}], "max_limit": 25}]}"#;
        let model = resolve(&load_from_str(doc).unwrap()).unwrap();
        let users = model.container("users").unwrap();
        let names: Vec<&str> = users.searchable.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["name", "email"]);
        assert_eq!(users.searchable[0].operator, Operator::Like);
        assert_eq!(users.max_limit, Some(25));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(load_from_str("{"), Err(ConfigError::Load(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_from_path("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(msg) if msg.contains("not/here.json")));
    }
}
