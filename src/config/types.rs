//! Raw config types matching the container JSON schema.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the reserved query parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamNames {
    pub search: String,
    pub search_fields: String,
    pub filter: String,
    pub order_by: String,
    pub sorted_by: String,
    pub with: String,
    pub with_count: String,
    pub search_join: String,
}

impl Default for ParamNames {
    fn default() -> Self {
        ParamNames {
            search: "search".into(),
            search_fields: "searchFields".into(),
            filter: "filter".into(),
            order_by: "orderBy".into(),
            sorted_by: "sortedBy".into(),
            with: "with".into(),
            with_count: "withCount".into(),
            search_join: "searchJoin".into(),
        }
    }
}

/// `"name"` (default operator `=`) or `{"name": "like", "email": "="}`; object keys keep
/// their declared order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchableFieldConfig {
    Name(String),
    WithOperator(serde_json::Map<String, serde_json::Value>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    ToOne,
    ToMany,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationConfig {
    pub name: String,
    /// Path segment of the related container.
    pub target: String,
    pub direction: RelationDirection,
    /// Column on this container's table.
    #[serde(default = "default_primary_key")]
    pub local_key: String,
    /// Column on the related table.
    pub foreign_key: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub path_segment: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
    #[serde(default)]
    pub fields_searchable: Vec<SearchableFieldConfig>,
    /// PostgreSQL type per column, used to cast text-bound parameters (e.g. `"id": "bigint"`).
    #[serde(default)]
    pub column_types: HashMap<String, String>,
    #[serde(default)]
    pub relations: Vec<RelationConfig>,
    /// IdPath patterns decoded in request bodies.
    #[serde(default)]
    pub decode: Vec<String>,
    /// IdPath patterns encoded in response rows.
    #[serde(default = "default_encode")]
    pub encode: Vec<String>,
    /// Path parameters merged into the body before decoding.
    #[serde(default)]
    pub url_parameters: Vec<String>,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
    /// Per-container ceiling for `limit`; the global cap applies when unset.
    #[serde(default)]
    pub max_limit: Option<u32>,
}

fn default_schema() -> String {
    "public".into()
}

fn default_primary_key() -> String {
    "id".into()
}

fn default_operations() -> Vec<String> {
    vec!["list".into(), "read".into()]
}

fn default_encode() -> Vec<String> {
    vec!["id".into()]
}

fn default_accepted() -> Vec<String> {
    vec!["=".into(), "like".into()]
}

/// Whole config document: `{"containers": [...]}` plus optional criteria knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CriteriaFile {
    pub containers: Vec<ContainerConfig>,
    #[serde(default)]
    pub params: ParamNames,
    /// Operators `searchFields` and inline segments may select.
    #[serde(default = "default_accepted")]
    pub accepted_conditions: Vec<String>,
}

impl Default for CriteriaFile {
    fn default() -> Self {
        CriteriaFile {
            containers: Vec::new(),
            params: ParamNames::default(),
            accepted_conditions: default_accepted(),
        }
    }
}
