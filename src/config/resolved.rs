//! Resolved container model: config validated and flattened for runtime use.

use crate::config::{ParamNames, RelationDirection, ValidationRule};
use crate::criteria::{Operator, SearchableField};
use crate::hashid::IdPath;
use std::collections::HashMap;

/// A relation usable in `with`, `withCount` and relation-scoped search fields.
#[derive(Clone, Debug)]
pub struct RelationSpec {
    pub name: String,
    pub direction: RelationDirection,
    /// Path segment of the related container (for lookup in model).
    pub target: String,
    /// Our column used in the join.
    pub local_key: String,
    /// Their column used in the join.
    pub foreign_key: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedContainer {
    pub path_segment: String,
    pub schema_name: String,
    pub table_name: String,
    pub primary_key: String,
    pub operations: Vec<String>,
    pub searchable: Vec<SearchableField>,
    pub column_types: HashMap<String, String>,
    pub relations: Vec<RelationSpec>,
    pub decode_paths: Vec<IdPath>,
    pub encode_paths: Vec<IdPath>,
    pub url_parameters: Vec<String>,
    pub validation: HashMap<String, ValidationRule>,
    pub max_limit: Option<u32>,
}

impl ResolvedContainer {
    pub fn relation(&self, name: &str) -> Option<&RelationSpec> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.column_types.get(column).map(String::as_str)
    }

    pub fn allows(&self, operation: &str) -> bool {
        self.operations.iter().any(|o| o == operation)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedModel {
    pub containers: Vec<ResolvedContainer>,
    by_path: HashMap<String, usize>,
    pub params: ParamNames,
    pub accepted_conditions: Vec<Operator>,
}

impl ResolvedModel {
    pub fn new(containers: Vec<ResolvedContainer>, params: ParamNames, accepted_conditions: Vec<Operator>) -> Self {
        let by_path = containers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.path_segment.clone(), i))
            .collect();
        ResolvedModel {
            containers,
            by_path,
            params,
            accepted_conditions,
        }
    }

    pub fn container(&self, path: &str) -> Option<&ResolvedContainer> {
        self.by_path.get(path).and_then(|&i| self.containers.get(i))
    }
}
