//! Config validation: referential integrity and identifier safety.

use crate::config::{CriteriaFile, SearchableFieldConfig};
use crate::error::ConfigError;
use crate::hashid::parse_id_paths;
use crate::query::sql::is_identifier;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Type names are spliced into `$n::type` casts, so only plain type syntax is allowed.
fn is_pg_type(s: &str) -> bool {
    static PG_TYPE: OnceLock<Regex> = OnceLock::new();
    PG_TYPE
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?( [A-Za-z]+)*(\(\d+(,\s*\d+)?\))?(\[\])?$")
                .expect("static regex")
        })
        .is_match(s)
}

fn ident(what: &str, container: &str, value: &str) -> Result<(), ConfigError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{} '{}' on container {} is not a plain identifier",
            what, value, container
        )))
    }
}

pub fn validate(file: &CriteriaFile) -> Result<(), ConfigError> {
    let paths: HashSet<&str> = file.containers.iter().map(|c| c.path_segment.as_str()).collect();
    let mut seen = HashSet::new();

    for c in &file.containers {
        let name = c.path_segment.as_str();
        if name.trim().is_empty() {
            return Err(ConfigError::Validation("container path_segment must not be empty".into()));
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicatePathSegment(c.path_segment.clone()));
        }
        ident("schema", name, &c.schema)?;
        ident("table", name, &c.table)?;
        ident("primary key", name, &c.primary_key)?;

        for f in &c.fields_searchable {
            let blank = match f {
                SearchableFieldConfig::Name(n) => n.trim().is_empty(),
                SearchableFieldConfig::WithOperator(m) => m.is_empty() || m.keys().any(|k| k.trim().is_empty()),
            };
            if blank {
                return Err(ConfigError::Validation(format!("container {} has a blank searchable field", name)));
            }
            if let SearchableFieldConfig::WithOperator(m) = f {
                if let Some((field, _)) = m.iter().find(|(_, op)| !op.is_string()) {
                    return Err(ConfigError::Validation(format!(
                        "operator for searchable field {}.{} must be a string",
                        name, field
                    )));
                }
            }
        }

        for (column, ty) in &c.column_types {
            ident("column", name, column)?;
            if !is_pg_type(ty) {
                return Err(ConfigError::Validation(format!(
                    "column type '{}' for {}.{} is not a valid type name",
                    ty, name, column
                )));
            }
        }

        let mut relations = HashSet::new();
        for r in &c.relations {
            ident("relation", name, &r.name)?;
            ident("local key", name, &r.local_key)?;
            ident("foreign key", name, &r.foreign_key)?;
            if !relations.insert(r.name.as_str()) {
                return Err(ConfigError::DuplicateRelation {
                    container: c.path_segment.clone(),
                    relation: r.name.clone(),
                });
            }
            if !paths.contains(r.target.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "container",
                    id: r.target.clone(),
                });
            }
        }

        if c.max_limit == Some(0) {
            return Err(ConfigError::Validation(format!("container {} max_limit must be positive", name)));
        }

        parse_id_paths(&c.decode)?;
        parse_id_paths(&c.encode)?;
    }

    if file.accepted_conditions.iter().any(|op| op.trim().is_empty()) {
        return Err(ConfigError::Validation("accepted_conditions must not contain blanks".into()));
    }

    Ok(())
}
