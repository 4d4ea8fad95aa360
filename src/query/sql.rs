//! PostgreSQL query target: renders criteria into parameterized SQL.
//! Identifiers are validated and quoted, values always travel as bind parameters.

use crate::config::{RelationDirection, RelationSpec, ResolvedContainer, ResolvedModel};
use crate::criteria::{Combinator, Direction, Operator, PredicateNode};
use crate::error::AppError;
use crate::query::{ConditionTarget, QueryTarget};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

const MAIN_ALIAS: &str = "main";
pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Request-supplied identifiers must look like plain column/relation names.
pub fn is_identifier(s: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
        .is_match(s)
}

fn sql_operator(op: &Operator) -> Option<&'static str> {
    Some(match op {
        Operator::Eq => "=",
        Operator::Like => "LIKE",
        Operator::ILike => "ILIKE",
        Operator::In | Operator::Between => return None,
        Operator::Other(s) => match s.as_str() {
            "!=" | "<>" => "<>",
            "<" => "<",
            "<=" => "<=",
            ">" => ">",
            ">=" => ">=",
            "not like" => "NOT LIKE",
            "not ilike" => "NOT ILIKE",
            _ => return None,
        },
    })
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

/// State shared by the root query and every nested condition scope.
struct Ctx<'a> {
    model: &'a ResolvedModel,
    params: Vec<Value>,
    errors: Vec<String>,
    aliases: usize,
}

impl<'a> Ctx<'a> {
    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    fn next_alias(&mut self) -> String {
        self.aliases += 1;
        format!("r{}", self.aliases)
    }

    fn related(&mut self, container: &'a ResolvedContainer, name: &str) -> Option<(&'a RelationSpec, &'a ResolvedContainer)> {
        let Some(rel) = container.relation(name) else {
            self.errors.push(format!("unknown relation '{}' on {}", name, container.path_segment));
            return None;
        };
        let model: &'a ResolvedModel = self.model;
        let Some(target) = model.container(&rel.target) else {
            self.errors.push(format!("relation '{}' targets unknown container '{}'", name, rel.target));
            return None;
        };
        Some((rel, target))
    }
}

/// Conditions rendered against one table alias.
struct Scope<'c, 'a> {
    ctx: &'c mut Ctx<'a>,
    container: &'a ResolvedContainer,
    alias: String,
    clauses: Vec<(Combinator, String)>,
}

impl<'c, 'a> Scope<'c, 'a> {
    fn new(ctx: &'c mut Ctx<'a>, container: &'a ResolvedContainer, alias: String) -> Self {
        Scope {
            ctx,
            container,
            alias,
            clauses: Vec::new(),
        }
    }

    /// `col` or `<table>.col` in this scope.
    fn column(&mut self, raw: &str) -> Option<(String, Option<&'a str>)> {
        let col = match raw.split_once('.') {
            None => raw,
            Some((table, col)) if table == self.container.table_name => col,
            Some(_) => {
                self.ctx.errors.push(format!("column '{}' is not on {}", raw, self.container.table_name));
                return None;
            }
        };
        if !is_identifier(col) {
            self.ctx.errors.push(format!("invalid column name '{}'", raw));
            return None;
        }
        let cast = self.container.column_type(col);
        Some((format!("{}.{}", self.alias, quoted(col)), cast))
    }

    fn placeholder(&mut self, value: &str, cast: Option<&str>) -> String {
        let n = self.ctx.push_param(Value::String(value.to_string()));
        match cast {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }

    fn push(&mut self, boolean: Combinator, clause: String) {
        self.clauses.push((boolean, clause));
    }

    fn render(&self) -> String {
        if self.clauses.is_empty() {
            return "TRUE".to_string();
        }
        let mut out = String::new();
        for (i, (boolean, clause)) in self.clauses.iter().enumerate() {
            if i > 0 {
                out.push_str(match boolean {
                    Combinator::And => " AND ",
                    Combinator::Or => " OR ",
                });
            }
            out.push_str(clause);
        }
        out
    }

    fn exists(&mut self, container: &'a ResolvedContainer, outer: &str, hops: &[&str], nested: &PredicateNode) -> Option<String> {
        let (first, rest) = hops.split_first()?;
        let (rel, related) = self.ctx.related(container, first)?;
        let alias = self.ctx.next_alias();
        let join = format!(
            "{}.{} = {}.{}",
            alias,
            quoted(&rel.foreign_key),
            outer,
            quoted(&rel.local_key)
        );
        let inner = if rest.is_empty() {
            let mut scope = Scope::new(&mut *self.ctx, related, alias.clone());
            nested.apply(&mut scope, Combinator::And);
            scope.render()
        } else {
            self.exists(related, &alias, rest, nested)?
        };
        Some(format!(
            "EXISTS (SELECT 1 FROM {} {} WHERE {} AND ({}))",
            qualified_table(&related.schema_name, &related.table_name),
            alias,
            join,
            inner
        ))
    }
}

impl<'c, 'a> ConditionTarget for Scope<'c, 'a> {
    fn table_name(&self) -> &str {
        &self.container.table_name
    }

    fn where_(&mut self, boolean: Combinator, column: &str, operator: &Operator, value: &str) {
        let Some(op) = sql_operator(operator) else {
            self.ctx.errors.push(format!("unsupported operator '{}'", operator));
            return;
        };
        let Some((col, cast)) = self.column(column) else { return };
        // pattern matches compare as text whatever the column type
        let clause = if op.ends_with("LIKE") {
            let ph = self.placeholder(value, None);
            match cast {
                Some(_) => format!("{}::text {} {}", col, op, ph),
                None => format!("{} {} {}", col, op, ph),
            }
        } else {
            let ph = self.placeholder(value, cast);
            format!("{} {} {}", col, op, ph)
        };
        self.push(boolean, clause);
    }

    fn where_in(&mut self, boolean: Combinator, column: &str, values: &[String]) {
        let Some((col, cast)) = self.column(column) else { return };
        if values.is_empty() {
            self.push(boolean, "FALSE".to_string());
            return;
        }
        let phs: Vec<String> = values.iter().map(|v| self.placeholder(v, cast)).collect();
        self.push(boolean, format!("{} IN ({})", col, phs.join(", ")));
    }

    fn where_between(&mut self, boolean: Combinator, column: &str, low: &str, high: &str) {
        let Some((col, cast)) = self.column(column) else { return };
        let lo = self.placeholder(low, cast);
        let hi = self.placeholder(high, cast);
        self.push(boolean, format!("{} BETWEEN {} AND {}", col, lo, hi));
    }

    fn where_has(&mut self, boolean: Combinator, relation: &str, nested: &PredicateNode) {
        let hops: Vec<&str> = relation.split('.').collect();
        let outer = self.alias.clone();
        if let Some(clause) = self.exists(self.container, &outer, &hops, nested) {
            self.push(boolean, clause);
        }
    }

    fn where_group(&mut self, boolean: Combinator, children: &[(Combinator, PredicateNode)]) {
        let mut scope = Scope::new(&mut *self.ctx, self.container, self.alias.clone());
        for (edge, child) in children {
            child.apply(&mut scope, *edge);
        }
        let rendered = scope.render();
        self.push(boolean, format!("({})", rendered));
    }
}

/// Eager-load tree built from `with` paths (`posts;posts.comments`).
#[derive(Default)]
struct IncludeTree {
    children: Vec<(String, IncludeTree)>,
}

impl IncludeTree {
    fn insert(&mut self, hops: &[&str]) {
        let Some((first, rest)) = hops.split_first() else { return };
        let idx = match self.children.iter().position(|(n, _)| n == first) {
            Some(i) => i,
            None => {
                self.children.push((first.to_string(), IncludeTree::default()));
                self.children.len() - 1
            }
        };
        self.children[idx].1.insert(rest);
    }
}

/// SELECT builder implementing [`QueryTarget`] for one container.
pub struct SqlSelect<'a> {
    ctx: Ctx<'a>,
    container: &'a ResolvedContainer,
    clauses: Vec<(Combinator, String)>,
    columns: Option<Vec<String>>,
    order: Vec<String>,
    includes: IncludeTree,
    counts: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl<'a> SqlSelect<'a> {
    pub fn new(model: &'a ResolvedModel, container: &'a ResolvedContainer) -> Self {
        SqlSelect {
            ctx: Ctx {
                model,
                params: Vec::new(),
                errors: Vec::new(),
                aliases: 0,
            },
            container,
            clauses: Vec::new(),
            columns: None,
            order: Vec::new(),
            includes: IncludeTree::default(),
            counts: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// LIMIT is capped at the container's `max_limit` (1000 when unset). `limit=0` drops
    /// the LIMIT when `allow_skip` is set and means the default page size otherwise.
    pub fn paginate(&mut self, limit: Option<u32>, offset: Option<u32>, allow_skip: bool) {
        let cap = self.container.max_limit.unwrap_or(MAX_LIMIT);
        self.limit = match limit {
            Some(0) if allow_skip => None,
            Some(0) | None => Some(DEFAULT_LIMIT.min(cap)),
            Some(n) => Some(n.min(cap)),
        };
        self.offset = offset;
    }

    fn root<F: FnOnce(&mut Scope<'_, 'a>)>(&mut self, f: F) {
        let mut scope = Scope::new(&mut self.ctx, self.container, MAIN_ALIAS.to_string());
        scope.clauses = std::mem::take(&mut self.clauses);
        f(&mut scope);
        self.clauses = scope.clauses;
    }

    fn include_select(&mut self, container: &'a ResolvedContainer, outer: &str, name: &str, tree: &IncludeTree) -> Option<String> {
        let (rel, related) = self.ctx.related(container, name)?;
        let alias = self.ctx.next_alias();
        let mut cols = vec![format!("{}.*", alias)];
        for (child, sub) in &tree.children {
            cols.push(self.include_select(related, &alias, child, sub)?);
        }
        let inner = format!(
            "SELECT {} FROM {} {} WHERE {}.{} = {}.{}",
            cols.join(", "),
            qualified_table(&related.schema_name, &related.table_name),
            alias,
            alias,
            quoted(&rel.foreign_key),
            outer,
            quoted(&rel.local_key)
        );
        let sub = match rel.direction {
            RelationDirection::ToOne => format!("(SELECT row_to_json(sub) FROM ({} LIMIT 1) sub)", inner),
            RelationDirection::ToMany => format!(
                "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM ({}) sub)",
                inner
            ),
        };
        Some(format!("{} AS {}", sub, quoted(name)))
    }

    fn count_select(&mut self, name: &str) -> Option<String> {
        if name.contains('.') {
            self.ctx.errors.push(format!("withCount supports direct relations only, got '{}'", name));
            return None;
        }
        let (rel, related) = self.ctx.related(self.container, name)?;
        let alias = self.ctx.next_alias();
        Some(format!(
            "(SELECT COUNT(*) FROM {} {} WHERE {}.{} = {}.{}) AS {}",
            qualified_table(&related.schema_name, &related.table_name),
            alias,
            alias,
            quoted(&rel.foreign_key),
            MAIN_ALIAS,
            quoted(&rel.local_key),
            quoted(&format!("{}_count", name))
        ))
    }

    /// Render the statement. Unknown relations, invalid identifiers and unsupported operators
    /// collected while building are reported together as a bad request.
    pub fn finish(mut self) -> Result<QueryBuf, AppError> {
        let mut select_parts = match self.columns.take() {
            Some(cols) => cols,
            None => vec![format!("{}.*", MAIN_ALIAS)],
        };
        let tree = std::mem::take(&mut self.includes);
        for (name, sub) in &tree.children {
            if let Some(part) = self.include_select(self.container, MAIN_ALIAS, name, sub) {
                select_parts.push(part);
            }
        }
        for name in std::mem::take(&mut self.counts) {
            if let Some(part) = self.count_select(&name) {
                select_parts.push(part);
            }
        }
        if !self.ctx.errors.is_empty() {
            return Err(AppError::BadRequest(self.ctx.errors.join("; ")));
        }

        let where_clause = if self.clauses.is_empty() {
            String::new()
        } else {
            let scope = Scope {
                ctx: &mut self.ctx,
                container: self.container,
                alias: MAIN_ALIAS.to_string(),
                clauses: std::mem::take(&mut self.clauses),
            };
            format!(" WHERE {}", scope.render())
        };
        let order_clause = if self.order.is_empty() {
            format!(" ORDER BY {}.{}", MAIN_ALIAS, quoted(&self.container.primary_key))
        } else {
            format!(" ORDER BY {}", self.order.join(", "))
        };
        let limit_clause = self.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
        let offset_clause = self.offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();

        Ok(QueryBuf {
            sql: format!(
                "SELECT {} FROM {} {}{}{}{}{}",
                select_parts.join(", "),
                qualified_table(&self.container.schema_name, &self.container.table_name),
                MAIN_ALIAS,
                where_clause,
                order_clause,
                limit_clause,
                offset_clause
            ),
            params: self.ctx.params,
        })
    }
}

impl<'a> ConditionTarget for SqlSelect<'a> {
    fn table_name(&self) -> &str {
        &self.container.table_name
    }

    fn where_(&mut self, boolean: Combinator, column: &str, operator: &Operator, value: &str) {
        self.root(|s| s.where_(boolean, column, operator, value));
    }

    fn where_in(&mut self, boolean: Combinator, column: &str, values: &[String]) {
        self.root(|s| s.where_in(boolean, column, values));
    }

    fn where_between(&mut self, boolean: Combinator, column: &str, low: &str, high: &str) {
        self.root(|s| s.where_between(boolean, column, low, high));
    }

    fn where_has(&mut self, boolean: Combinator, relation: &str, nested: &PredicateNode) {
        self.root(|s| s.where_has(boolean, relation, nested));
    }

    fn where_group(&mut self, boolean: Combinator, children: &[(Combinator, PredicateNode)]) {
        self.root(|s| s.where_group(boolean, children));
    }
}

impl<'a> QueryTarget for SqlSelect<'a> {
    fn order_by(&mut self, column: &str, direction: Direction) {
        let mut rendered = None;
        self.root(|s| rendered = s.column(column));
        if let Some((col, _)) = rendered {
            self.order.push(format!("{} {}", col, direction.as_sql()));
        }
    }

    fn select(&mut self, columns: &[String]) {
        let mut cols = Vec::with_capacity(columns.len());
        self.root(|s| {
            for c in columns {
                if let Some((col, _)) = s.column(c) {
                    cols.push(col);
                }
            }
        });
        self.columns = Some(cols);
    }

    fn with(&mut self, relations: &[String]) {
        for r in relations {
            let hops: Vec<&str> = r.split('.').collect();
            if hops.iter().all(|h| is_identifier(h)) {
                self.includes.insert(&hops);
            } else {
                self.ctx.errors.push(format!("invalid relation name '{}'", r));
            }
        }
    }

    fn with_count(&mut self, relations: &[String]) {
        self.counts.extend(relations.iter().cloned());
    }
}

/// SELECT by primary key. Caller binds the id as the sole param.
pub fn select_by_id(container: &ResolvedContainer) -> QueryBuf {
    let pk = &container.primary_key;
    // untyped keys compare as text so the TEXT-bound id always matches
    let condition = match container.column_type(pk) {
        Some(t) => format!("{}.{} = $1::{}", MAIN_ALIAS, quoted(pk), t),
        None => format!("{}.{}::text = $1", MAIN_ALIAS, quoted(pk)),
    };
    QueryBuf {
        sql: format!(
            "SELECT {}.* FROM {} {} WHERE {}",
            MAIN_ALIAS,
            qualified_table(&container.schema_name, &container.table_name),
            MAIN_ALIAS,
            condition
        ),
        params: Vec::new(),
    }
}

/// INSERT of the body's columns, RETURNING the row. Column names must be plain identifiers.
pub fn insert(container: &ResolvedContainer, body: &HashMap<String, Value>) -> Result<QueryBuf, AppError> {
    let mut names: Vec<&String> = body.keys().collect();
    names.sort();
    let mut cols = Vec::with_capacity(names.len());
    let mut placeholders = Vec::with_capacity(names.len());
    let mut params = Vec::with_capacity(names.len());
    for name in names {
        if !is_identifier(name) {
            return Err(AppError::BadRequest(format!("invalid column name '{}'", name)));
        }
        params.push(body[name].clone());
        let ph = match container.column_type(name) {
            Some(t) => format!("${}::{}", params.len(), t),
            None => format!("${}", params.len()),
        };
        cols.push(quoted(name));
        placeholders.push(ph);
    }
    let table = qualified_table(&container.schema_name, &container.table_name);
    let sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            table,
            cols.join(", "),
            placeholders.join(", ")
        )
    };
    Ok(QueryBuf { sql, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, ContainerConfig, CriteriaFile};
    use crate::criteria::Operand;
    use serde_json::json;

    fn model() -> ResolvedModel {
        let users: ContainerConfig = serde_json::from_value(json!({
            "path_segment": "users",
            "table": "users",
            "fields_searchable": ["name", {"email": "like"}, "profile.city"],
            "column_types": {"id": "bigint", "age": "int"},
            "relations": [
                {"name": "profile", "target": "profiles", "direction": "to_one", "local_key": "id", "foreign_key": "user_id"},
                {"name": "posts", "target": "posts", "direction": "to_many", "local_key": "id", "foreign_key": "user_id"}
            ]
        }))
        .unwrap();
        let profiles: ContainerConfig = serde_json::from_value(json!({
            "path_segment": "profiles",
            "table": "profiles"
        }))
        .unwrap();
        let posts: ContainerConfig = serde_json::from_value(json!({
            "path_segment": "posts",
            "table": "posts",
            "relations": [
                {"name": "comments", "target": "comments", "direction": "to_many", "local_key": "id", "foreign_key": "post_id"}
            ]
        }))
        .unwrap();
        let comments: ContainerConfig = serde_json::from_value(json!({
            "path_segment": "comments",
            "table": "comments",
            "max_limit": 50
        }))
        .unwrap();
        resolve(&CriteriaFile {
            containers: vec![users, profiles, posts, comments],
            ..CriteriaFile::default()
        })
        .unwrap()
    }

    fn eq(field: &str, value: &str) -> PredicateNode {
        PredicateNode::Comparison {
            field: field.into(),
            op: Operator::Eq,
            value: Operand::Single(value.into()),
        }
    }

    #[test]
    fn empty_select_orders_by_primary_key() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        q.paginate(None, None, false);
        let buf = q.finish().unwrap();
        assert_eq!(
            buf.sql,
            "SELECT main.* FROM \"public\".\"users\" main ORDER BY main.\"id\" LIMIT 100"
        );
        assert!(buf.params.is_empty());
    }

    fn paged(m: &ResolvedModel, path: &str, limit: Option<u32>, allow_skip: bool) -> String {
        let mut q = SqlSelect::new(m, m.container(path).unwrap());
        q.paginate(limit, Some(20), allow_skip);
        q.finish().unwrap().sql
    }

    #[test]
    fn zero_limit_skips_pagination_only_when_allowed() {
        let m = model();
        assert_eq!(
            paged(&m, "users", Some(0), true),
            "SELECT main.* FROM \"public\".\"users\" main ORDER BY main.\"id\" OFFSET 20"
        );
        assert!(paged(&m, "users", Some(0), false).ends_with(" LIMIT 100 OFFSET 20"));
        assert!(paged(&m, "users", Some(5000), false).ends_with(" LIMIT 1000 OFFSET 20"));
    }

    #[test]
    fn container_max_limit_caps_requested_and_default_limit() {
        let m = model();
        assert!(paged(&m, "comments", Some(500), false).ends_with(" LIMIT 50 OFFSET 20"));
        assert!(paged(&m, "comments", None, false).ends_with(" LIMIT 50 OFFSET 20"));
        assert!(paged(&m, "comments", Some(10), false).ends_with(" LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn group_and_relation_filter_render_exists() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        let children = vec![
            (Combinator::And, eq("users.name", "ann")),
            (
                Combinator::Or,
                PredicateNode::RelationFilter {
                    relation_path: "profile".into(),
                    nested: Box::new(eq("city", "Berlin")),
                },
            ),
        ];
        q.where_group(Combinator::And, &children);
        let buf = q.finish().unwrap();
        assert_eq!(
            buf.sql,
            "SELECT main.* FROM \"public\".\"users\" main WHERE (main.\"name\" = $1 OR EXISTS (SELECT 1 FROM \"public\".\"profiles\" r1 WHERE r1.\"user_id\" = main.\"id\" AND (r1.\"city\" = $2))) ORDER BY main.\"id\""
        );
        assert_eq!(buf.params, vec![json!("ann"), json!("Berlin")]);
    }

    #[test]
    fn multi_hop_relation_nests_exists() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        q.where_has(Combinator::And, "posts.comments", &eq("body", "hi"));
        let sql = q.finish().unwrap().sql;
        assert!(sql.contains("EXISTS (SELECT 1 FROM \"public\".\"posts\" r1 WHERE r1.\"user_id\" = main.\"id\" AND (EXISTS (SELECT 1 FROM \"public\".\"comments\" r2 WHERE r2.\"post_id\" = r1.\"id\" AND (r2.\"body\" = $1))))"), "{}", sql);
    }

    #[test]
    fn casts_in_and_between() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        q.where_in(Combinator::And, "users.id", &["1".into(), "2".into()]);
        q.where_between(Combinator::Or, "age", "18", "30");
        let buf = q.finish().unwrap();
        assert!(buf.sql.contains("WHERE main.\"id\" IN ($1::bigint, $2::bigint) OR main.\"age\" BETWEEN $3::int AND $4::int"), "{}", buf.sql);
        assert_eq!(buf.params.len(), 4);
    }

    #[test]
    fn modifiers_render_projection_order_and_includes() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        q.select(&["id".into(), "name".into()]);
        q.order_by("name", Direction::Desc);
        q.with(&["posts.comments".into()]);
        q.with_count(&["posts".into()]);
        let sql = q.finish().unwrap().sql;
        assert!(sql.starts_with("SELECT main.\"id\", main.\"name\", (SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM (SELECT r1.*, (SELECT COALESCE"), "{}", sql);
        assert!(sql.contains("(SELECT COUNT(*) FROM \"public\".\"posts\" r3 WHERE r3.\"user_id\" = main.\"id\") AS \"posts_count\""), "{}", sql);
        assert!(sql.ends_with("ORDER BY main.\"name\" DESC"), "{}", sql);
    }

    #[test]
    fn bad_identifiers_and_relations_are_rejected() {
        let m = model();
        let users = m.container("users").unwrap();
        let mut q = SqlSelect::new(&m, users);
        q.order_by("name; DROP TABLE users", Direction::Asc);
        q.where_has(Combinator::And, "nope", &eq("x", "1"));
        q.where_(Combinator::And, "name", &Operator::Other("~*".into()), "x");
        let err = q.finish().unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("invalid column name"));
                assert!(msg.contains("unknown relation 'nope'"));
                assert!(msg.contains("unsupported operator"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn select_by_id_and_insert() {
        let m = model();
        let users = m.container("users").unwrap();
        assert_eq!(
            select_by_id(users).sql,
            "SELECT main.* FROM \"public\".\"users\" main WHERE main.\"id\" = $1::bigint"
        );
        let body: HashMap<String, Value> = [("name".to_string(), json!("ann")), ("age".to_string(), json!(3))].into();
        let buf = insert(users, &body).unwrap();
        assert_eq!(
            buf.sql,
            "INSERT INTO \"public\".\"users\" (\"age\", \"name\") VALUES ($1::int, $2) RETURNING *"
        );
        assert_eq!(buf.params, vec![json!(3), json!("ann")]);
    }
}
