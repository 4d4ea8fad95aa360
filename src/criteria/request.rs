//! Request criteria: reserved query parameters compiled into a predicate plus modifiers.

use crate::config::ParamNames;
use crate::criteria::dsl::{parse_search, parse_search_fields, resolve_fields, JoinMode, Operator, SearchableField};
use crate::criteria::modifiers::{parse_eager_load, parse_order, parse_projection, EagerLoadSpec, OrderSpec, ProjectionSpec};
use crate::criteria::predicate::{Combinator, PredicateBuilder, PredicateNode};
use crate::hashid::{decode_search_data, HashIdCodec};
use crate::query::QueryTarget;
use std::collections::HashMap;

/// Raw reserved parameters; each is independently optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CriteriaParams {
    pub search: Option<String>,
    pub search_fields: Option<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub sorted_by: Option<String>,
    pub with: Option<String>,
    pub with_count: Option<String>,
    pub search_join: Option<String>,
}

impl CriteriaParams {
    pub fn from_query(query: &HashMap<String, String>, names: &ParamNames) -> Self {
        let get = |name: &str| query.get(name).cloned();
        CriteriaParams {
            search: get(&names.search),
            search_fields: get(&names.search_fields),
            filter: get(&names.filter),
            order_by: get(&names.order_by),
            sorted_by: get(&names.sorted_by),
            with: get(&names.with),
            with_count: get(&names.with_count),
            search_join: get(&names.search_join),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledCriteria {
    /// Always a `Group` when present.
    pub predicate: Option<PredicateNode>,
    pub order: OrderSpec,
    pub projection: ProjectionSpec,
    pub eager: EagerLoadSpec,
}

impl CompiledCriteria {
    /// Attach the search group (AND-ed into the query) and then the modifiers.
    pub fn apply(&self, target: &mut dyn QueryTarget) {
        if let Some(node) = &self.predicate {
            node.apply(target, Combinator::And);
        }
        self.order.apply(target);
        self.projection.apply(target);
        self.eager.apply(target);
    }
}

pub struct RequestCriteria<'a> {
    codec: &'a HashIdCodec,
    accepted: &'a [Operator],
    strict_in_guard: bool,
}

impl<'a> RequestCriteria<'a> {
    pub fn new(codec: &'a HashIdCodec, accepted: &'a [Operator], strict_in_guard: bool) -> Self {
        RequestCriteria {
            codec,
            accepted,
            strict_in_guard,
        }
    }

    /// Compile `params` against the container's searchable fields. `table` qualifies
    /// non-relation fields.
    pub fn compile(&self, params: &CriteriaParams, fields: &[SearchableField], table: &str) -> CompiledCriteria {
        let mut expr = parse_search(params.search.as_deref().unwrap_or(""))
            .with_join(JoinMode::parse(params.search_join.as_deref()));
        decode_search_data(&mut expr, self.codec);

        let overrides = params
            .search_fields
            .as_deref()
            .map(parse_search_fields)
            .filter(|o| !o.is_empty());
        let resolved = resolve_fields(fields, overrides.as_deref(), self.accepted);

        let predicate = if expr.is_empty() {
            None
        } else {
            PredicateBuilder {
                table,
                accepted: self.accepted,
                strict_in_guard: self.strict_in_guard,
            }
            .build(&resolved, &expr)
        };

        let compiled = CompiledCriteria {
            predicate,
            order: parse_order(params.order_by.as_deref(), params.sorted_by.as_deref()),
            projection: parse_projection(params.filter.as_deref()),
            eager: parse_eager_load(params.with.as_deref(), params.with_count.as_deref()),
        };
        tracing::debug!(table = %table, criteria = ?compiled, "compiled request criteria");
        compiled
    }

    /// Compile and apply in one step, qualifying fields with the target's table.
    pub fn apply(&self, params: &CriteriaParams, fields: &[SearchableField], target: &mut dyn QueryTarget) {
        let table = target.table_name().to_string();
        self.compile(params, fields, &table).apply(target);
    }
}
