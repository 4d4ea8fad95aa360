pub mod dsl;
pub mod modifiers;
pub mod predicate;
pub mod request;

pub use dsl::{
    parse_search, parse_search_fields, resolve_fields, FieldOverride, JoinMode, Operator, QueryToken, SearchExpression,
    SearchableField,
};
pub use modifiers::{
    parse_eager_load, parse_order, parse_projection, Direction, EagerLoadSpec, OrderSpec, OrderTerm, ProjectionSpec,
};
pub use predicate::{Combinator, Operand, PredicateBuilder, PredicateNode};
pub use request::{CompiledCriteria, CriteriaParams, RequestCriteria};
