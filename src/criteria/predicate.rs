//! Predicate tree built from a resolved search expression.

use crate::criteria::dsl::{JoinMode, Operator, SearchExpression, SearchableField};
use crate::query::ConditionTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Single(String),
    /// `in`: comma-separated elements.
    List(Vec<String>),
    /// `between`: first two comma-separated elements.
    Range(String, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PredicateNode {
    Comparison {
        field: String,
        op: Operator,
        value: Operand,
    },
    /// Condition scoped to a related collection (`whereHas`).
    RelationFilter {
        relation_path: String,
        nested: Box<PredicateNode>,
    },
    Group {
        children: Vec<(Combinator, PredicateNode)>,
    },
}

impl PredicateNode {
    /// Drive the target's `where*` methods for this node.
    pub fn apply(&self, target: &mut dyn ConditionTarget, boolean: Combinator) {
        match self {
            PredicateNode::Comparison { field, op, value } => match value {
                Operand::Single(v) => target.where_(boolean, field, op, v),
                Operand::List(values) => target.where_in(boolean, field, values),
                Operand::Range(low, high) => target.where_between(boolean, field, low, high),
            },
            PredicateNode::RelationFilter { relation_path, nested } => {
                target.where_has(boolean, relation_path, nested)
            }
            PredicateNode::Group { children } => target.where_group(boolean, children),
        }
    }
}

/// Turns resolved fields plus a search expression into a single `Group`.
pub struct PredicateBuilder<'a> {
    /// Table used to qualify non-relation fields; empty leaves them bare.
    pub table: &'a str,
    /// Operators a `field:operator:value` segment may select.
    pub accepted: &'a [Operator],
    /// Drop `in` values whose first element equals the field name (unresolved placeholder).
    pub strict_in_guard: bool,
}

impl<'a> PredicateBuilder<'a> {
    /// `None` when no field yields a value; an empty group is never produced.
    pub fn build(&self, fields: &[SearchableField], expr: &SearchExpression) -> Option<PredicateNode> {
        let force_and = expr.join == JoinMode::And;
        let mut children: Vec<(Combinator, PredicateNode)> = Vec::new();

        for f in fields {
            let (op, raw) = match expr.token_for(&f.field) {
                Some(token) => {
                    let op = token
                        .operator
                        .as_ref()
                        .filter(|op| self.accepted.contains(*op))
                        .unwrap_or(&f.operator)
                        .clone();
                    (op, token.raw_value.clone())
                }
                None if f.operator.takes_bare_term() => (f.operator.clone(), expr.bare.clone()),
                None => (f.operator.clone(), None),
            };
            let Some(raw) = raw else { continue };

            let (relation, leaf) = match f.field.rsplit_once('.') {
                Some((rel, leaf)) if !rel.is_empty() => (Some(rel), leaf),
                _ => (None, f.field.as_str()),
            };

            let Some(value) = self.operand(&op, leaf, raw) else {
                tracing::debug!(field = %f.field, operator = %op, "search value dropped");
                continue;
            };

            let node = match relation {
                Some(rel) => PredicateNode::RelationFilter {
                    relation_path: rel.to_string(),
                    nested: Box::new(PredicateNode::Comparison {
                        field: leaf.to_string(),
                        op,
                        value,
                    }),
                },
                None => PredicateNode::Comparison {
                    field: self.qualified(&f.field),
                    op,
                    value,
                },
            };
            let combinator = if children.is_empty() || force_and {
                Combinator::And
            } else {
                Combinator::Or
            };
            children.push((combinator, node));
        }

        if children.is_empty() {
            None
        } else {
            Some(PredicateNode::Group { children })
        }
    }

    fn operand(&self, op: &Operator, leaf: &str, raw: String) -> Option<Operand> {
        match op {
            Operator::In => {
                let values: Vec<String> = raw.split(',').map(str::to_string).collect();
                let first = values.first()?;
                if first.trim().is_empty() || (self.strict_in_guard && first == leaf) {
                    return None;
                }
                Some(Operand::List(values))
            }
            Operator::Between => {
                let mut parts = raw.split(',');
                match (parts.next(), parts.next()) {
                    (Some(low), Some(high)) => Some(Operand::Range(low.to_string(), high.to_string())),
                    _ => None,
                }
            }
            Operator::Like | Operator::ILike => Some(Operand::Single(format!("%{}%", raw))),
            Operator::Eq | Operator::Other(_) => Some(Operand::Single(raw)),
        }
    }

    fn qualified(&self, field: &str) -> String {
        if self.table.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.table, field)
        }
    }
}
