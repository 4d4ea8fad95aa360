//! Query-target capability consumed by the criteria compiler, plus an in-memory recorder.

use crate::criteria::{Combinator, Direction, Operator, PredicateNode};

/// Condition surface of a query (the `where*` family).
///
/// `boolean` is the edge joining the new condition to what came before it.
pub trait ConditionTarget {
    fn table_name(&self) -> &str;
    fn where_(&mut self, boolean: Combinator, column: &str, operator: &Operator, value: &str);
    fn where_in(&mut self, boolean: Combinator, column: &str, values: &[String]);
    fn where_between(&mut self, boolean: Combinator, column: &str, low: &str, high: &str);
    /// Condition on a related collection; `nested` is evaluated in the relation's scope.
    fn where_has(&mut self, boolean: Combinator, relation: &str, nested: &PredicateNode);
    /// Parenthesised group of conditions.
    fn where_group(&mut self, boolean: Combinator, children: &[(Combinator, PredicateNode)]);

    fn or_where(&mut self, column: &str, operator: &Operator, value: &str) {
        self.where_(Combinator::Or, column, operator, value);
    }

    fn or_where_in(&mut self, column: &str, values: &[String]) {
        self.where_in(Combinator::Or, column, values);
    }

    fn or_where_between(&mut self, column: &str, low: &str, high: &str) {
        self.where_between(Combinator::Or, column, low, high);
    }

    fn or_where_has(&mut self, relation: &str, nested: &PredicateNode) {
        self.where_has(Combinator::Or, relation, nested);
    }
}

/// Full query surface: conditions plus ordering, projection and eager loading.
pub trait QueryTarget: ConditionTarget {
    fn order_by(&mut self, column: &str, direction: Direction);
    /// Replaces the default column selection.
    fn select(&mut self, columns: &[String]);
    fn with(&mut self, relations: &[String]);
    fn with_count(&mut self, relations: &[String]);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Where {
        boolean: Combinator,
        column: String,
        operator: String,
        value: String,
    },
    WhereIn {
        boolean: Combinator,
        column: String,
        values: Vec<String>,
    },
    WhereBetween {
        boolean: Combinator,
        column: String,
        low: String,
        high: String,
    },
    WhereHas {
        boolean: Combinator,
        relation: String,
        nested: Vec<Call>,
    },
    Group {
        boolean: Combinator,
        nested: Vec<Call>,
    },
    OrderBy {
        column: String,
        direction: Direction,
    },
    Select(Vec<String>),
    With(Vec<String>),
    WithCount(Vec<String>),
}

/// Records every capability call; nested scopes are recorded as child call lists.
#[derive(Clone, Debug, Default)]
pub struct RecordedQuery {
    table: String,
    pub calls: Vec<Call>,
}

impl RecordedQuery {
    pub fn new(table: impl Into<String>) -> Self {
        RecordedQuery {
            table: table.into(),
            calls: Vec::new(),
        }
    }
}

impl ConditionTarget for RecordedQuery {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn where_(&mut self, boolean: Combinator, column: &str, operator: &Operator, value: &str) {
        self.calls.push(Call::Where {
            boolean,
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        });
    }

    fn where_in(&mut self, boolean: Combinator, column: &str, values: &[String]) {
        self.calls.push(Call::WhereIn {
            boolean,
            column: column.to_string(),
            values: values.to_vec(),
        });
    }

    fn where_between(&mut self, boolean: Combinator, column: &str, low: &str, high: &str) {
        self.calls.push(Call::WhereBetween {
            boolean,
            column: column.to_string(),
            low: low.to_string(),
            high: high.to_string(),
        });
    }

    fn where_has(&mut self, boolean: Combinator, relation: &str, nested: &PredicateNode) {
        let mut scope = RecordedQuery::new(relation);
        nested.apply(&mut scope, Combinator::And);
        self.calls.push(Call::WhereHas {
            boolean,
            relation: relation.to_string(),
            nested: scope.calls,
        });
    }

    fn where_group(&mut self, boolean: Combinator, children: &[(Combinator, PredicateNode)]) {
        let mut scope = RecordedQuery::new(self.table.clone());
        for (edge, child) in children {
            child.apply(&mut scope, *edge);
        }
        self.calls.push(Call::Group {
            boolean,
            nested: scope.calls,
        });
    }
}

impl QueryTarget for RecordedQuery {
    fn order_by(&mut self, column: &str, direction: Direction) {
        self.calls.push(Call::OrderBy {
            column: column.to_string(),
            direction,
        });
    }

    fn select(&mut self, columns: &[String]) {
        self.calls.push(Call::Select(columns.to_vec()));
    }

    fn with(&mut self, relations: &[String]) {
        self.calls.push(Call::With(relations.to_vec()));
    }

    fn with_count(&mut self, relations: &[String]) {
        self.calls.push(Call::WithCount(relations.to_vec()));
    }
}
