//! Order, projection and eager-load directives (`orderBy`/`sortedBy`, `filter`, `with`, `withCount`).

use crate::query::QueryTarget;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `desc`; anything else (including empty) is ascending.
    pub fn parse(s: &str) -> Direction {
        if s.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: String,
    pub direction: Direction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderSpec {
    pub terms: Vec<OrderTerm>,
}

/// Column list that replaces the default projection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectionSpec {
    pub columns: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EagerLoadSpec {
    pub relations: Vec<String>,
    pub counts: Vec<String>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `directions[i]` applies to field `i`; a missing entry falls back to `directions[0]`.
pub fn parse_order(order_by: Option<&str>, sorted_by: Option<&str>) -> OrderSpec {
    let Some(order_by) = order_by.filter(|s| !s.trim().is_empty()) else {
        return OrderSpec::default();
    };
    let directions: Vec<&str> = sorted_by.unwrap_or("asc").split(';').collect();
    let terms = order_by
        .split(';')
        .map(str::trim)
        .enumerate()
        .filter(|(_, field)| !field.is_empty())
        .map(|(i, field)| {
            let dir = directions.get(i).or(directions.first()).copied().unwrap_or("");
            OrderTerm {
                field: field.to_string(),
                direction: Direction::parse(dir),
            }
        })
        .collect();
    OrderSpec { terms }
}

pub fn parse_projection(filter: Option<&str>) -> ProjectionSpec {
    ProjectionSpec {
        columns: filter.map(split_list).unwrap_or_default(),
    }
}

pub fn parse_eager_load(with: Option<&str>, with_count: Option<&str>) -> EagerLoadSpec {
    EagerLoadSpec {
        relations: with.map(split_list).unwrap_or_default(),
        counts: with_count.map(split_list).unwrap_or_default(),
    }
}

impl OrderSpec {
    pub fn apply(&self, target: &mut dyn QueryTarget) {
        for term in &self.terms {
            target.order_by(&term.field, term.direction);
        }
    }
}

impl ProjectionSpec {
    pub fn apply(&self, target: &mut dyn QueryTarget) {
        if !self.columns.is_empty() {
            target.select(&self.columns);
        }
    }
}

impl EagerLoadSpec {
    pub fn apply(&self, target: &mut dyn QueryTarget) {
        if !self.relations.is_empty() {
            target.with(&self.relations);
        }
        if !self.counts.is_empty() {
            target.with_count(&self.counts);
        }
    }
}
