//! Query-parameter DSL: `search`, `searchFields` and `searchJoin` parsing, plus field resolution.

use std::fmt;

/// Comparison operator. Anything not special-cased is carried verbatim (lower-cased).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    #[default]
    Eq,
    Like,
    ILike,
    In,
    Between,
    Other(String),
}

/// Operators recognised inside a `field:operator:value` search segment.
const INLINE_OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "like", "ilike", "not like", "not ilike", "in", "between",
];

impl Operator {
    /// Case-folds and trims; an empty string means `=`.
    pub fn parse(s: &str) -> Operator {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "" | "=" => Operator::Eq,
            "like" => Operator::Like,
            "ilike" => Operator::ILike,
            "in" => Operator::In,
            "between" => Operator::Between,
            _ => Operator::Other(s),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::In => "in",
            Operator::Between => "between",
            Operator::Other(s) => s.as_str(),
        }
    }

    /// `in` and `between` never receive the bare search term.
    pub fn takes_bare_term(&self) -> bool {
        !matches!(self, Operator::In | Operator::Between)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Operator::Like | Operator::ILike)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How non-first matched fields combine (`searchJoin`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinMode {
    And,
    #[default]
    Or,
}

impl JoinMode {
    /// Only a case-insensitive `and` selects AND; anything else is OR.
    pub fn parse(raw: Option<&str>) -> JoinMode {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("and") => JoinMode::And,
            _ => JoinMode::Or,
        }
    }
}

/// One `field:value` (or `field:operator:value`) segment of `search`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryToken {
    pub field: String,
    /// Inline operator from a three-part segment.
    pub operator: Option<Operator>,
    pub raw_value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchExpression {
    pub tokens: Vec<QueryToken>,
    /// Segment without `:`, applied to every resolved field that accepts it.
    pub bare: Option<String>,
    pub join: JoinMode,
}

impl SearchExpression {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.bare.is_none()
    }

    pub fn with_join(mut self, join: JoinMode) -> Self {
        self.join = join;
        self
    }

    /// Last explicit token for `field` wins.
    pub fn token_for(&self, field: &str) -> Option<&QueryToken> {
        self.tokens.iter().rev().find(|t| t.field == field)
    }
}

/// A field a container declares eligible for search, with its default operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchableField {
    pub field: String,
    pub operator: Operator,
}

impl SearchableField {
    pub fn new(field: impl Into<String>, operator: Operator) -> Self {
        SearchableField {
            field: field.into(),
            operator,
        }
    }
}

/// One `searchFields` item: `field` or `field:operator`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldOverride {
    pub field: String,
    pub operator: Option<Operator>,
}

/// Split `search` into tokens and the bare term. Empty input gives an empty expression.
pub fn parse_search(raw: &str) -> SearchExpression {
    let mut expr = SearchExpression::default();
    for segment in raw.split(';') {
        if !segment.contains(':') {
            let term = segment.trim();
            if expr.bare.is_none() && !term.is_empty() {
                expr.bare = Some(term.to_string());
            }
            continue;
        }
        match parse_segment(segment) {
            Some(token) => expr.tokens.push(token),
            None => tracing::debug!(segment = %segment, "search segment without field name skipped"),
        }
    }
    expr
}

fn parse_segment(segment: &str) -> Option<QueryToken> {
    let (field, rest) = segment.split_once(':')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    if let Some((op, value)) = rest.split_once(':') {
        let op_norm = op.trim().to_lowercase();
        if INLINE_OPERATORS.contains(&op_norm.as_str()) {
            return Some(QueryToken {
                field: field.to_string(),
                operator: Some(Operator::parse(&op_norm)),
                raw_value: Some(value.to_string()),
            });
        }
    }
    Some(QueryToken {
        field: field.to_string(),
        operator: None,
        raw_value: Some(rest.to_string()),
    })
}

/// Parse `searchFields`. Blank items are dropped.
pub fn parse_search_fields(raw: &str) -> Vec<FieldOverride> {
    raw.split(';')
        .filter_map(|item| {
            let (field, operator) = match item.split_once(':') {
                Some((f, op)) if !op.trim().is_empty() => (f.trim(), Some(Operator::parse(op))),
                Some((f, _)) => (f.trim(), None),
                None => (item.trim(), None),
            };
            if field.is_empty() {
                return None;
            }
            Some(FieldOverride {
                field: field.to_string(),
                operator,
            })
        })
        .collect()
}

/// Reconcile configured fields with an optional `searchFields` override.
///
/// Declared order is kept. With an override, only the intersection survives and an
/// overridden operator applies when it is in `accepted`; unknown override fields are ignored.
pub fn resolve_fields(
    configured: &[SearchableField],
    overrides: Option<&[FieldOverride]>,
    accepted: &[Operator],
) -> Vec<SearchableField> {
    let overrides = match overrides {
        Some(o) if !o.is_empty() => o,
        _ => return configured.to_vec(),
    };
    configured
        .iter()
        .filter_map(|f| {
            let ov = overrides.iter().find(|o| o.field == f.field)?;
            let operator = match &ov.operator {
                Some(op) if accepted.contains(op) => op.clone(),
                Some(op) => {
                    tracing::debug!(field = %f.field, operator = %op, "searchFields operator not accepted, keeping default");
                    f.operator.clone()
                }
                None => f.operator.clone(),
            };
            Some(SearchableField::new(f.field.clone(), operator))
        })
        .collect()
}
