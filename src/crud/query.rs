/**
 * List Query Grammar
 *
 * This module parses the query-string mini-language used by every listing
 * endpoint and compiles it to SQL through `sqlx::QueryBuilder`:
 *
 * - `field=value` / `field[gte|gt|lte|lt]=value` - comparison filters
 * - `sort=a,-b`                                  - sort keys, `-` for descending
 * - `fields=a,b,c`                               - response field projection
 * - `page` / `limit`                             - pagination (defaults 1 / 100)
 *
 * # Validation
 *
 * Every field name is checked against the resource's allow-list and every
 * value is parsed according to the field's declared kind before anything
 * reaches the database. Unknown fields, unknown operators, and unparsable
 * values are rejected with a validation error. Column names pushed into SQL
 * only ever come from the allow-list; values are always bound parameters.
 */

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use crate::error::ApiError;

/// Default page size when `limit` is not given
pub const DEFAULT_LIMIT: i64 = 100;

/// Upper bound on `limit` to keep a single response bounded
pub const MAX_LIMIT: i64 = 1000;

/// A filterable/sortable column in a resource's allow-list
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Timestamp,
        }
    }
}

/// How a field's filter values are parsed and bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Timestamp,
}

/// Comparison operator in a filter expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::Gt => " > ",
            Self::Gte => " >= ",
            Self::Lt => " < ",
            Self::Lte => " <= ",
        }
    }
}

/// A parsed filter value, typed per the field's declared kind
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

/// A single validated filter expression (column, operator, value)
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub op: Operator,
    pub value: FilterValue,
}

/// A single validated sort key
#[derive(Debug, Clone)]
pub struct SortKey {
    pub column: &'static str,
    pub descending: bool,
}

/// A fully parsed and validated list query
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
    pub fields: Option<Vec<&'static str>>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            fields: None,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Parse raw query-string pairs against a resource's field allow-list
    ///
    /// # Arguments
    /// * `params` - Decoded query-string pairs, in request order
    /// * `allowed` - The resource's filter/sort allow-list
    ///
    /// # Errors
    /// Validation error on an unknown field, unknown operator, unparsable
    /// value, or out-of-range `page`/`limit`.
    pub fn parse(params: &[(String, String)], allowed: &'static [Field]) -> Result<Self, ApiError> {
        let mut query = Self::default();

        for (key, value) in params {
            match key.as_str() {
                "sort" => query.sort = parse_sort(value, allowed)?,
                "fields" => query.fields = Some(parse_fields(value, allowed)?),
                "page" => {
                    query.page = parse_positive(value, "page")?;
                }
                "limit" => {
                    query.limit = parse_positive(value, "limit")?.min(MAX_LIMIT);
                }
                _ => query.filters.push(parse_filter(key, value, allowed)?),
            }
        }

        Ok(query)
    }

    /// Append WHERE/ORDER BY/LIMIT/OFFSET clauses to a select statement
    ///
    /// # Arguments
    /// * `qb` - Query builder already holding the SELECT and any base
    ///   conditions
    /// * `has_where` - Whether the builder already contains a WHERE clause,
    ///   so filters are joined with AND instead
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>, mut has_where: bool) {
        for filter in &self.filters {
            qb.push(if has_where { " AND " } else { " WHERE " });
            has_where = true;

            qb.push(filter.column);
            qb.push(filter.op.sql());
            match &filter.value {
                FilterValue::Text(s) => qb.push_bind(s.clone()),
                FilterValue::Number(n) => qb.push_bind(*n),
                FilterValue::Timestamp(t) => qb.push_bind(*t),
            };
        }

        if self.sort.is_empty() {
            // Default ordering: newest first
            qb.push(" ORDER BY created_at DESC");
        } else {
            qb.push(" ORDER BY ");
            for (i, key) in self.sort.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(key.column);
                if key.descending {
                    qb.push(" DESC");
                }
            }
        }

        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind((self.page - 1) * self.limit);
    }
}

fn find_field(name: &str, allowed: &'static [Field]) -> Option<&'static Field> {
    allowed.iter().find(|f| f.name == name)
}

fn parse_filter(key: &str, value: &str, allowed: &'static [Field]) -> Result<Filter, ApiError> {
    // "price[gte]" splits into the field name and the bracketed operator;
    // a bare "price" is an equality filter.
    let (name, op) = match key.find('[') {
        Some(open) => {
            let close = key
                .rfind(']')
                .filter(|&close| close == key.len() - 1 && close > open)
                .ok_or_else(|| {
                    ApiError::validation(format!("Malformed filter parameter: {key}"))
                })?;
            let op_str = &key[open + 1..close];
            let op = Operator::parse(op_str).ok_or_else(|| {
                ApiError::validation(format!("Unknown filter operator: {op_str}"))
            })?;
            (&key[..open], op)
        }
        None => (key, Operator::Eq),
    };

    let field = find_field(name, allowed)
        .ok_or_else(|| ApiError::validation(format!("Unknown filter field: {name}")))?;

    let value = match field.kind {
        FieldKind::Text => FilterValue::Text(value.to_string()),
        FieldKind::Number => FilterValue::Number(value.parse().map_err(|_| {
            ApiError::validation(format!("Invalid numeric value for {name}: {value}"))
        })?),
        FieldKind::Timestamp => FilterValue::Timestamp(
            value
                .parse()
                .map_err(|_| ApiError::validation(format!("Invalid timestamp for {name}: {value}")))?,
        ),
    };

    Ok(Filter {
        column: field.name,
        op,
        value,
    })
}

fn parse_sort(value: &str, allowed: &'static [Field]) -> Result<Vec<SortKey>, ApiError> {
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|key| {
            let (name, descending) = match key.strip_prefix('-') {
                Some(name) => (name, true),
                None => (key, false),
            };
            let field = find_field(name, allowed)
                .ok_or_else(|| ApiError::validation(format!("Unknown sort field: {name}")))?;
            Ok(SortKey {
                column: field.name,
                descending,
            })
        })
        .collect()
}

fn parse_fields(value: &str, allowed: &'static [Field]) -> Result<Vec<&'static str>, ApiError> {
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|name| {
            find_field(name, allowed)
                .map(|f| f.name)
                .ok_or_else(|| ApiError::validation(format!("Unknown projection field: {name}")))
        })
        .collect()
}

fn parse_positive(value: &str, name: &str) -> Result<i64, ApiError> {
    let n: i64 = value
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid value for {name}: {value}")))?;
    if n < 1 {
        return Err(ApiError::validation(format!("{name} must be at least 1")));
    }
    Ok(n)
}

/// Strip each serialized record down to the projected fields
///
/// Projection is applied to the serialized records rather than the SQL
/// column list; `id` is always retained so records stay addressable.
pub fn project_fields(values: &mut [Value], fields: &[&'static str]) {
    for value in values {
        if let Value::Object(map) = value {
            map.retain(|key, _| key == "id" || fields.contains(&key.as_str()));
        }
    }
}
