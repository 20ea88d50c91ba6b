//! Query-string translation for list endpoints
//!
//! Turns the raw key/value pairs of a request's query string into a
//! [`ListQuery`]: typed filter clauses, a projection, sort keys and a page
//! window. Keys are resolved against a per-resource [`QuerySchema`]; anything
//! the schema does not declare is rejected instead of being passed through.
//!
//! # Example
//! ```text
//! GET /bootcamps?averageCost[lte]=10000&careers[in]=Business,UI/UX
//!     &select=name,description&sort=-averageRating,name&page=2&limit=10
//! ```

use crate::core::entity::Data;
use crate::core::error::{ApiResult, ValidationError};
use crate::core::field::{FieldKind, FieldValue};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Keys that control the query instead of filtering it
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Sort applied when the request does not name one
pub const DEFAULT_SORT: &str = "-createdAt";

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Comparison {
    /// Parse a bracket suffix (`gt`, `gte`, `lt`, `lte`, `in`)
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "gt" => Some(Comparison::Gt),
            "gte" => Some(Comparison::Gte),
            "lt" => Some(Comparison::Lt),
            "lte" => Some(Comparison::Lte),
            "in" => Some(Comparison::In),
            _ => None,
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq | Comparison::In => ordering == Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A queryable field and its declared kind
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Allow-list of the fields a resource exposes to list queries
#[derive(Debug, Clone)]
pub struct QuerySchema {
    resource: &'static str,
    fields: Vec<FieldSpec>,
    selectable: Vec<&'static str>,
}

impl QuerySchema {
    /// Every schema starts with `id` and `createdAt`
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            fields: vec![
                FieldSpec {
                    name: "id",
                    kind: FieldKind::Uuid,
                },
                FieldSpec {
                    name: "createdAt",
                    kind: FieldKind::DateTime,
                },
            ],
            selectable: Vec::new(),
        }
    }

    /// Declare a filterable, sortable and selectable field
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec { name, kind });
        self
    }

    /// Declare a field that may be selected but not filtered or sorted on
    pub fn selectable(mut self, name: &'static str) -> Self {
        self.selectable.push(name);
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Look up a filterable field
    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is a top-level key a projection may keep
    pub fn is_selectable(&self, name: &str) -> bool {
        self.selectable.contains(&name)
            || self
                .fields
                .iter()
                .any(|f| f.name.split('.').next() == Some(name))
    }
}

/// A single typed predicate
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub op: Comparison,
    /// For [`Comparison::In`] this is a [`FieldValue::List`]
    pub value: FieldValue,
}

impl FilterClause {
    /// Equality clause built in code (e.g. "courses of this bootcamp")
    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.to_string(),
            op: Comparison::Eq,
            value: value.into(),
        }
    }

    /// `in` clause built in code
    pub fn any_of(field: &str, values: Vec<FieldValue>) -> Self {
        Self {
            field: field.to_string(),
            op: Comparison::In,
            value: FieldValue::List(values),
        }
    }

    /// Evaluate the clause against a record.
    ///
    /// List-valued fields match when any element matches; `in` matches when
    /// any element of the field equals any of the given values.
    pub fn matches<T: Data>(&self, record: &T) -> bool {
        let actual = record.field_value(&self.field).unwrap_or(FieldValue::Null);
        match self.op {
            Comparison::In => {
                let wanted: Vec<&FieldValue> = self.value.members().collect();
                actual
                    .members()
                    .any(|a| wanted.iter().any(|w| a.loosely_equals(w)))
            }
            op => actual.members().any(|a| {
                a.compare(&self.value)
                    .is_some_and(|ordering| op.accepts(ordering))
            }),
        }
    }
}

/// One sort key, earlier keys take precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }

    /// Compare two records by a list of keys.
    ///
    /// Missing values order before present ones; values of unrelated types
    /// compare equal so the next key decides.
    pub fn compare_records<T: Data>(keys: &[SortKey], a: &T, b: &T) -> Ordering {
        for key in keys {
            let va = a.field_value(&key.field).unwrap_or(FieldValue::Null);
            let vb = b.field_value(&key.field).unwrap_or(FieldValue::Null);
            let ordering = match (va.is_null(), vb.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => va.compare(&vb).unwrap_or(Ordering::Equal),
            };
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Top-level keys a response keeps, `id` is always kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn includes(&self, field: &str) -> bool {
        field == "id" || self.fields.iter().any(|f| f == field)
    }

    /// Drop every key of a serialized record that is not selected
    pub fn apply(&self, record: Value) -> Value {
        match record {
            Value::Object(map) => {
                let kept: Map<String, Value> = map
                    .into_iter()
                    .filter(|(key, _)| self.includes(key))
                    .collect();
                Value::Object(kept)
            }
            other => other,
        }
    }
}

/// Bounds for the page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

/// A 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Parse `page` and `limit`; absent or non-numeric values fall back to defaults
    pub fn parse(page: Option<&str>, limit: Option<&str>, limits: &PageLimits) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(limits.default_limit)
            .min(limits.max_limit.max(1));
        Self { page, limit }
    }

    /// Number of records before this page
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Index one past the last record of this page
    pub fn end_index(&self) -> usize {
        self.page.saturating_mul(self.limit)
    }
}

/// What a store executes: filters, order and an optional window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    pub filters: Vec<FilterClause>,
    pub sort: Vec<SortKey>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl StoreQuery {
    pub fn filtered(filters: Vec<FilterClause>) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn matches<T: Data>(&self, record: &T) -> bool {
        self.filters.iter().all(|clause| clause.matches(record))
    }
}

/// The structured form of a list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FilterClause>,
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Translate raw query-string pairs against a schema
    pub fn translate(
        params: &IndexMap<String, String>,
        schema: &QuerySchema,
        limits: &PageLimits,
    ) -> ApiResult<Self> {
        let mut filters = Vec::new();
        for (key, raw) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            filters.push(parse_filter(key, raw, schema)?);
        }

        let projection = match params.get("select") {
            Some(select) => parse_select(select, schema)?,
            None => None,
        };

        let sort = parse_sort(params.get("sort").map(String::as_str), schema)?;

        let page = PageRequest::parse(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
            limits,
        );

        tracing::debug!(
            resource = schema.resource(),
            filters = filters.len(),
            page = page.page,
            limit = page.limit,
            "translated list query"
        );

        Ok(Self {
            filters,
            projection,
            sort,
            page,
        })
    }

    /// The store query for this page
    pub fn page_query(&self) -> StoreQuery {
        StoreQuery {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            skip: self.page.skip(),
            limit: Some(self.page.limit),
        }
    }
}

fn parse_filter(key: &str, raw: &str, schema: &QuerySchema) -> ApiResult<FilterClause> {
    let (field, op) = match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((field, suffix)) => {
            let op = Comparison::from_suffix(suffix).ok_or_else(|| ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("unsupported operator '{}'", suffix),
            })?;
            (field, op)
        }
        None => (key, Comparison::Eq),
    };

    let spec = schema.spec(field).ok_or_else(|| ValidationError::UnknownField {
        field: field.to_string(),
    })?;

    let parse = |value: &str| {
        spec.kind
            .parse(value)
            .map_err(|message| ValidationError::InvalidValue {
                field: field.to_string(),
                message,
            })
    };

    let value = if op == Comparison::In {
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        FieldValue::List(items)
    } else {
        parse(raw)?
    };

    Ok(FilterClause {
        field: field.to_string(),
        op,
        value,
    })
}

fn parse_select(select: &str, schema: &QuerySchema) -> ApiResult<Option<Projection>> {
    let fields: Vec<String> = select
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if let Some(unknown) = fields.iter().find(|f| !schema.is_selectable(f)) {
        return Err(ValidationError::UnknownField {
            field: unknown.clone(),
        }
        .into());
    }
    Ok(Some(Projection::new(fields)))
}

fn parse_sort(sort: Option<&str>, schema: &QuerySchema) -> ApiResult<Vec<SortKey>> {
    let sort = sort.map(str::trim).filter(|s| !s.is_empty());
    let keys: Vec<SortKey> = sort
        .unwrap_or(DEFAULT_SORT)
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| match k.strip_prefix('-') {
            Some(field) => SortKey::desc(field),
            None => SortKey::asc(k),
        })
        .collect();
    if let Some(unknown) = keys.iter().find(|k| schema.spec(&k.field).is_none()) {
        return Err(ValidationError::UnknownField {
            field: unknown.field.clone(),
        }
        .into());
    }
    Ok(keys)
}
