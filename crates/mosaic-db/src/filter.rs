use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use thiserror::Error;

/// Base-record fields stored as columns rather than inside the JSON body.
const COLUMN_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// A filter named a field that is not a plain dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid filter field '{0}'")]
pub struct InvalidField(pub String);

/// Structural predicate over stored records.
///
/// Field names address the document body, with dots reaching into nested
/// payloads (`data.legal_name`). `id`, `created_at` and `updated_at` address
/// the base record. Each segment must be made of ASCII letters, digits and
/// `_`; see [`Filter::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Value),
    Ne(String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn all() -> Self {
        Filter::All
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Conjunction with another filter, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or(mut a), f) => {
                a.push(f);
                Filter::Or(a)
            }
            (a, b) => Filter::Or(vec![a, b]),
        }
    }

    /// Reject any field that is not `segment(.segment)*` over `[A-Za-z0-9_]`.
    ///
    /// Only validated paths can be compared reliably with [`Filter::mentions`].
    pub fn validate(&self) -> Result<(), InvalidField> {
        match self {
            Filter::All => Ok(()),
            Filter::Eq(f, _) | Filter::Ne(f, _) => {
                if is_plain_path(f) {
                    Ok(())
                } else {
                    Err(InvalidField(f.clone()))
                }
            }
            Filter::And(fs) | Filter::Or(fs) => fs.iter().try_for_each(Filter::validate),
        }
    }

    /// True if any predicate touches `field` or something nested under it.
    pub fn mentions(&self, field: &str) -> bool {
        match self {
            Filter::All => false,
            Filter::Eq(f, _) | Filter::Ne(f, _) => {
                f == field || f.strip_prefix(field).is_some_and(|rest| rest.starts_with('.'))
            }
            Filter::And(fs) | Filter::Or(fs) => fs.iter().any(|f| f.mentions(field)),
        }
    }

    /// Render as a SQL boolean expression, pushing bound values in order.
    pub(crate) fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        match self {
            Filter::All => "1".to_string(),
            Filter::Eq(field, Value::Null) => format!("{} IS NULL", field_expr(field, params)),
            Filter::Eq(field, value) => {
                let expr = field_expr(field, params);
                params.push(to_sql_value(value));
                format!("{} = ?", expr)
            }
            Filter::Ne(field, Value::Null) => format!("{} IS NOT NULL", field_expr(field, params)),
            Filter::Ne(field, value) => {
                // Missing fields count as "not equal", same as a document store would.
                let first = field_expr(field, params);
                let second = field_expr(field, params);
                params.push(to_sql_value(value));
                format!("({} IS NULL OR {} != ?)", first, second)
            }
            Filter::And(fs) => join(fs, " AND ", "1", params),
            Filter::Or(fs) => join(fs, " OR ", "0", params),
        }
    }
}

/// Ordering for `read_many`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sort {
    /// Oldest insert first.
    #[default]
    Insertion,
    /// Most recently updated first, newest insert breaking ties.
    NewestUpdated,
}

impl Sort {
    pub(crate) fn to_sql(self) -> &'static str {
        match self {
            Sort::Insertion => "seq ASC",
            Sort::NewestUpdated => "updated_at DESC, seq DESC",
        }
    }
}

fn is_plain_path(field: &str) -> bool {
    field.split('.').all(|segment| {
        !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

fn join(fs: &[Filter], sep: &str, empty: &str, params: &mut Vec<SqlValue>) -> String {
    if fs.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = fs.iter().map(|f| f.to_sql(params)).collect();
    format!("({})", parts.join(sep))
}

fn field_expr(field: &str, params: &mut Vec<SqlValue>) -> String {
    if COLUMN_FIELDS.contains(&field) {
        return field.to_string();
    }
    // Path is bound, never interpolated.
    params.push(SqlValue::Text(format!("$.{}", field)));
    "json_extract(body, ?)".to_string()
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
