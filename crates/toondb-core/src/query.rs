//! TOONPath read-path engine: resolve, filter, project, sort, limit.
//!
//! Path resolution is strict — every segment must exist and every
//! intermediate value must be an object. Filters use loose equality for
//! `==`/`!=` (numbers and numeric strings compare equal) and numeric
//! coercion for the ordering operators; an uncoercible operand makes the
//! comparison false rather than an error. Results always come back as an
//! array, with scalar results wrapped.
//!
//! # Example
//! ```
//! use serde_json::json;
//! use toondb_core::query_toonpath;
//!
//! let data = json!({"products":[
//!     {"id":1,"price":10},
//!     {"id":2,"price":200},
//!     {"id":3,"price":50}
//! ]});
//! let hits = query_toonpath(&data, "products.price>20 sort:price:desc limit:1").unwrap();
//! assert_eq!(hits, vec![json!({"id":2,"price":200})]);
//! ```

use crate::error::QueryError;
use crate::path::{CompareOp, Literal};
use crate::toonpath::{parse_toonpath, FilterExpr, LogicalOp, SortOrder};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Execute a TOONPath query against a value tree.
///
/// # Errors
///
/// Fails on query syntax errors and on strict path resolution failures
/// (missing property, null or scalar intermediate). Filters, projection,
/// sort and limit never fail.
pub fn query_toonpath(data: &Value, query: &str) -> Result<Vec<Value>, QueryError> {
    let ast = parse_toonpath(query)?;
    let resolved = resolve_path(data, &ast.path)?;

    let Value::Array(items) = resolved else {
        // Scalar and object results pass through untouched, wrapped.
        return Ok(vec![resolved.clone()]);
    };
    let mut results: Vec<Value> = items.clone();

    if let Some(filter) = &ast.filters {
        results.retain(|item| evaluate_filter(item, filter));
    }
    if let Some(fields) = &ast.fields {
        results = select_fields(&results, fields);
    }
    if let Some(sort) = &ast.sort {
        sort_results(&mut results, &sort.field, sort.order);
    }
    if let Some(limit) = ast.limit {
        results.truncate(limit);
    }

    Ok(results)
}

/// Strict path resolution. No defaulting, no partial match.
pub(crate) fn resolve_path<'a>(data: &'a Value, path: &[String]) -> Result<&'a Value, QueryError> {
    let mut current = data;
    for segment in path {
        current = match current {
            Value::Null => {
                return Err(QueryError::NullAccess {
                    segment: segment.clone(),
                })
            }
            Value::Object(map) => map.get(segment).ok_or_else(|| QueryError::MissingProperty {
                segment: segment.clone(),
            })?,
            Value::Array(_) => {
                return Err(QueryError::MissingProperty {
                    segment: segment.clone(),
                })
            }
            _ => {
                return Err(QueryError::PrimitiveAccess {
                    segment: segment.clone(),
                })
            }
        };
    }
    Ok(current)
}

/// Mutable twin of [`resolve_path`], used by the write path.
pub(crate) fn resolve_path_mut<'a>(
    data: &'a mut Value,
    path: &[String],
) -> Result<&'a mut Value, QueryError> {
    let mut current = data;
    for segment in path {
        current = match current {
            Value::Null => {
                return Err(QueryError::NullAccess {
                    segment: segment.clone(),
                })
            }
            Value::Object(map) => {
                map.get_mut(segment)
                    .ok_or_else(|| QueryError::MissingProperty {
                        segment: segment.clone(),
                    })?
            }
            Value::Array(_) => {
                return Err(QueryError::MissingProperty {
                    segment: segment.clone(),
                })
            }
            _ => {
                return Err(QueryError::PrimitiveAccess {
                    segment: segment.clone(),
                })
            }
        };
    }
    Ok(current)
}

/// Evaluate a filter expression against one element. `and`/`or`
/// short-circuit per element.
pub(crate) fn evaluate_filter(item: &Value, filter: &FilterExpr) -> bool {
    match filter {
        FilterExpr::Comparison { field, op, value } => {
            if !item.is_object() && !item.is_array() {
                return false;
            }
            compare_field(field_of(item, field), *op, value)
        }
        FilterExpr::Logical { op, left, right } => match op {
            LogicalOp::And => evaluate_filter(item, left) && evaluate_filter(item, right),
            LogicalOp::Or => evaluate_filter(item, left) || evaluate_filter(item, right),
        },
        FilterExpr::In { field, values } => {
            if !item.is_object() && !item.is_array() {
                return false;
            }
            let fv = field_of(item, field);
            values.iter().any(|v| loose_eq(fv, v))
        }
    }
}

/// Named field of an element; arrays and scalars have none.
fn field_of<'a>(item: &'a Value, field: &str) -> Option<&'a Value> {
    item.as_object().and_then(|map| map.get(field))
}

/// Apply one comparison operator to a (possibly missing) field value.
pub(crate) fn compare_field(fv: Option<&Value>, op: CompareOp, lit: &Literal) -> bool {
    match op {
        CompareOp::Eq => loose_eq(fv, lit),
        CompareOp::Ne => !loose_eq(fv, lit),
        ordering => {
            let (Some(a), Some(b)) = (to_number(fv), lit_number(lit)) else {
                return false;
            };
            match ordering {
                CompareOp::Lt => a < b,
                CompareOp::Gt => a > b,
                CompareOp::Le => a <= b,
                CompareOp::Ge => a >= b,
                CompareOp::Eq | CompareOp::Ne => unreachable!(),
            }
        }
    }
}

/// Loose equality between a field value and a filter literal: same-type
/// compares exactly; across string/number/bool, both sides coerce to
/// numbers. Missing fields, nulls and composites never equal a literal.
pub(crate) fn loose_eq(fv: Option<&Value>, lit: &Literal) -> bool {
    let Some(fv) = fv else { return false };
    match (fv, lit) {
        (Value::String(a), Literal::Str(b)) => a == b,
        (Value::Number(a), Literal::Num(b)) => a.as_f64() == Some(*b),
        (Value::Bool(a), Literal::Bool(b)) => a == b,
        (Value::Null, _) => false,
        (Value::Array(_) | Value::Object(_), _) => false,
        _ => match (to_number(Some(fv)), lit_number(lit)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Strict equality between a field value and a selector literal: types
/// must match; numbers compare numerically.
pub(crate) fn strict_eq(fv: Option<&Value>, lit: &Literal) -> bool {
    match (fv, lit) {
        (Some(Value::String(a)), Literal::Str(b)) => a == b,
        (Some(Value::Number(a)), Literal::Num(b)) => a.as_f64() == Some(*b),
        (Some(Value::Bool(a)), Literal::Bool(b)) => a == b,
        _ => false,
    }
}

/// Numeric coercion: null is 0, booleans are 1/0, numeric strings parse,
/// everything else is uncoercible.
fn to_number(fv: Option<&Value>) -> Option<f64> {
    match fv? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn lit_number(lit: &Literal) -> Option<f64> {
    match lit {
        Literal::Num(n) => Some(*n),
        Literal::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Literal::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                t.parse::<f64>().ok()
            }
        }
    }
}

/// Projection: keep only the named fields of each object element, in the
/// order they were named. Missing fields are dropped silently; non-object
/// elements pass through unchanged.
fn select_fields(items: &[Value], fields: &[String]) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            let Value::Object(map) = item else {
                return item.clone();
            };
            let mut selected = Map::new();
            for field in fields {
                if let Some(v) = map.get(field) {
                    selected.insert(field.clone(), v.clone());
                }
            }
            Value::Object(selected)
        })
        .collect()
}

/// Stable sort by field. Object elements sort by the named field,
/// scalars by themselves. Null and missing keys sort last in ascending
/// order and first in descending order.
fn sort_results(items: &mut [Value], field: &str, order: SortOrder) {
    let asc = order == SortOrder::Asc;
    items.sort_by(|a, b| {
        let av = sort_key(a, field);
        let bv = sort_key(b, field);
        match (is_nullish(av), is_nullish(bv)) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if asc {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, true) => {
                if asc {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, false) => {
                let cmp = compare_sort_values(av.unwrap(), bv.unwrap());
                if asc {
                    cmp
                } else {
                    cmp.reverse()
                }
            }
        }
    });
}

fn sort_key<'a>(item: &'a Value, field: &str) -> Option<&'a Value> {
    match item {
        Value::Object(map) => map.get(field),
        Value::Array(_) => None,
        other => Some(other),
    }
}

fn is_nullish(v: Option<&Value>) -> bool {
    matches!(v, None | Some(Value::Null))
}

/// Strings compare case-insensitively with a case-sensitive tiebreak,
/// numbers numerically, anything else via string coercion.
fn compare_sort_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => collate(x, y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => collate(&coerce_string(a), &coerce_string(b)),
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn coerce_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => crate::encoder::format_number(n),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
