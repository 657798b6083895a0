//! Normalization of raw model output into classification results.
//!
//! Local models do not reliably follow the output contract: replies may be
//! wrapped in prose, drop the `results` wrapper, skip items or invent fields.
//! Parsing happens in three steps:
//!
//! 1. Payload extraction: strict JSON first, then the outermost `{...}` span.
//! 2. Extraction: every candidate object is validated on its own; malformed
//!    candidates are logged and dropped.
//! 3. Reconciliation: the input batch is walked in order and every item gets
//!    either its extracted result or the fallback record.
//!
//! Only step 1 can fail the batch.

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{
    clamp_importance, Category, ClassificationResult, TodoItem, DEFAULT_IMPORTANCE,
};
use super::ClassifyError;
use crate::util::truncate_chars;

/// How much of the raw reply to keep in a parse error.
const EXCERPT_CHARS: usize = 200;

/// Parse a raw model reply into exactly one result per input todo, in order.
///
/// # Errors
///
/// Returns `ClassifyError::Parse` if no JSON value can be recovered from `raw`.
pub fn parse_response(
    raw: &str,
    todos: &[TodoItem],
) -> Result<Vec<ClassificationResult>, ClassifyError> {
    let payload = Payload::from_value(extract_json(raw)?);
    let extracted = extract_results(payload.into_candidates());
    Ok(reconcile(todos, &extracted))
}

/// Recover a JSON value from the reply, tolerating surrounding prose.
fn extract_json(raw: &str) -> Result<Value, ClassifyError> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    let parse_error = || ClassifyError::Parse {
        excerpt: truncate_chars(raw, EXCERPT_CHARS).to_string(),
    };

    let start = raw.find('{').ok_or_else(parse_error)?;
    let end = raw.rfind('}').ok_or_else(parse_error)?;
    if end < start {
        return Err(parse_error());
    }

    serde_json::from_str(&raw[start..=end]).map_err(|e| {
        debug!("Embedded JSON span did not parse: {}", e);
        parse_error()
    })
}

/// Shapes a reply is known to come back in.
#[derive(Debug)]
enum Payload {
    /// `{"results": [...]}` as requested.
    Wrapped(Vec<Value>),
    /// An object without a usable `results` array; its object values are
    /// taken as the results.
    Flattened(Map<String, Value>),
    /// A bare array of results.
    List(Vec<Value>),
    /// A string, number, bool or null. Nothing to extract.
    Scalar(Value),
}

impl Payload {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.get_mut("results") {
                    return Payload::Wrapped(std::mem::take(items));
                }
                Payload::Flattened(map)
            }
            Value::Array(items) => Payload::List(items),
            other => Payload::Scalar(other),
        }
    }

    fn into_candidates(self) -> Vec<Value> {
        match self {
            Payload::Wrapped(items) | Payload::List(items) => items,
            Payload::Flattened(map) => map
                .into_iter()
                .map(|(_, v)| v)
                .filter(Value::is_object)
                .collect(),
            Payload::Scalar(value) => {
                warn!(
                    "Model returned a bare JSON scalar, no results to extract: {}",
                    truncate_chars(&value.to_string(), EXCERPT_CHARS)
                );
                Vec::new()
            }
        }
    }
}

/// Why a single candidate was dropped.
#[derive(Debug, Error, PartialEq)]
enum MalformedItem {
    #[error("not a JSON object")]
    NotAnObject,
    #[error("missing id")]
    MissingId,
    #[error("id is not an integer")]
    InvalidId,
}

/// Validate candidates and index the survivors by id. Later duplicates win.
fn extract_results(candidates: Vec<Value>) -> HashMap<i64, ClassificationResult> {
    candidates
        .iter()
        .fold(HashMap::new(), |mut acc, candidate| {
            match extract_candidate(candidate) {
                Ok(result) => {
                    acc.insert(result.id, result);
                }
                Err(e) => warn!(
                    "Skipping malformed result item: {} ({})",
                    truncate_chars(&candidate.to_string(), EXCERPT_CHARS),
                    e
                ),
            }
            acc
        })
}

fn extract_candidate(candidate: &Value) -> Result<ClassificationResult, MalformedItem> {
    let obj = candidate.as_object().ok_or(MalformedItem::NotAnObject)?;

    let id = match obj.get("id") {
        None | Some(Value::Null) => return Err(MalformedItem::MissingId),
        Some(value) => coerce_id(value).ok_or(MalformedItem::InvalidId)?,
    };

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .and_then(Category::from_name)
        .unwrap_or(Category::Other);

    let importance = obj
        .get("importance")
        .and_then(coerce_integer)
        .map(clamp_importance)
        .unwrap_or(DEFAULT_IMPORTANCE);

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(ClassificationResult {
        id,
        category,
        importance,
        reasoning,
    })
}

/// Ids must be integral. `3.0` is accepted, `3.5` and `"3"` are not.
fn coerce_id(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= -(2f64.powi(63)) && *f < 2f64.powi(63))
            .map(|f| f as i64)
    })
}

/// Integers, fractional numbers (truncated) and numeric strings.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Walk the input batch, filling gaps with the fallback record.
fn reconcile(
    todos: &[TodoItem],
    extracted: &HashMap<i64, ClassificationResult>,
) -> Vec<ClassificationResult> {
    todos
        .iter()
        .map(|todo| match extracted.get(&todo.id) {
            Some(result) => result.clone(),
            None => {
                debug!("No result for todo {}, using fallback", todo.id);
                ClassificationResult::fallback(todo.id)
            }
        })
        .collect()
}
