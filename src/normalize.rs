use serde_json::Value;
use tracing::warn;

use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::errors::EngineError;
use crate::types::ResourceKind;

/// unwrap an upstream payload into an ordered list of records.
///
/// the api wraps collections inconsistently: a bare array, a paginated
/// `{results: [...]}` envelope, a resource-named key (`{deposits: [...]}`),
/// or occasionally a single record. the rules below are tried in order and
/// the first match wins; `results` must be checked before the sole-array
/// probe so a paginated envelope with `count`/`next` scalars alongside it
/// cannot be misread.
pub fn normalize(value: Value, resource: ResourceKind) -> Result<Vec<Value>, EngineError> {
    let map = match value {
        // rule 1: already a sequence
        Value::Array(records) => return Ok(records),
        Value::Object(map) => map,
        _ => return Err(EngineError::UnexpectedShape { resource }),
    };

    // rule 2: paginated envelope
    if let Some(Value::Array(records)) = map.get("results") {
        return Ok(records.clone());
    }

    // rule 3: resource-named key
    for key in resource.collection_keys() {
        if let Some(Value::Array(records)) = map.get(*key) {
            return Ok(records.clone());
        }
    }

    // rule 4: a singular record returned where a collection was expected
    if map.contains_key("id") {
        return Ok(vec![Value::Object(map)]);
    }

    // rule 5: exactly one field holding a sequence
    let mut arrays = map.values().filter(|v| v.is_array());
    if let (Some(Value::Array(records)), None) = (arrays.next(), arrays.next()) {
        return Ok(records.clone());
    }

    // rule 6: nothing matched
    Err(EngineError::UnexpectedShape { resource })
}

/// degrading wrapper: an unrecognized shape yields an empty list, logged
/// and flagged, never an error
pub fn normalize_or_empty(
    value: Value,
    resource: ResourceKind,
    diagnostics: &mut DiagnosticLog,
) -> Vec<Value> {
    match normalize(value, resource) {
        Ok(records) => records,
        Err(_) => {
            warn!(%resource, "response matched no known envelope shape");
            diagnostics.emit(Diagnostic::ShapeFailure { resource });
            Vec::new()
        }
    }
}
