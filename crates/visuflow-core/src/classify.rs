//! Value kind classification shared by the transformer and renderers

use serde_json::Value;

use crate::model::NodeKind;

/// Classify a value as object, array, or primitive.
///
/// `null` is a primitive leaf even though it sits where a container could.
pub fn classify(value: &Value) -> NodeKind {
    match value {
        Value::Array(_) => NodeKind::Array,
        Value::Object(_) => NodeKind::Object,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => NodeKind::Primitive,
    }
}

/// Iterate a value's entries in natural order: insertion order for objects,
/// index order for arrays (labelled by decimal index). Primitives have none.
pub fn entries(value: &Value) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
    match value {
        Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.clone(), v))),
        Value::Array(items) => Box::new(items.iter().enumerate().map(|(i, v)| (i.to_string(), v))),
        _ => Box::new(std::iter::empty()),
    }
}
