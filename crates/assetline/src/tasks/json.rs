// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! JSON task: every matching document is deep-merged into `merge.json`.
//!
//! Documents are merged in sorted path order. Objects merge key by key,
//! recursively. Any other value on a key collision is replaced by the value
//! from the later document, so the last document in path order wins.
//! Arrays are replaced, not concatenated.

use super::{read_text, Emitted, TaskContext};
use crate::error::{PipelineError, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// File name of the merged document.
pub const MERGED_FILE_NAME: &str = "merge.json";

fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Merges documents left to right; later documents win on collisions.
pub fn merge_documents<I>(documents: I) -> Value
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut merged = Map::new();
    for document in documents {
        merge_into(&mut merged, document);
    }
    Value::Object(merged)
}

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    if sources.is_empty() {
        return Ok(Vec::new());
    }

    let mut documents = Vec::with_capacity(sources.len());
    for source in sources {
        let text = read_text(source)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| PipelineError::Json {
            file: source.clone(),
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) => documents.push(map),
            other => {
                return Err(PipelineError::Json {
                    file: source.clone(),
                    message: format!("top-level value must be an object, found {}", kind_of(&other)),
                })
            }
        }
    }

    let merged = merge_documents(documents);
    let mut text = serde_json::to_string_pretty(&merged).map_err(|e| PipelineError::Json {
        file: PathBuf::from(MERGED_FILE_NAME),
        message: e.to_string(),
    })?;
    text.push('\n');

    let dest = ctx.spec.dest_dir(ctx.project.dist()).join(MERGED_FILE_NAME);
    Ok(vec![Emitted::new(dest, text)])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_distinct_keys_are_unioned() {
        let merged = merge_documents([object(json!({"a": 1})), object(json!({"b": 2}))]);
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_later_document_wins() {
        let merged = merge_documents([
            object(json!({"title": "first", "n": 1})),
            object(json!({"title": "second"})),
        ]);
        assert_eq!(merged, json!({"title": "second", "n": 1}));
    }

    #[test]
    fn test_nested_objects_merge_and_arrays_replace() {
        let merged = merge_documents([
            object(json!({"site": {"name": "x", "tags": [1, 2, 3]}})),
            object(json!({"site": {"url": "/", "tags": [9]}})),
        ]);
        assert_eq!(
            merged,
            json!({"site": {"name": "x", "tags": [9], "url": "/"}})
        );
    }

    #[test]
    fn test_object_replaces_scalar() {
        let merged = merge_documents([
            object(json!({"a": 1})),
            object(json!({"a": {"b": true}})),
        ]);
        assert_eq!(merged, json!({"a": {"b": true}}));
    }
}
