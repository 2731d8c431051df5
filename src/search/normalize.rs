use chrono::{DateTime, SecondsFormat};
use serde_json::Value;
use std::collections::HashSet;

use crate::models::DocumentRecord;
use crate::store::CollectionKind;

/// Merge per-collection raw batches into typed records: unique by identity
/// (first occurrence wins), null fields pruned, dates rendered as ISO-8601
/// strings, article numbers stringified, delimited keyword strings split.
///
/// The whole pass is idempotent: feeding already-normalized records back
/// through changes nothing.
pub fn normalize(batches: Vec<(CollectionKind, Vec<Value>)>) -> Vec<DocumentRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for (collection, docs) in batches {
        for mut doc in docs {
            scrub(&mut doc);

            let Some(id) = doc.get("id").and_then(Value::as_str) else {
                tracing::warn!(
                    collection = collection.name(),
                    "skipping document without identity"
                );
                continue;
            };
            if !seen.insert(id.to_string()) {
                continue;
            }

            match to_record(collection, doc) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        collection = collection.name(),
                        "skipping malformed document: {e}"
                    );
                }
            }
        }
    }

    records
}

fn to_record(collection: CollectionKind, doc: Value) -> serde_json::Result<DocumentRecord> {
    Ok(match collection {
        CollectionKind::Notice => DocumentRecord::Notice(serde_json::from_value(doc)?),
        CollectionKind::Instruction => DocumentRecord::Instruction(serde_json::from_value(doc)?),
        CollectionKind::Regulation => {
            DocumentRecord::RegulationSection(serde_json::from_value(doc)?)
        }
    })
}

/// Field-level cleanup of a raw document, applied recursively so article
/// and affected-entity sub-records get the same treatment.
pub fn scrub(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for (key, v) in map.iter_mut() {
                match key.as_str() {
                    "issue_date" => {
                        if let Some(iso) = epoch_to_iso(v) {
                            *v = Value::String(iso);
                        }
                    }
                    "keywords" => {
                        if let Value::String(s) = v {
                            *v = split_keywords(s);
                        }
                    }
                    // article numbers may be stored numerically
                    "number" => {
                        if let Value::Number(n) = v {
                            *v = Value::String(n.to_string());
                        }
                    }
                    _ => {}
                }
                scrub(v);
            }
        }
        Value::Array(items) => {
            for item in items {
                scrub(item);
            }
        }
        _ => {}
    }
}

/// Epoch milliseconds → RFC 3339. Date strings pass through untouched:
/// they are already ISO-8601 in the store.
fn epoch_to_iso(value: &Value) -> Option<String> {
    let millis = value.as_i64()?;
    let dt = DateTime::from_timestamp_millis(millis)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn split_keywords(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Value::String(t.to_string()))
            .collect(),
    )
}
