//! Upgrades older document shapes to the canonical schema.
//!
//! Earlier writers stored facts as bare strings, keyed conversations as
//! `user_input`/`ai_response`, wrote vocabulary entries without `topics`,
//! and used `YYYY-MM-DD HH:MM:SS.ffffff` timestamps. All of that is
//! rewritten here before typed deserialization. Learned document bodies
//! under `documents` are carried through.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::facts::Topic;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Rewrite a raw document into the canonical shape.
///
/// Missing or mistyped sections are replaced with empty ones; everything
/// else is preserved.
pub(crate) fn upgrade(value: Value, now: DateTime<Utc>) -> Value {
    let Value::Object(mut root) = value else {
        return Value::Object(Map::new());
    };

    let facts = root.remove("facts");
    root.insert("facts".into(), upgrade_facts(facts, now));

    let vocabulary = root.remove("vocabulary");
    root.insert("vocabulary".into(), upgrade_vocabulary(vocabulary));

    if !matches!(root.get("relationships"), Some(Value::Object(_))) {
        root.insert("relationships".into(), Value::Object(Map::new()));
    }

    for key in ["conversations", "conversation_memory"] {
        let turns = root.remove(key);
        root.insert(key.into(), upgrade_turns(turns, now));
    }

    if let Some(documents) = root.remove("documents") {
        root.insert("documents".into(), upgrade_documents(documents));
    }

    if root.get("personality").is_some_and(|p| !p.is_object()) {
        root.remove("personality");
    }

    let last_updated = normalize_timestamp(root.get("last_updated"), now);
    root.insert("last_updated".into(), last_updated);

    Value::Object(root)
}

fn upgrade_facts(facts: Option<Value>, now: DateTime<Utc>) -> Value {
    let Some(Value::Object(facts)) = facts else {
        return Value::Object(Map::new());
    };

    let mut upgraded = Map::new();
    for (topic, records) in facts {
        let Value::Array(records) = records else {
            continue;
        };

        // Keys that only differ by case or padding merge into one topic.
        let key = Topic::new(&topic).to_string();
        let Value::Array(target) = upgraded
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
        else {
            continue;
        };

        for record in records {
            let record = match record {
                Value::String(text) => json!({
                    "text": text,
                    "timestamp": now.to_rfc3339(),
                    "confidence": 1.0,
                }),
                Value::Object(mut record) if record.get("text").is_some_and(Value::is_string) => {
                    let timestamp = normalize_timestamp(record.get("timestamp"), now);
                    record.insert("timestamp".into(), timestamp);
                    Value::Object(record)
                }
                _ => continue,
            };

            // A topic holds each exact text once; the first record wins.
            if !target.iter().any(|existing| existing["text"] == record["text"]) {
                target.push(record);
            }
        }
    }

    Value::Object(upgraded)
}

/// Keep `name -> body` pairs whose body is text; anything else is dropped
/// with a warning so the loss is visible.
fn upgrade_documents(documents: Value) -> Value {
    let Value::Object(documents) = documents else {
        warn!("discarding non-object documents section");
        return Value::Object(Map::new());
    };

    let upgraded = documents
        .into_iter()
        .filter(|(name, body)| {
            let keep = body.is_string();
            if !keep {
                warn!(document = %name, "discarding document without a text body");
            }
            keep
        })
        .collect();

    Value::Object(upgraded)
}

fn upgrade_vocabulary(vocabulary: Option<Value>) -> Value {
    let Some(Value::Object(vocabulary)) = vocabulary else {
        return Value::Object(Map::new());
    };

    let upgraded = vocabulary
        .into_iter()
        .map(|(word, entry)| {
            let entry = match entry {
                Value::Object(mut entry) => {
                    if !entry.get("topics").is_some_and(Value::is_array) {
                        entry.insert("topics".into(), json!([]));
                    }
                    if !entry.get("count").is_some_and(Value::is_u64) {
                        entry.insert("count".into(), json!(0));
                    }
                    Value::Object(entry)
                }
                Value::Number(count) if count.is_u64() => json!({ "topics": [], "count": count }),
                _ => json!({ "topics": [], "count": 0 }),
            };
            (word, entry)
        })
        .collect();

    Value::Object(upgraded)
}

fn upgrade_turns(turns: Option<Value>, now: DateTime<Utc>) -> Value {
    let Some(Value::Array(turns)) = turns else {
        return Value::Array(Vec::new());
    };

    let upgraded = turns
        .into_iter()
        .filter_map(|turn| {
            let Value::Object(mut turn) = turn else {
                return None;
            };
            if let Some(user) = turn.remove("user_input") {
                turn.entry("user").or_insert(user);
            }
            if let Some(ai) = turn.remove("ai_response") {
                turn.entry("ai").or_insert(ai);
            }
            if !turn.get("user").is_some_and(Value::is_string)
                || !turn.get("ai").is_some_and(Value::is_string)
            {
                return None;
            }
            let timestamp = normalize_timestamp(turn.get("timestamp"), now);
            turn.insert("timestamp".into(), timestamp);
            Some(Value::Object(turn))
        })
        .collect();

    Value::Array(upgraded)
}

/// Parse RFC 3339 or naive legacy timestamps; anything else becomes `now`.
fn normalize_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> Value {
    let parsed = value.and_then(Value::as_str).and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(|naive| naive.and_utc())
            })
    });

    Value::String(parsed.unwrap_or(now).to_rfc3339())
}
