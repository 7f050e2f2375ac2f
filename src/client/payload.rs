use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::Transport;
use crate::error::Result;

/// A read response, classified once so callers never sniff JSON shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Nothing usable: an empty body, or an error body such as
    /// `{"message": "Not found"}` where a record was expected.
    Empty,
    Single(Value),
    Collection(Vec<Value>),
}

impl Payload {
    #[must_use]
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Collection(items),
            Value::Object(map) => {
                if map.contains_key("message") && !map.contains_key("id") {
                    debug!(message = %map["message"], "server answered with an error body");
                    Self::Empty
                } else {
                    Self::Single(Value::Object(map))
                }
            }
            _ => Self::Empty,
        }
    }

    /// Flattens the payload into a list of records.
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(value) => vec![value],
            Self::Collection(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    count: u64,
    #[serde(default)]
    page_size: u64,
    #[serde(default)]
    results: Vec<Value>,
}

fn is_paginated(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("count") && map.contains_key("results"))
}

/// Reads `path`, following pagination when the first response is a
/// `{count, page_size, results}` envelope.
///
/// Pages are requested as `page = 2, 3, ...` until the running total
/// (advanced by `page_size` per page) reaches `count`. Every page is kept
/// whole and in arrival order.
pub fn read_all<T: Transport + ?Sized>(transport: &T, path: &str) -> Result<Payload> {
    let first = transport.get(path, None)?;
    if !is_paginated(&first) {
        let payload = Payload::classify(first);
        debug!(path, ?payload, "received from wire");
        return Ok(payload);
    }

    let mut envelope: PageEnvelope = serde_json::from_value(first)?;
    let count = envelope.count;
    let mut results = Vec::new();
    let mut consumed = 0;
    let mut page = 1;

    loop {
        let fetched = envelope.results.len() as u64;
        consumed += if envelope.page_size > 0 {
            envelope.page_size
        } else {
            fetched
        };
        results.append(&mut envelope.results);

        if consumed >= count {
            break;
        }
        if fetched == 0 {
            warn!(path, page, count, "server returned an empty page before reaching count");
            break;
        }

        page += 1;
        debug!(path, page, "requesting next page");
        envelope = serde_json::from_value(transport.get(path, Some(page))?)?;
    }

    debug!(path, count, received = results.len(), "accumulated paginated results");
    Ok(Payload::Collection(results))
}
