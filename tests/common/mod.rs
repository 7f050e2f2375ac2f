#![allow(dead_code)]

pub mod fake_api;

pub use fake_api::{Call, FakeRedash};

use redash_converge::types::Options;
use serde_json::Value;

pub fn options(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
