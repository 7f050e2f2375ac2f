//! Structural comparison of attribute maps.

use serde_json::Value;
use tracing::debug;

use crate::types::Options;

/// Datasource option keys the server masks on read.
pub const SECRET_FIELDS: &[&str] = &["password"];

/// Returns true when `observed` matches `desired`, ignoring keys in `exclude`.
///
/// Maps of different sizes are never equal. Every non-excluded key of
/// `desired` must exist in `observed` with an equal value; nested objects
/// are compared with the same rules and exclusions.
#[must_use]
pub fn structurally_equal(desired: &Options, observed: &Options, exclude: &[&str]) -> bool {
    if desired.len() != observed.len() {
        debug!(
            desired = desired.len(),
            observed = observed.len(),
            "maps have different number of keys"
        );
        return false;
    }

    for (key, wanted) in desired {
        if exclude.contains(&key.as_str()) {
            continue;
        }
        let Some(actual) = observed.get(key) else {
            debug!(%key, "key missing from observed map");
            return false;
        };
        if !values_equal(wanted, actual, exclude) {
            debug!(%key, %wanted, %actual, "values differ");
            return false;
        }
    }

    true
}

fn values_equal(wanted: &Value, actual: &Value, exclude: &[&str]) -> bool {
    match (wanted, actual) {
        (Value::Object(a), Value::Object(b)) => structurally_equal(a, b, exclude),
        _ => wanted == actual,
    }
}
