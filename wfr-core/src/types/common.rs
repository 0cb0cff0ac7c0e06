use std::collections::BTreeMap;

pub type AnyValue = serde_json::Value;

/// Properties we do not model explicitly.
///
/// Providers attach arbitrary extra fields to almost every object in a message; they are
/// captured here so they survive a round trip through the runner untouched.
pub type Extensions = BTreeMap<String, serde_json::Value>;
