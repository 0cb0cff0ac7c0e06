use crate::error::ParseError;
use crate::types::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub query: Query,
    pub format: DocumentFormat,
}

pub fn parse_query_str(input: &str, format: DocumentFormat) -> Result<ParsedQuery, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    match format {
        DocumentFormat::Json => Ok(ParsedQuery {
            query: from_json(serde_json::from_str(input)?)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedQuery {
            query: from_json(serde_yaml::from_str(input)?)?,
            format,
        }),
        DocumentFormat::Auto => parse_query_auto(input),
    }
}

fn parse_query_auto(input: &str) -> Result<ParsedQuery, ParseError> {
    // JSON always starts with `{` after trimming; anything else is treated as YAML first.
    if input.trim_start().starts_with('{') {
        return match serde_json::from_str::<serde_json::Value>(input) {
            Ok(value) => Ok(ParsedQuery {
                query: from_json(value)?,
                format: DocumentFormat::Json,
            }),
            Err(e) => Err(ParseError::Json(e)),
        };
    }

    let value = serde_yaml::from_str::<serde_json::Value>(input)?;
    Ok(ParsedQuery {
        query: from_json(value)?,
        format: DocumentFormat::Yaml,
    })
}

fn from_json(value: serde_json::Value) -> Result<Query, ParseError> {
    Ok(serde_json::from_value(drop_nulls(value))?)
}

/// Recursively remove null-valued object properties.
///
/// Null entries inside arrays are kept; only keys whose value is `null` are dropped.
pub fn drop_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(drop_nulls).collect())
        }
        other => other,
    }
}
