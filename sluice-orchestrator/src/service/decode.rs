//! Config decoder
//!
//! Turns a submitted document into a typed [`Config`]. Both encodings are
//! parsed into a generic tree first so the top-level keys can be checked
//! against the known schema before the typed decode runs; nested structures
//! are checked by the types themselves.
//!
//! YAML additionally coerces scalars found in task `params` to strings, since
//! authors routinely write `DEBUG: true` or `RETRIES: 3` there. YAML mapping
//! keys that are scalars but not strings (`1: a`, `true: x`) are rewritten to
//! their text so opaque `source` and `params` trees survive the trip into
//! JSON-shaped values.

use sluice_core::domain::config::{Config, RawConfig};
use sluice_core::dto::config::ContentKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Carries the parser's complaint for logging; callers only see the
    /// generic message.
    #[error("malformed config")]
    Malformed { detail: String },

    /// Sorted names of top-level keys outside the schema
    #[error("{}", unknown_keys_message(.0))]
    UnknownKeys(Vec<String>),
}

impl DecodeError {
    pub fn malformed(detail: impl ToString) -> Self {
        DecodeError::Malformed {
            detail: detail.to_string(),
        }
    }
}

/// A decoded document together with its exact text
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub config: Config,
    pub raw_config: RawConfig,
}

/// Decode `body` as a config document of the given kind
pub fn decode(body: &[u8], kind: ContentKind) -> Result<Decoded, DecodeError> {
    let text = std::str::from_utf8(body).map_err(DecodeError::malformed)?;

    if text.trim().is_empty() {
        return Err(DecodeError::malformed("empty document"));
    }

    let config = match kind {
        ContentKind::Json => decode_json(text)?,
        ContentKind::Yaml => decode_yaml(text)?,
    };

    Ok(Decoded {
        config,
        raw_config: RawConfig(text.to_string()),
    })
}

fn decode_json(text: &str) -> Result<Config, DecodeError> {
    let tree: serde_json::Value = serde_json::from_str(text).map_err(DecodeError::malformed)?;

    let serde_json::Value::Object(fields) = &tree else {
        return Err(DecodeError::malformed("document is not a mapping"));
    };
    check_top_level_keys(fields.keys().map(String::as_str))?;

    serde_json::from_value(tree).map_err(DecodeError::malformed)
}

fn decode_yaml(text: &str) -> Result<Config, DecodeError> {
    let mut tree: serde_yaml::Value = serde_yaml::from_str(text).map_err(DecodeError::malformed)?;
    tree.apply_merge().map_err(DecodeError::malformed)?;

    let serde_yaml::Value::Mapping(fields) = &tree else {
        return Err(DecodeError::malformed("document is not a mapping"));
    };
    let keys = fields
        .iter()
        .map(|(key, _)| {
            key.as_str()
                .ok_or_else(|| DecodeError::malformed("top-level key is not a string"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_top_level_keys(keys)?;

    stringify_keys(&mut tree);
    coerce_task_params(&mut tree);

    serde_yaml::from_value(tree).map_err(DecodeError::malformed)
}

fn check_top_level_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<(), DecodeError> {
    let mut unknown: Vec<String> = keys
        .into_iter()
        .filter(|key| !Config::TOP_LEVEL_KEYS.contains(key))
        .map(str::to_string)
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort();
    Err(DecodeError::UnknownKeys(unknown))
}

fn unknown_keys_message(keys: &[String]) -> String {
    let mut message = String::from("unknown/extra keys:\n");
    for key in keys {
        message.push_str("  - ");
        message.push_str(key);
        message.push('\n');
    }
    message
}

/// Stringify bool and number leaves under `jobs[*].plan[*].config.params` of
/// task steps. Anything the walk does not recognize is left for the typed
/// decode to accept or reject.
fn coerce_task_params(tree: &mut serde_yaml::Value) {
    use serde_yaml::Value;

    let Some(jobs) = tree.get_mut("jobs").and_then(Value::as_sequence_mut) else {
        return;
    };

    for job in jobs {
        let Some(plan) = job.get_mut("plan").and_then(Value::as_sequence_mut) else {
            continue;
        };

        for step in plan.iter_mut().filter(|step| step.get("task").is_some()) {
            let Some(params) = step
                .get_mut("config")
                .and_then(|config| config.get_mut("params"))
                .and_then(Value::as_mapping_mut)
            else {
                continue;
            };

            for value in params.values_mut() {
                let text = match value {
                    Value::Null => String::new(),
                    Value::Bool(flag) => flag.to_string(),
                    Value::Number(number) => match number_text(number) {
                        Some(text) => text,
                        None => continue,
                    },
                    _ => continue,
                };
                *value = Value::String(text);
            }
        }
    }
}

/// Rewrite scalar mapping keys to strings, at every depth
///
/// Keys inside typed parts of the schema that this turns into strings are
/// still rejected by the typed decode as unknown fields.
fn stringify_keys(tree: &mut serde_yaml::Value) {
    use serde_yaml::Value;

    match tree {
        Value::Mapping(mapping) => {
            let entries = std::mem::take(mapping);
            for (key, mut value) in entries {
                stringify_keys(&mut value);
                let text = match &key {
                    Value::Null => Some("null".to_string()),
                    Value::Bool(flag) => Some(flag.to_string()),
                    Value::Number(number) => number_text(number),
                    _ => None,
                };
                mapping.insert(text.map(Value::String).unwrap_or(key), value);
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(stringify_keys),
        Value::Tagged(tagged) => stringify_keys(&mut tagged.value),
        _ => {}
    }
}

/// Canonical text of a YAML number
///
/// Whole-valued floats lose their fraction (`1.0` is `"1"`, `1e3` is
/// `"1000"`). Infinities and NaN have no text form and stay numbers.
fn number_text(number: &serde_yaml::Number) -> Option<String> {
    if let Some(int) = number.as_i64() {
        return Some(int.to_string());
    }
    if let Some(uint) = number.as_u64() {
        return Some(uint.to_string());
    }
    number
        .as_f64()
        .filter(|float| float.is_finite())
        .map(|float| float.to_string())
}
