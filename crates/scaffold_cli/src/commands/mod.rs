pub mod copy_cmd;
pub mod update_cmd;

use std::collections::HashMap;

use serde_json::Value;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// Parses a `KEY=VALUE` pair into a typed [`Value`]: `true`/`false` become
/// booleans, anything that parses as an `i64` or `f64` becomes a number,
/// everything else is kept as a string.
pub fn parse_data_arg(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{raw}`"))?;
    Ok((key.to_string(), coerce_data_value(value)))
}

fn coerce_data_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<f64>().map(json_number))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

fn json_number(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

pub fn data_args_to_map(pairs: &[(String, Value)]) -> HashMap<String, Value> {
    pairs.iter().cloned().collect()
}
