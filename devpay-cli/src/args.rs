//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use devpay::{Operation, Params};
use serde_json::{Map, Value};

/// Issue one DevPayments API call and print the JSON reply.
#[derive(Debug, Parser)]
#[command(name = "devpay-cli", version, about)]
pub struct Cli {
    /// TOML client configuration file.
    #[arg(short, long, value_name = "FILE", env = "DEVPAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API endpoint.
    #[arg(long, value_name = "URL", env = "DEVPAY_API_URL")]
    pub api_url: Option<String>,

    /// Print server-reported errors as the response body instead of failing.
    #[arg(long)]
    pub no_raise: bool,

    /// Operation wire name, e.g. `execute_charge`.
    #[arg(value_parser = parse_operation)]
    pub operation: Operation,

    /// Parameters as `key=value`; dotted keys nest (`card.number=4242`).
    #[arg(value_parser = parse_assignment, value_name = "KEY=VALUE")]
    pub params: Vec<(String, Value)>,
}

fn parse_operation(raw: &str) -> Result<Operation, String> {
    raw.parse().map_err(|_| {
        let known: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
        format!("unknown operation '{raw}', expected one of: {}", known.join(", "))
    })
}

/// Splits `key=value`, typing the value.
///
/// Integers become numbers, `true`/`false` booleans, everything else a string.
/// Digits that would not print back identically (`012`, `+5`) stay strings so
/// CVCs and postal codes keep their leading zeros.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(format!("invalid parameter name '{key}'"));
    }
    Ok((key.to_owned(), typed_value(value)))
}

fn typed_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>()
        && n.to_string() == raw
    {
        return Value::from(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_owned()),
    }
}

/// Builds nested parameters from dotted assignments.
///
/// Later assignments to the same key win.
///
/// # Errors
///
/// Returns an error when a key is used both as a value and as a map.
pub fn build_params(assignments: &[(String, Value)]) -> Result<Params, String> {
    let mut root = Map::new();
    for (path, value) in assignments {
        let mut segments: Vec<&str> = path.split('.').collect();
        let leaf = segments.pop().unwrap_or_default();

        let mut node = &mut root;
        for segment in segments {
            let entry =
                node.entry(segment.to_owned()).or_insert_with(|| Value::Object(Map::new()));
            node = entry.as_object_mut().ok_or_else(|| {
                format!("'{segment}' is set to a value and cannot also hold '{path}'")
            })?;
        }

        if node.get(leaf).is_some_and(Value::is_object) {
            return Err(format!("'{path}' already holds nested parameters"));
        }
        node.insert(leaf.to_owned(), value.clone());
    }
    Ok(Params::from(root))
}
