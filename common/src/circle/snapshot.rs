//! Boundary parsing for problem state reported by the ledger.
//!
//! Remote values arrive loosely typed: integers may be JSON numbers,
//! decimal or `0x` hex strings, or ethers `BigNumber` objects, circles may
//! be objects or `[x, y, radius]` tuples, and the snapshot itself may be an
//! object or a `[seed, circles, max_circles, is_finished]` tuple.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use super::{Circle, CircleError};
use crate::utils::u256_to_hex;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ProblemSnapshot {
    pub seed: U256,
    pub circles: Vec<Circle>,
    pub max_circles: U256,
    pub is_finished: bool,
}

fn malformed(message: impl Into<String>) -> CircleError {
    CircleError::MalformedSnapshot(message.into())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Result<&'a Value, CircleError> {
    names
        .iter()
        .find_map(|name| map.get(*name))
        .ok_or_else(|| malformed(format!("missing field `{}`", names[0])))
}

fn parse_u256_str(field: &str, text: &str) -> Result<U256, CircleError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(malformed(format!("{field}: empty number")));
    }
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
    let parsed = match hex {
        Some(digits) => {
            if digits.is_empty() || digits.len() > 64 {
                return Err(malformed(format!("{field}: invalid hex length")));
            }
            U256::from_str_radix(digits, 16).map_err(|_| ())
        }
        None => U256::from_dec_str(text).map_err(|_| ()),
    };
    parsed.map_err(|_| malformed(format!("{field}: `{text}` is not a 256-bit unsigned integer")))
}

/// Parse one numeric ledger field.
pub fn parse_u256(field: &str, value: &Value) -> Result<U256, CircleError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| malformed(format!("{field}: {n} is not an unsigned integer"))),
        Value::String(s) => parse_u256_str(field, s),
        Value::Object(map) => {
            if let Some(tag) = map.get("type") {
                if tag.as_str() != Some("BigNumber") {
                    return Err(malformed(format!("{field}: unsupported object type {tag}")));
                }
            }
            match map.get("hex").or_else(|| map.get("_hex")) {
                Some(Value::String(s)) => parse_u256_str(field, s),
                _ => Err(malformed(format!("{field}: BigNumber without hex value"))),
            }
        }
        other => Err(malformed(format!("{field}: expected integer, got {}", kind(other)))),
    }
}

fn parse_bool(field: &str, value: &Value) -> Result<bool, CircleError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(malformed(format!("{field}: {n} is not a boolean"))),
        },
        Value::String(s) => match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(malformed(format!("{field}: `{s}` is not a boolean"))),
        },
        other => Err(malformed(format!("{field}: expected bool, got {}", kind(other)))),
    }
}

fn parse_circle(index: usize, value: &Value) -> Result<Circle, CircleError> {
    let field = |name: &str| format!("circles[{index}].{name}");
    match value {
        Value::Object(map) => Ok(Circle::new(
            parse_u256(&field("x"), lookup(map, &["x"])?)?,
            parse_u256(&field("y"), lookup(map, &["y"])?)?,
            parse_u256(&field("radius"), lookup(map, &["radius", "r"])?)?,
        )),
        Value::Array(items) if items.len() == 3 => Ok(Circle::new(
            parse_u256(&field("x"), &items[0])?,
            parse_u256(&field("y"), &items[1])?,
            parse_u256(&field("radius"), &items[2])?,
        )),
        Value::Array(items) => Err(malformed(format!(
            "circles[{index}]: expected 3 elements, got {}",
            items.len()
        ))),
        other => Err(malformed(format!(
            "circles[{index}]: expected object or tuple, got {}",
            kind(other)
        ))),
    }
}

fn parse_circles(value: &Value) -> Result<Vec<Circle>, CircleError> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_circle(index, item))
            .collect(),
        other => Err(malformed(format!("circles: expected array, got {}", kind(other)))),
    }
}

impl ProblemSnapshot {
    /// Parse a loosely structured ledger value. Only the shape is checked
    /// here; `ProblemState::configure` enforces the semantic invariants.
    pub fn from_value(value: &Value) -> Result<Self, CircleError> {
        match value {
            Value::Object(map) => Ok(Self {
                seed: parse_u256("seed", lookup(map, &["seed"])?)?,
                circles: parse_circles(lookup(map, &["circles"])?)?,
                max_circles: parse_u256("max_circles", lookup(map, &["max_circles", "maxCircles"])?)?,
                is_finished: parse_bool("is_finished", lookup(map, &["is_finished", "isFinished"])?)?,
            }),
            Value::Array(items) if items.len() == 4 => Ok(Self {
                seed: parse_u256("seed", &items[0])?,
                circles: parse_circles(&items[1])?,
                max_circles: parse_u256("max_circles", &items[2])?,
                is_finished: parse_bool("is_finished", &items[3])?,
            }),
            Value::Array(items) => Err(malformed(format!(
                "expected 4 tuple elements, got {}",
                items.len()
            ))),
            other => Err(malformed(format!("expected object or tuple, got {}", kind(other)))),
        }
    }

    /// Canonical object form with `0x` hex integers.
    pub fn to_value(&self) -> Value {
        let circles: Vec<Value> = self
            .circles
            .iter()
            .map(|c| {
                json!({
                    "x": u256_to_hex(&c.x),
                    "y": u256_to_hex(&c.y),
                    "radius": u256_to_hex(&c.radius),
                })
            })
            .collect();

        json!({
            "seed": u256_to_hex(&self.seed),
            "circles": circles,
            "max_circles": u256_to_hex(&self.max_circles),
            "is_finished": self.is_finished,
        })
    }
}

impl<'de> Deserialize<'de> for ProblemSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
