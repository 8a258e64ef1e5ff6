//! Orders segment decoding. Total: malformed input yields an empty document.

use serde_json::{Map, Value};
use soapnote_core::OrdersDocument;

use crate::diagnostics::{Decoded, FieldDiagnostic};
use crate::sanitize::decode_literal;

pub fn parse_orders(text: &str) -> OrdersDocument {
    parse_orders_reporting(text, &mut Vec::new())
}

pub fn parse_orders_reporting(text: &str, diagnostics: &mut Vec<FieldDiagnostic>) -> OrdersDocument {
    decode_orders(text).collapse("orders", diagnostics)
}

pub fn decode_orders(text: &str) -> Decoded<OrdersDocument> {
    if text.trim().is_empty() {
        return Decoded::Absent;
    }

    let start = text.find(|c: char| c == '[' || c == '{');
    let end = text.rfind(|c: char| c == ']' || c == '}');
    let (Some(start), Some(end)) = (start, end) else {
        return Decoded::Defaulted("no list or object".to_string());
    };
    if end < start {
        return Decoded::Defaulted("no list or object".to_string());
    }

    let value = match decode_literal(&text[start..=end]) {
        Ok(value) => value,
        Err(err) => return Decoded::Defaulted(err.to_string()),
    };

    match value {
        Value::Array(orders) => Decoded::Parsed(OrdersDocument {
            orders,
            confirmed: true,
            extra: Map::new(),
        }),
        Value::Object(map) if map.contains_key("orders") => Decoded::Parsed(from_object(map)),
        _ => Decoded::Defaulted("unrecognized orders shape".to_string()),
    }
}

fn from_object(mut map: Map<String, Value>) -> OrdersDocument {
    let orders = match map.remove("orders") {
        Some(Value::Array(orders)) => orders,
        Some(Value::Object(single)) => vec![Value::Object(single)],
        _ => Vec::new(),
    };
    let confirmed = map
        .remove("confirmed")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    OrdersDocument {
        orders,
        confirmed,
        extra: map,
    }
}
