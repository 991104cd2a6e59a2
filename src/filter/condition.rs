use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    graph::GraphNode,
    values::{as_text, value_datetime},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logic {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    In,
    Contains,
    DateEquals,
    DateAfter,
    DateBefore,
    DateRange,
    #[serde(other)]
    Unknown,
}

/// Condition tree node: either a comparison on one field or a group of
/// nested conditions combined with AND/OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Group {
        logic: Logic,
        conditions: Vec<Condition>,
    },
    Leaf {
        field: String,
        operator: Operator,
        #[serde(default)]
        value: Value,
    },
}

impl Condition {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Leaf {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::Group {
            logic: Logic::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Group {
            logic: Logic::Or,
            conditions,
        }
    }

    /// Evaluates the tree against a node. A field the node does not define
    /// makes its leaf false.
    pub fn matches(&self, node: &GraphNode) -> bool {
        match self {
            Self::Group { logic, conditions } => match logic {
                Logic::And => conditions.iter().all(|c| c.matches(node)),
                Logic::Or => conditions.iter().any(|c| c.matches(node)),
            },
            Self::Leaf {
                field,
                operator,
                value,
            } => match field_value(node, field) {
                Some(actual) => compare(&actual, *operator, value),
                None => false,
            },
        }
    }
}

fn field_value(node: &GraphNode, field: &str) -> Option<Value> {
    match field {
        "id" => Some(Value::String(node.id.clone())),
        "label" => Some(Value::String(node.label.clone())),
        "name" => Some(Value::String(node.name.clone())),
        _ => {
            let key = field.strip_prefix("properties.").unwrap_or(field);
            node.properties
                .get(key)
                .filter(|v| !v.is_null())
                .cloned()
        }
    }
}

fn compare(actual: &Value, operator: Operator, expected: &Value) -> bool {
    match operator {
        Operator::Equals => text_eq(actual, expected),
        Operator::In => match expected {
            Value::Array(options) => options.iter().any(|o| text_eq(actual, o)),
            other => text_eq(actual, other),
        },
        Operator::Contains => contains(actual, expected),
        Operator::DateEquals => match (value_datetime(actual), value_datetime(expected)) {
            (Some(a), Some(b)) => a.date() == b.date(),
            _ => false,
        },
        Operator::DateAfter => match (value_datetime(actual), value_datetime(expected)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        Operator::DateBefore => match (value_datetime(actual), value_datetime(expected)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        Operator::DateRange => date_in_range(actual, expected),
        Operator::Unknown => {
            log::warn!("unknown filter operator, condition evaluates to false");
            false
        }
    }
}

fn text_eq(a: &Value, b: &Value) -> bool {
    match (as_text(a), as_text(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn contains(actual: &Value, needle: &Value) -> bool {
    if let Value::Array(items) = actual {
        return items.iter().any(|i| text_eq(i, needle));
    }
    match (as_text(actual), as_text(needle)) {
        (Some(hay), Some(needle)) => hay.to_lowercase().contains(&needle.to_lowercase()),
        _ => false,
    }
}

fn date_in_range(actual: &Value, range: &Value) -> bool {
    let Some(at) = value_datetime(actual) else {
        return false;
    };
    let (start, end) = match range {
        Value::Array(bounds) => (bounds.first(), bounds.get(1)),
        Value::Object(bounds) => (bounds.get("start"), bounds.get("end")),
        _ => return false,
    };
    let start = start.and_then(value_datetime);
    let end = end.and_then(value_datetime);
    if start.is_none() && end.is_none() {
        return false;
    }
    start.is_none_or(|s| at >= s) && end.is_none_or(|e| at <= e)
}
