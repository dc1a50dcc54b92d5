use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo, WhereNode};

/// Where-clause parser and evaluator for JSON records.
///
/// Relationship fields may hold either a bare id or an expanded record; both
/// compare by id. Array fields match when any element matches.
pub struct FilterWhere;

impl FilterWhere {
    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        if where_data.is_null() { return Ok(()); }
        match where_data {
            Value::Object(_) => Self::parse(where_data).map(|_| ()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    pub fn parse(where_data: &Value) -> Result<WhereNode, FilterError> {
        match where_data {
            Value::Null => Ok(WhereNode::And(vec![])),
            Value::Object(obj) => {
                let mut nodes = Vec::with_capacity(obj.len());
                for (key, value) in obj {
                    if key.starts_with('$') {
                        nodes.push(Self::parse_logical_operator(key, value)?);
                    } else {
                        nodes.extend(Self::parse_field_condition(key, value)?);
                    }
                }
                Ok(if nodes.len() == 1 { nodes.remove(0) } else { WhereNode::And(nodes) })
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<WhereNode, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value.as_array().ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let children = arr.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" { WhereNode::And(children) } else { WhereNode::Or(children) })
            }
            "$not" => Ok(WhereNode::Not(Box::new(Self::parse(value)?))),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
        Self::validate_field_name(field)?;

        match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => {
                let mut nodes = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = Self::map_operator(op_key)?;
                    Self::validate_operator_data(operator, op_val)?;
                    nodes.push(WhereNode::Condition(FilterWhereInfo {
                        column: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    }));
                }
                Ok(nodes)
            }
            // Implicit equality: { field: value }
            _ => Ok(vec![WhereNode::Condition(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            })]),
        }
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" | "equals" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$exists" => FilterOp::Exists,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn validate_operator_data(operator: FilterOp, data: &Value) -> Result<(), FilterError> {
        match operator {
            FilterOp::In | FilterOp::NIn if !data.is_array() => {
                Err(FilterError::InvalidOperatorData(format!("{:?} requires array", operator)))
            }
            FilterOp::Exists if !data.is_boolean() => {
                Err(FilterError::InvalidOperatorData("$exists requires boolean".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn validate_field_name(field: &str) -> Result<(), FilterError> {
        let mut chars = field.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(FilterError::InvalidField(field.to_string())),
        }
        if chars.all(|c| c.is_alphanumeric() || c == '_') {
            Ok(())
        } else {
            Err(FilterError::InvalidField(field.to_string()))
        }
    }

    /// Evaluate a parsed where-clause against a record
    pub fn matches(node: &WhereNode, record: &Map<String, Value>) -> bool {
        match node {
            WhereNode::And(children) => children.iter().all(|c| Self::matches(c, record)),
            WhereNode::Or(children) => children.iter().any(|c| Self::matches(c, record)),
            WhereNode::Not(child) => !Self::matches(child, record),
            WhereNode::Condition(condition) => Self::matches_condition(condition, record),
        }
    }

    fn matches_condition(condition: &FilterWhereInfo, record: &Map<String, Value>) -> bool {
        let field = record.get(&condition.column).unwrap_or(&Value::Null);

        match condition.operator {
            FilterOp::Exists => {
                let wanted = condition.data.as_bool().unwrap_or(true);
                wanted == !field.is_null()
            }
            FilterOp::Eq => Self::any_candidate(field, |v| Self::values_equal(v, &condition.data)),
            FilterOp::Ne => !Self::any_candidate(field, |v| Self::values_equal(v, &condition.data)),
            FilterOp::In => {
                let options = condition.data.as_array().map(Vec::as_slice).unwrap_or(&[]);
                Self::any_candidate(field, |v| options.iter().any(|o| Self::values_equal(v, o)))
            }
            FilterOp::NIn => {
                let options = condition.data.as_array().map(Vec::as_slice).unwrap_or(&[]);
                !Self::any_candidate(field, |v| options.iter().any(|o| Self::values_equal(v, o)))
            }
            FilterOp::Gt => Self::any_candidate(field, |v| Self::compare(v, &condition.data) == Some(Ordering::Greater)),
            FilterOp::Gte => Self::any_candidate(field, |v| matches!(Self::compare(v, &condition.data), Some(Ordering::Greater | Ordering::Equal))),
            FilterOp::Lt => Self::any_candidate(field, |v| Self::compare(v, &condition.data) == Some(Ordering::Less)),
            FilterOp::Lte => Self::any_candidate(field, |v| matches!(Self::compare(v, &condition.data), Some(Ordering::Less | Ordering::Equal))),
            FilterOp::And | FilterOp::Or | FilterOp::Not => false,
        }
    }

    fn any_candidate(field: &Value, mut predicate: impl FnMut(&Value) -> bool) -> bool {
        match field {
            Value::Array(items) => items.iter().any(|item| predicate(Self::normalize(item))),
            other => predicate(Self::normalize(other)),
        }
    }

    /// Expanded relationship records compare by their id
    fn normalize(value: &Value) -> &Value {
        match value {
            Value::Object(obj) => obj.get("id").unwrap_or(value),
            other => other,
        }
    }

    fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
            _ => a == Self::normalize(b),
        }
    }

    pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }
}
