use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["created_at desc", "filename asc"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => return Err(FilterError::InvalidOrder(other.to_string())),
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "created_at": "desc", "filename": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    out.push(FilterOrderInfo { column: k.clone(), sort: Self::parse_direction(v.as_str().unwrap_or("asc"))? });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOrder(other.to_string())),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                // Leading '-' is shorthand for descending
                let (col, dir) = match col.strip_prefix('-') {
                    Some(stripped) => (stripped, "desc"),
                    None => (col, it.next().unwrap_or("asc")),
                };
                out.push(FilterOrderInfo { column: col.to_string(), sort: Self::parse_direction(dir)? });
            }
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        if dir.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else if dir.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else {
            Err(FilterError::InvalidOrder(format!("Unknown sort direction: {}", dir)))
        }
    }

    /// Stable sort of records by the given columns; missing values sort last
    pub fn sort(records: &mut [Map<String, Value>], infos: &[FilterOrderInfo]) {
        if infos.is_empty() { return; }
        records.sort_by(|a, b| {
            for info in infos {
                let ord = Self::compare_field(a.get(&info.column), b.get(&info.column));
                let ord = match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal { return ord; }
            }
            Ordering::Equal
        });
    }

    fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => FilterWhere::compare(x, y).unwrap_or(Ordering::Equal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_array_and_object_forms() {
        let from_string = FilterOrder::validate_and_parse(&json!("created_at desc, filename")).unwrap();
        assert_eq!(from_string, vec![
            FilterOrderInfo { column: "created_at".into(), sort: SortDirection::Desc },
            FilterOrderInfo { column: "filename".into(), sort: SortDirection::Asc },
        ]);

        let from_array = FilterOrder::validate_and_parse(&json!(["-filesize"])).unwrap();
        assert_eq!(from_array[0].sort, SortDirection::Desc);

        let from_object = FilterOrder::validate_and_parse(&json!({ "filename": "desc" })).unwrap();
        assert_eq!(from_object[0].column, "filename");
        assert!(FilterOrder::validate_and_parse(&json!("filename sideways")).is_err());
    }

    #[test]
    fn sorts_with_missing_values_last() {
        let mut records: Vec<Map<String, Value>> = vec![
            json!({ "id": "a", "filesize": 3 }),
            json!({ "id": "b" }),
            json!({ "id": "c", "filesize": 1 }),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        FilterOrder::sort(&mut records, &FilterOrder::validate_and_parse(&json!("filesize")).unwrap());
        let ids: Vec<_> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
