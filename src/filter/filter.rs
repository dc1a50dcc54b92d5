use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, WhereNode};

/// Compiled query against one collection
pub struct Filter {
    collection: String,
    select_columns: Vec<String>,
    where_node: Option<WhereNode>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<usize>,
    offset: usize,
}

impl Filter {
    pub fn new(collection: impl Into<String>) -> Result<Self, FilterError> {
        let collection = collection.into();
        Self::validate_collection_name(&collection)?;
        Ok(Self {
            collection,
            select_columns: vec![],
            where_node: None,
            order_data: vec![],
            limit: None,
            offset: 0,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select { self.select(select)?; }
        if let Some(where_clause) = data.where_clause { self.where_clause(&where_clause)?; }
        if let Some(order) = data.order { self.order(&order)?; }
        self.limit(data.limit, data.offset);
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        for column in &columns {
            if column.is_empty() || !column.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '*') {
                return Err(FilterError::InvalidField(column.clone()));
            }
        }
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: &Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(conditions)?;
        self.where_node = Some(FilterWhere::parse(conditions)?);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<usize>, offset: Option<usize>) -> &mut Self {
        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit;
        self.limit = match (limit, max_limit) {
            (Some(l), Some(max)) if l > max => {
                if crate::config::CONFIG.filter.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, max);
                }
                Some(max)
            }
            (limit, _) => limit,
        };
        self.offset = offset.unwrap_or(0);
        self
    }

    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        self.where_node
            .as_ref()
            .map_or(true, |node| FilterWhere::matches(node, record))
    }

    /// Filter, sort and page a set of records
    pub fn apply(&self, records: impl IntoIterator<Item = Map<String, Value>>) -> Vec<Map<String, Value>> {
        let mut matched: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        FilterOrder::sort(&mut matched, &self.order_data);

        let paged = matched.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        }
    }

    /// Restrict a record to the selected columns; `id` is always kept
    pub fn project(&self, record: Map<String, Value>) -> Map<String, Value> {
        if self.select_columns.is_empty() || self.select_columns.iter().any(|c| c == "*") {
            return record;
        }
        record
            .into_iter()
            .filter(|(k, _)| k == "id" || self.select_columns.contains(k))
            .collect()
    }

    fn validate_collection_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidCollectionName(format!("Invalid collection name format: {}", name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Map<String, Value>> {
        (1..=5)
            .map(|i| json!({ "id": format!("f{}", i), "filesize": i, "filename": format!("file{}.pdf", i) }))
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn applies_where_order_and_paging() {
        let mut filter = Filter::new("product_files").unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({ "filesize": { "$gt": 1 } })),
                order: Some(json!("filesize desc")),
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            })
            .unwrap();

        let ids: Vec<_> = filter.apply(records()).into_iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("f4"), json!("f3")]);
    }

    #[test]
    fn projection_keeps_id() {
        let mut filter = Filter::new("product_files").unwrap();
        filter.select(vec!["filename".to_string()]).unwrap();
        let projected = filter.project(records().remove(0));
        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("id"));
        assert!(!projected.contains_key("filesize"));
    }

    #[test]
    fn rejects_invalid_collection_names() {
        assert!(Filter::new("").is_err());
        assert!(Filter::new("1files").is_err());
        assert!(Filter::new("files; drop").is_err());
        assert!(Filter::new("product_files").is_ok());
    }
}
