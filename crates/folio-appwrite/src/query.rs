//! Query builder for list endpoints.
//!
//! Queries travel as JSON strings in repeated `queries[]` parameters, e.g.
//! `{"method":"orderDesc","attribute":"$createdAt"}`.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

impl Query {
    fn new(method: &'static str, attribute: Option<String>, values: Vec<Value>) -> Self {
        Self { method, attribute, values }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Self::new("orderDesc", Some(attribute.into()), Vec::new())
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Self::new("orderAsc", Some(attribute.into()), Vec::new())
    }

    pub fn limit(limit: u32) -> Self {
        Self::new("limit", None, vec![Value::from(limit)])
    }

    pub fn offset(offset: u32) -> Self {
        Self::new("offset", None, vec![Value::from(offset)])
    }

    pub fn equal(attribute: impl Into<String>, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::new(
            "equal",
            Some(attribute.into()),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// Full-text search; needs a fulltext index on `attribute`.
    pub fn search(attribute: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new("search", Some(attribute.into()), vec![Value::String(term.into())])
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The wire form of a single query.
    pub fn to_json(&self) -> String {
        // Serializing a struct of strings and JSON values cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    pub(crate) fn encode_all(queries: &[Query]) -> Vec<(&'static str, String)> {
        queries.iter().map(|q| ("queries[]", q.to_json())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_query_has_no_values() {
        assert_eq!(
            Query::order_desc("$createdAt").to_json(),
            r#"{"method":"orderDesc","attribute":"$createdAt"}"#
        );
    }

    #[test]
    fn limit_query_has_no_attribute() {
        assert_eq!(Query::limit(100).to_json(), r#"{"method":"limit","values":[100]}"#);
    }

    #[test]
    fn equal_query_keeps_value_types() {
        let q = Query::equal("read", [false]);
        assert_eq!(q.to_json(), r#"{"method":"equal","attribute":"read","values":[false]}"#);
        assert_eq!(q.values(), &[Value::Bool(false)]);
    }
}
