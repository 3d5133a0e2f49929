//! Meilisearch request body builders.

use serde_json::{json, Map, Value};

use item_search_shared::SearchRequest;

/// Build the body of an index creation request.
pub fn build_create_index_body(index: &str, primary_key: &str) -> Value {
    json!({
        "uid": index,
        "primaryKey": primary_key
    })
}

/// Build a Meilisearch search body from a SearchRequest.
///
/// Only the query is always present. The filter is sent as a single string
/// expression; `limit` and `offset` are left to the engine defaults when unset.
pub fn build_search_body(request: &SearchRequest) -> Value {
    let mut body = Map::new();
    body.insert("q".to_string(), json!(request.query));

    if let Some(filter) = request.filter_expression() {
        body.insert("filter".to_string(), json!(filter));
    }
    if let Some(limit) = request.limit {
        body.insert("limit".to_string(), json!(limit));
    }
    if let Some(offset) = request.offset {
        body.insert("offset".to_string(), json!(offset));
    }

    Value::Object(body)
}
