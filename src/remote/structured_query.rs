use serde_json::{json, Value as JsonValue};

use crate::api::{Bound, Query, QueryFilter};
use crate::error::DocstoreResult;
use crate::remote::serializer::JsonProtoSerializer;

/// Lowers a query to its canonical `structuredQuery` wire form.
///
/// Filter order is preserved: a conjunction is logically commutative, but the
/// wire form must be deterministic so equal queries serialize identically.
pub fn encode_structured_query(
    serializer: &JsonProtoSerializer,
    query: &Query,
) -> DocstoreResult<JsonValue> {
    let mut structured = serde_json::Map::new();

    if let Some(fields) = query.projection() {
        let field_entries: Vec<_> = fields
            .iter()
            .map(|field| json!({ "fieldPath": field.canonical_string() }))
            .collect();
        structured.insert("select".to_string(), json!({ "fields": field_entries }));
    }

    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection_id() }]),
    );

    if !query.filters().is_empty() {
        structured.insert(
            "where".to_string(),
            encode_filters(serializer, query.filters()),
        );
    }

    if !query.order_by().is_empty() {
        let orders: Vec<_> = query
            .order_by()
            .iter()
            .map(|order| {
                json!({
                    "field": { "fieldPath": order.field().canonical_string() },
                    "direction": order.direction().as_str(),
                })
            })
            .collect();
        structured.insert("orderBy".to_string(), JsonValue::Array(orders));
    }

    if query.offset() > 0 {
        structured.insert("offset".to_string(), json!(query.offset()));
    }

    if let Some(limit) = query.limit() {
        structured.insert("limit".to_string(), json!(limit));
    }

    if let Some(bound) = query.start_at() {
        structured.insert("startAt".to_string(), encode_cursor(serializer, bound));
    }

    if let Some(bound) = query.end_at() {
        structured.insert("endAt".to_string(), encode_cursor(serializer, bound));
    }

    Ok(JsonValue::Object(structured))
}

fn encode_filters(serializer: &JsonProtoSerializer, filters: &[QueryFilter]) -> JsonValue {
    if filters.len() == 1 {
        return encode_filter(serializer, &filters[0]);
    }

    let nested: Vec<_> = filters
        .iter()
        .map(|filter| encode_filter(serializer, filter))
        .collect();

    json!({
        "compositeFilter": {
            "op": "AND",
            "filters": nested
        }
    })
}

fn encode_filter(serializer: &JsonProtoSerializer, filter: &QueryFilter) -> JsonValue {
    match filter {
        QueryFilter::Comparison(comparison) => json!({
            "fieldFilter": {
                "field": { "fieldPath": comparison.field().canonical_string() },
                "op": comparison.op().as_str(),
                "value": serializer.encode_value(comparison.value())
            }
        }),
        QueryFilter::Unary(unary) => json!({
            "unaryFilter": {
                "op": unary.op().as_str(),
                "field": { "fieldPath": unary.field().canonical_string() }
            }
        }),
    }
}

fn encode_cursor(serializer: &JsonProtoSerializer, bound: &Bound) -> JsonValue {
    json!({
        "values": bound
            .values()
            .iter()
            .map(|value| serializer.encode_value(value))
            .collect::<Vec<_>>(),
        "before": bound.before(),
    })
}
