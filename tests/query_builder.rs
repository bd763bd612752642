use std::collections::BTreeMap;

use docstore_client::model::{DatabaseId, DocumentKey, FieldPath};
use docstore_client::remote::{encode_structured_query, JsonProtoSerializer};
use docstore_client::value::{DocstoreValue, MapValue, ValueKind};
use docstore_client::{
    Docstore, DocstoreClient, DocumentSnapshot, FilterOperator, OrderDirection, Query, QueryFilter,
};

fn docstore() -> Docstore {
    Docstore::new(DatabaseId::default_database("test-project"))
}

fn rooms_query() -> Query {
    docstore().collection("rooms").unwrap().query()
}

fn room_snapshot(id: &str, score: i64) -> DocumentSnapshot {
    let key = DocumentKey::from_string(&format!("rooms/{id}")).unwrap();
    let mut fields = BTreeMap::new();
    fields.insert("score".to_string(), DocstoreValue::from_integer(score));
    DocumentSnapshot::new(key, Some(MapValue::new(fields)))
}

#[test]
fn paginating_a_filtered_collection() {
    // A caller filters on "score", never orders explicitly, and paginates
    // from a document it saw earlier. Cursor resolution has to derive the
    // sort order: the inequality field ascending, then the document identity.
    let query = rooms_query()
        .where_field("score", FilterOperator::GreaterThan, 10)
        .unwrap()
        .start_at_document(&room_snapshot("abc", 12))
        .unwrap();

    let order_by = query.order_by();
    assert_eq!(order_by.len(), 2);
    assert_eq!(order_by[0].field().canonical_string(), "score");
    assert_eq!(order_by[0].direction(), OrderDirection::Ascending);
    assert!(order_by[1].field().is_document_id());
    assert_eq!(order_by[1].direction(), OrderDirection::Ascending);

    let bound = query.start_at().unwrap();
    assert!(bound.before());
    assert_eq!(bound.values()[0], DocstoreValue::from_integer(12));
    match bound.values()[1].kind() {
        ValueKind::Reference(path) => assert_eq!(path, "rooms/abc"),
        other => panic!("expected a reference cursor value, got {other:?}"),
    }
}

#[test]
fn empty_projection_keeps_results_identifiable() {
    let query = rooms_query().select(Vec::<&str>::new()).unwrap();
    let projection = query.projection().unwrap();
    assert_eq!(projection.len(), 1);
    assert!(projection[0].is_document_id());
}

#[test]
fn null_filters_are_equality_only() {
    let query = rooms_query()
        .where_field("age", FilterOperator::Equal, DocstoreValue::null())
        .unwrap();
    assert!(matches!(query.filters()[0], QueryFilter::Unary(_)));
    assert!(query.filters()[0].is_equality());

    let err = rooms_query()
        .where_field("age", FilterOperator::GreaterThan, DocstoreValue::null())
        .unwrap_err();
    assert_eq!(err.code_str(), "docstore/invalid-filter-value");
}

#[test]
fn builder_chains_share_untouched_state() {
    let base = rooms_query()
        .where_field("score", FilterOperator::GreaterThan, 10)
        .unwrap();
    let limited = base.with_limit(5).unwrap();
    let offset = base.with_offset(3).unwrap();

    // Divergent descendants never disturb each other or the base.
    assert_eq!(base.limit(), None);
    assert_eq!(base.offset(), 0);
    assert_eq!(limited.offset(), 0);
    assert_eq!(offset.limit(), None);
    assert_eq!(limited.filters(), base.filters());
}

#[test]
fn lowered_form_is_deterministic() {
    let serializer = JsonProtoSerializer::new(DatabaseId::default_database("test-project"));
    let build = || {
        rooms_query()
            .where_field("score", FilterOperator::GreaterThan, 10)
            .unwrap()
            .where_field("kind", FilterOperator::Equal, "arena")
            .unwrap()
            .with_order_by("score", OrderDirection::Ascending)
            .unwrap()
            .with_limit(2)
            .unwrap()
    };
    let first = encode_structured_query(&serializer, &build()).unwrap();
    let second = encode_structured_query(&serializer, &build()).unwrap();
    assert_eq!(first, second);

    let filters = first["where"]["compositeFilter"]["filters"]
        .as_array()
        .unwrap();
    assert_eq!(filters[0]["fieldFilter"]["field"]["fieldPath"], "score");
    assert_eq!(filters[1]["fieldFilter"]["field"]["fieldPath"], "kind");
}

#[test]
fn cursor_resolution_is_pure() {
    let base = rooms_query()
        .where_field("score", FilterOperator::GreaterThan, 10)
        .unwrap();
    let snapshot = room_snapshot("abc", 12);

    let _ = base.start_at_document(&snapshot).unwrap();
    // The base query still has no orderings and no cursor.
    assert!(base.order_by().is_empty());
    assert!(base.start_at().is_none());
}

#[test]
fn document_cursor_values_must_match_the_collection() {
    let query = rooms_query()
        .with_order_by(FieldPath::document_id(), OrderDirection::Descending)
        .unwrap();

    let err = query
        .start_at_values([DocstoreValue::from_reference("lobbies/abc")])
        .unwrap_err();
    assert_eq!(err.code_str(), "docstore/invalid-document-id-cursor-value");

    let ok = query.end_at_values(["abc"]).unwrap();
    match ok.end_at().unwrap().values()[0].kind() {
        ValueKind::Reference(path) => assert_eq!(path, "rooms/abc"),
        other => panic!("expected a reference cursor value, got {other:?}"),
    }
}

#[tokio::test]
async fn in_memory_execution_roundtrip() {
    use docstore_client::remote::InMemoryDatastore;
    use std::sync::Arc;

    let datastore = InMemoryDatastore::new();
    for id in ["alpha", "beta"] {
        let key = DocumentKey::from_string(&format!("rooms/{id}")).unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), DocstoreValue::from_string(id));
        datastore.insert_document(&key, MapValue::new(fields));
    }

    let client = DocstoreClient::new(docstore(), Arc::new(datastore));
    let snapshot = client.get_docs(&rooms_query()).await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.documents()[0].id(), "alpha");

    // Cursors resolved from returned documents stay attached to the query.
    let next_page = rooms_query()
        .start_after_document(&snapshot.documents()[1])
        .unwrap();
    assert!(!next_page.start_at().unwrap().before());
    assert_eq!(next_page.order_by().len(), 1);
    assert!(next_page.order_by()[0].field().is_document_id());
}
