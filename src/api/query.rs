use std::sync::Arc;

use crate::error::{
    invalid_argument, invalid_cursor_values, invalid_document_id_cursor_value,
    missing_snapshot_field, ordering_after_cursor, sentinel_value_rejected,
    snapshot_collection_mismatch, DocstoreResult,
};
use crate::model::{DocumentKey, FieldPath, IntoFieldPath};
use crate::value::{DocstoreValue, ValueKind};

use super::filter::{FilterOperator, QueryFilter};
use super::reference::CollectionReference;
use super::snapshot::DocumentSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASCENDING",
            OrderDirection::Descending => "DESCENDING",
        }
    }
}

/// One sort key of a query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderBy {
    field: FieldPath,
    direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: FieldPath, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

/// A resolved cursor position: one value per leading sort key, plus the wire
/// `before` flag. On a start position `before == true` means "start at"
/// (inclusive); on an end position it means "end before" (exclusive).
///
/// A bound is only meaningful relative to the ordering list it was resolved
/// against, which is why it is built together with the query that carries it
/// and never re-attached elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bound {
    values: Vec<DocstoreValue>,
    before: bool,
}

impl Bound {
    pub(crate) fn new(values: Vec<DocstoreValue>, before: bool) -> Self {
        Self { values, before }
    }

    pub fn values(&self) -> &[DocstoreValue] {
        &self.values
    }

    pub fn before(&self) -> bool {
        self.before
    }
}

/// An immutable description of a collection query.
///
/// Every builder method returns a new `Query`; the receiver is never
/// modified. Ordering, filter, and projection lists sit behind `Arc`s so a
/// builder chain shares the lists it does not touch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Query {
    collection: CollectionReference,
    offset: i64,
    limit: Option<i64>,
    order_by: Arc<Vec<OrderBy>>,
    filters: Arc<Vec<QueryFilter>>,
    projection: Option<Arc<Vec<FieldPath>>>,
    start_at: Option<Bound>,
    end_at: Option<Bound>,
}

impl Query {
    pub(crate) fn new(collection: CollectionReference) -> Self {
        Self {
            collection,
            offset: 0,
            limit: None,
            order_by: Arc::new(Vec::new()),
            filters: Arc::new(Vec::new()),
            projection: None,
            start_at: None,
            end_at: None,
        }
    }

    pub fn collection(&self) -> &CollectionReference {
        &self.collection
    }

    /// The identifier (last path segment) of the targeted collection.
    pub fn collection_id(&self) -> &str {
        self.collection.id()
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn projection(&self) -> Option<&[FieldPath]> {
        self.projection.as_deref().map(Vec::as_slice)
    }

    pub fn start_at(&self) -> Option<&Bound> {
        self.start_at.as_ref()
    }

    pub fn end_at(&self) -> Option<&Bound> {
        self.end_at.as_ref()
    }

    /// Appends a predicate. All filters on a query are AND-combined.
    pub fn where_field<F, V>(
        &self,
        field: F,
        op: FilterOperator,
        value: V,
    ) -> DocstoreResult<Query>
    where
        F: IntoFieldPath,
        V: Into<DocstoreValue>,
    {
        let filter = QueryFilter::new(field.into_field_path()?, op, value.into())?;
        let mut filters = self.filters.as_ref().clone();
        filters.push(filter);
        Ok(Query {
            filters: Arc::new(filters),
            ..self.clone()
        })
    }

    /// Appends a sort key ("then-by" composition; the first call is the
    /// primary key). Fails once a cursor is attached, because cursors are
    /// resolved against a fixed ordering list.
    pub fn with_order_by<F>(&self, field: F, direction: OrderDirection) -> DocstoreResult<Query>
    where
        F: IntoFieldPath,
    {
        if self.start_at.is_some() || self.end_at.is_some() {
            return Err(ordering_after_cursor(
                "Orderings cannot be added once a start or end cursor is set",
            ));
        }
        let mut order_by = self.order_by.as_ref().clone();
        order_by.push(OrderBy::new(field.into_field_path()?, direction));
        Ok(Query {
            order_by: Arc::new(order_by),
            ..self.clone()
        })
    }

    /// Restricts results to the given field paths. Passing no paths projects
    /// just the document identity, since every result must stay identifiable.
    pub fn select<F, I>(&self, fields: I) -> DocstoreResult<Query>
    where
        F: IntoFieldPath,
        I: IntoIterator<Item = F>,
    {
        let mut paths = Vec::new();
        for field in fields {
            paths.push(field.into_field_path()?);
        }
        if paths.is_empty() {
            paths.push(FieldPath::document_id());
        }
        Ok(Query {
            projection: Some(Arc::new(paths)),
            ..self.clone()
        })
    }

    pub fn with_limit(&self, limit: i64) -> DocstoreResult<Query> {
        if limit < 0 {
            return Err(invalid_argument("Limit must not be negative"));
        }
        Ok(Query {
            limit: Some(limit),
            ..self.clone()
        })
    }

    pub fn with_offset(&self, offset: i64) -> DocstoreResult<Query> {
        if offset < 0 {
            return Err(invalid_argument("Offset must not be negative"));
        }
        Ok(Query {
            offset,
            ..self.clone()
        })
    }

    /// Starts results at the given sort-key values, inclusive.
    pub fn start_at_values<V, I>(&self, values: I) -> DocstoreResult<Query>
    where
        V: Into<DocstoreValue>,
        I: IntoIterator<Item = V>,
    {
        let bound = self.bound_from_values(collect_values(values), true)?;
        Ok(Query {
            start_at: Some(bound),
            ..self.clone()
        })
    }

    /// Starts results strictly after the given sort-key values.
    pub fn start_after_values<V, I>(&self, values: I) -> DocstoreResult<Query>
    where
        V: Into<DocstoreValue>,
        I: IntoIterator<Item = V>,
    {
        let bound = self.bound_from_values(collect_values(values), false)?;
        Ok(Query {
            start_at: Some(bound),
            ..self.clone()
        })
    }

    /// Ends results strictly before the given sort-key values.
    pub fn end_before_values<V, I>(&self, values: I) -> DocstoreResult<Query>
    where
        V: Into<DocstoreValue>,
        I: IntoIterator<Item = V>,
    {
        let bound = self.bound_from_values(collect_values(values), true)?;
        Ok(Query {
            end_at: Some(bound),
            ..self.clone()
        })
    }

    /// Ends results at the given sort-key values, inclusive.
    pub fn end_at_values<V, I>(&self, values: I) -> DocstoreResult<Query>
    where
        V: Into<DocstoreValue>,
        I: IntoIterator<Item = V>,
    {
        let bound = self.bound_from_values(collect_values(values), false)?;
        Ok(Query {
            end_at: Some(bound),
            ..self.clone()
        })
    }

    /// Starts results at the given document, inclusive.
    pub fn start_at_document(&self, snapshot: &DocumentSnapshot) -> DocstoreResult<Query> {
        let (order_by, bound) = self.bound_from_snapshot(snapshot, true)?;
        Ok(Query {
            order_by: Arc::new(order_by),
            start_at: Some(bound),
            ..self.clone()
        })
    }

    /// Starts results strictly after the given document.
    pub fn start_after_document(&self, snapshot: &DocumentSnapshot) -> DocstoreResult<Query> {
        let (order_by, bound) = self.bound_from_snapshot(snapshot, false)?;
        Ok(Query {
            order_by: Arc::new(order_by),
            start_at: Some(bound),
            ..self.clone()
        })
    }

    /// Ends results strictly before the given document.
    pub fn end_before_document(&self, snapshot: &DocumentSnapshot) -> DocstoreResult<Query> {
        let (order_by, bound) = self.bound_from_snapshot(snapshot, true)?;
        Ok(Query {
            order_by: Arc::new(order_by),
            end_at: Some(bound),
            ..self.clone()
        })
    }

    /// Ends results at the given document, inclusive.
    pub fn end_at_document(&self, snapshot: &DocumentSnapshot) -> DocstoreResult<Query> {
        let (order_by, bound) = self.bound_from_snapshot(snapshot, false)?;
        Ok(Query {
            order_by: Arc::new(order_by),
            end_at: Some(bound),
            ..self.clone()
        })
    }

    fn bound_from_values(
        &self,
        values: Vec<DocstoreValue>,
        before: bool,
    ) -> DocstoreResult<Bound> {
        if values.is_empty() {
            return Err(invalid_cursor_values("Cursors require at least one value"));
        }
        if values.len() > self.order_by.len() {
            return Err(invalid_cursor_values(format!(
                "Too many cursor values: got {}, but the query orders by {} field(s)",
                values.len(),
                self.order_by.len()
            )));
        }
        let mut resolved = Vec::with_capacity(values.len());
        for (order, value) in self.order_by.iter().zip(values) {
            let value = if order.field().is_document_id() {
                self.resolve_document_id_value(value)?
            } else {
                value
            };
            if value.is_sentinel() {
                return Err(sentinel_value_rejected(
                    "Delete and server-timestamp markers cannot be used as cursor values",
                ));
            }
            resolved.push(value);
        }
        Ok(Bound::new(resolved, before))
    }

    /// Turns the value supplied for a document-identity sort key into the
    /// reference of a direct child of the queried collection.
    fn resolve_document_id_value(&self, value: DocstoreValue) -> DocstoreResult<DocstoreValue> {
        let key = match value.kind() {
            ValueKind::String(id) => {
                if id.is_empty() || id.split('/').any(str::is_empty) {
                    return Err(invalid_document_id_cursor_value(format!(
                        "'{id}' is not a valid document ID"
                    )));
                }
                let path = self.collection.path().child(id.split('/'));
                DocumentKey::from_path(path).map_err(|_| {
                    invalid_document_id_cursor_value(format!(
                        "'{id}' does not resolve to a document in collection '{}'",
                        self.collection.path().canonical_string()
                    ))
                })?
            }
            ValueKind::Reference(path) => DocumentKey::from_string(path).map_err(|_| {
                invalid_document_id_cursor_value(format!(
                    "'{path}' is not a valid document reference"
                ))
            })?,
            other => {
                return Err(invalid_document_id_cursor_value(format!(
                    "The document-identity sort key requires a document ID or reference, got {other:?}"
                )))
            }
        };
        if key.collection_path() != *self.collection.path() {
            return Err(invalid_document_id_cursor_value(format!(
                "'{}' is not a direct child of the queried collection '{}'",
                key.path().canonical_string(),
                self.collection.path().canonical_string()
            )));
        }
        Ok(DocstoreValue::from_reference(key.path().canonical_string()))
    }

    /// Resolves a cursor from a prior result document.
    ///
    /// Returns the effective ordering list together with the bound: resolving
    /// against a snapshot may have to extend the ordering list (implicit sort
    /// keys for inequality filters, identity tie-break), and the two must
    /// replace the query's state together — a bound must never be longer than
    /// the ordering list it is attached to.
    fn bound_from_snapshot(
        &self,
        snapshot: &DocumentSnapshot,
        before: bool,
    ) -> DocstoreResult<(Vec<OrderBy>, Bound)> {
        if snapshot.key().collection_path() != *self.collection.path() {
            return Err(snapshot_collection_mismatch(format!(
                "Document '{}' is not part of the queried collection '{}'",
                snapshot.key().path().canonical_string(),
                self.collection.path().canonical_string()
            )));
        }

        let mut order_by = self.order_by.as_ref().clone();

        // Any field compared with an inequality must also be a sort key for
        // a cursor position to be well-defined. Without explicit orderings,
        // derive one ascending key per inequality filter, in filter order.
        if order_by.is_empty() {
            for filter in self.filters.iter() {
                if !filter.is_equality() {
                    order_by.push(OrderBy::new(
                        filter.field().clone(),
                        OrderDirection::Ascending,
                    ));
                }
            }
        }

        // Tie-break on the document identity so the position is total. The
        // implicit key inherits the last ordering's direction.
        if !order_by.iter().any(|order| order.field().is_document_id()) {
            let direction = order_by
                .last()
                .map(OrderBy::direction)
                .unwrap_or(OrderDirection::Ascending);
            order_by.push(OrderBy::new(FieldPath::document_id(), direction));
        }

        let mut values = Vec::with_capacity(order_by.len());
        for order in &order_by {
            let value = snapshot.field(order.field()).ok_or_else(|| {
                missing_snapshot_field(format!(
                    "Field '{}' is part of the sort order but missing from document '{}'",
                    order.field().canonical_string(),
                    snapshot.key().path().canonical_string()
                ))
            })?;
            if value.is_sentinel() {
                return Err(sentinel_value_rejected(
                    "Delete and server-timestamp markers cannot be used as cursor values",
                ));
            }
            values.push(value);
        }

        Ok((order_by, Bound::new(values, before)))
    }
}

fn collect_values<V, I>(values: I) -> Vec<DocstoreValue>
where
    V: Into<DocstoreValue>,
    I: IntoIterator<Item = V>,
{
    values.into_iter().map(Into::into).collect()
}
