use crate::error::{invalid_filter_value, sentinel_value_rejected, DocstoreResult};
use crate::model::FieldPath;
use crate::value::DocstoreValue;

/// Comparison operators accepted by `where_field`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "EQUAL",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
        }
    }
}

/// Field predicates that test for a special value instead of comparing
/// against one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    IsNull,
    IsNan,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::IsNull => "IS_NULL",
            UnaryOperator::IsNan => "IS_NAN",
        }
    }
}

/// A field compared against a concrete value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComparisonFilter {
    field: FieldPath,
    op: FilterOperator,
    value: DocstoreValue,
}

impl ComparisonFilter {
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn op(&self) -> FilterOperator {
        self.op
    }

    pub fn value(&self) -> &DocstoreValue {
        &self.value
    }
}

/// A field tested for null or NaN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnaryFilter {
    field: FieldPath,
    op: UnaryOperator,
}

impl UnaryFilter {
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn op(&self) -> UnaryOperator {
        self.op
    }
}

/// A single query predicate. Filters on the same query combine as a
/// conjunction.
///
/// Null and NaN have no meaningful ordering, so they are representable only
/// as unary filters; the constructor enforces this instead of leaving it to
/// convention.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryFilter {
    Comparison(ComparisonFilter),
    Unary(UnaryFilter),
}

impl QueryFilter {
    pub fn new(
        field: FieldPath,
        op: FilterOperator,
        value: DocstoreValue,
    ) -> DocstoreResult<Self> {
        if value.is_null() || value.is_nan() {
            if op != FilterOperator::Equal {
                return Err(invalid_filter_value(
                    "Null and NaN values can only be used with the equality operator",
                ));
            }
            let op = if value.is_null() {
                UnaryOperator::IsNull
            } else {
                UnaryOperator::IsNan
            };
            return Ok(QueryFilter::Unary(UnaryFilter { field, op }));
        }
        if value.is_sentinel() {
            return Err(sentinel_value_rejected(format!(
                "Delete and server-timestamp markers cannot be used in a filter on '{}'",
                field.canonical_string()
            )));
        }
        Ok(QueryFilter::Comparison(ComparisonFilter {
            field,
            op,
            value,
        }))
    }

    pub fn field(&self) -> &FieldPath {
        match self {
            QueryFilter::Comparison(filter) => filter.field(),
            QueryFilter::Unary(filter) => filter.field(),
        }
    }

    /// Whether the filter pins its field to a single value. Unary filters
    /// always do; comparisons do only under `Equal`. Inequality filters are
    /// the ones that force an implicit ordering during cursor resolution.
    pub fn is_equality(&self) -> bool {
        match self {
            QueryFilter::Comparison(filter) => filter.op() == FilterOperator::Equal,
            QueryFilter::Unary(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldPath;

    fn field(name: &str) -> FieldPath {
        FieldPath::from_dot_separated(name).unwrap()
    }

    #[test]
    fn null_with_equal_becomes_unary() {
        let filter =
            QueryFilter::new(field("age"), FilterOperator::Equal, DocstoreValue::null()).unwrap();
        match &filter {
            QueryFilter::Unary(unary) => assert_eq!(unary.op(), UnaryOperator::IsNull),
            _ => panic!("expected unary filter"),
        }
        assert!(filter.is_equality());
    }

    #[test]
    fn nan_with_equal_becomes_unary() {
        let filter = QueryFilter::new(
            field("ratio"),
            FilterOperator::Equal,
            DocstoreValue::from_double(f64::NAN),
        )
        .unwrap();
        match &filter {
            QueryFilter::Unary(unary) => assert_eq!(unary.op(), UnaryOperator::IsNan),
            _ => panic!("expected unary filter"),
        }
    }

    #[test]
    fn null_with_inequality_is_rejected() {
        let err = QueryFilter::new(
            field("age"),
            FilterOperator::GreaterThan,
            DocstoreValue::null(),
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "docstore/invalid-filter-value");
    }

    #[test]
    fn sentinel_values_are_rejected() {
        for sentinel in [DocstoreValue::delete(), DocstoreValue::server_timestamp()] {
            let err =
                QueryFilter::new(field("age"), FilterOperator::Equal, sentinel).unwrap_err();
            assert_eq!(err.code_str(), "docstore/sentinel-value-rejected");
        }
    }

    #[test]
    fn equality_classification() {
        let eq = QueryFilter::new(
            field("age"),
            FilterOperator::Equal,
            DocstoreValue::from_integer(30),
        )
        .unwrap();
        assert!(eq.is_equality());

        let lt = QueryFilter::new(
            field("age"),
            FilterOperator::LessThan,
            DocstoreValue::from_integer(30),
        )
        .unwrap();
        assert!(!lt.is_equality());
    }

    #[test]
    fn operator_swap_breaks_equality() {
        let a = QueryFilter::new(
            field("age"),
            FilterOperator::Equal,
            DocstoreValue::from_integer(30),
        )
        .unwrap();
        let b = QueryFilter::new(
            field("age"),
            FilterOperator::LessThanOrEqual,
            DocstoreValue::from_integer(30),
        )
        .unwrap();
        assert_ne!(a, b);
    }
}
