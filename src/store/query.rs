//! Collection queries: field filters, ordering and a row limit.
//!
//! Remote backends translate a [`Query`] into their native query language;
//! in-process backends evaluate it with [`Query::apply`].

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::store::value::FieldValue;
use crate::store::Document;

/// Pseudo field naming the document id in filters and `order_by` clauses.
pub const DOCUMENT_ID: &str = "__name__";

/// Upper sentinel appended to a search term to form a prefix range.
pub const PREFIX_SENTINEL: char = '\u{ffff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
}

impl FilterOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::LessThan => ordering == Ordering::Less,
            FilterOp::LessThanOrEqual => ordering != Ordering::Greater,
            FilterOp::GreaterThan => ordering == Ordering::Greater,
            FilterOp::GreaterThanOrEqual => ordering != Ordering::Less,
            FilterOp::Equal => ordering == Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection. Filters are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<FieldFilter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Restrict `field` to strings in `[prefix, prefix + U+FFFF)`.
    ///
    /// This is a lexicographic range, so it is case-sensitive and follows
    /// the byte order of the stored strings. Under UTF-8 byte order every
    /// character outside the Basic Multilingual Plane sorts above U+FFFF,
    /// so a name whose next character after `prefix` is, for example, an
    /// emoji falls outside the range and is not matched.
    pub fn prefix(self, field: &str, prefix: &str) -> Self {
        let mut upper = String::with_capacity(prefix.len() + PREFIX_SENTINEL.len_utf8());
        upper.push_str(prefix);
        upper.push(PREFIX_SENTINEL);

        self.filter(field, FilterOp::GreaterThanOrEqual, prefix)
            .filter(field, FilterOp::LessThan, upper)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document passes every filter. A filter only matches values
    /// of the same kind as its operand; missing fields never match.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| {
            resolve(doc, &filter.field)
                .and_then(|value| value.compare_same_kind(&filter.value))
                .is_some_and(|ordering| filter.op.accepts(ordering))
        })
    }

    /// Evaluate the query over a full collection scan.
    ///
    /// Documents lacking any `order_by` field are dropped. Ties are broken
    /// by document id ascending, which is also the order when no
    /// `order_by` is given.
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = docs
            .into_iter()
            .filter(|doc| self.matches(doc))
            .filter(|doc| {
                self.order_by
                    .iter()
                    .all(|order| resolve(doc, &order.field).is_some())
            })
            .collect();

        selected.sort_by(|a, b| self.compare(a, b));

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for order in &self.order_by {
            let ordering = match (resolve(a, &order.field), resolve(b, &order.field)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            };
            let ordering = match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id.cmp(&b.id)
    }
}

fn resolve<'a>(doc: &'a Document, field: &str) -> Option<Cow<'a, FieldValue>> {
    if field == DOCUMENT_ID {
        Some(Cow::Owned(FieldValue::String(doc.id.clone())))
    } else {
        doc.fields.get(field).map(Cow::Borrowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Fields;

    fn doc(id: &str, name: &str, marks: i64) -> Document {
        let mut fields = Fields::new();
        fields.insert("name".into(), name.into());
        fields.insert("marks".into(), marks.into());
        Document {
            id: id.into(),
            fields,
        }
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_prefix_range() {
        let docs = vec![
            doc("1", "Alice", 90),
            doc("2", "Alan", 70),
            doc("3", "alice", 80),
            doc("4", "Bob", 60),
            doc("5", "Al", 50),
            doc("6", "Ak", 40),
        ];
        let query = Query::new().prefix("name", "Al");
        assert_eq!(ids(&query.apply(docs)), vec!["1", "2", "5"]);
    }

    #[test]
    fn test_prefix_upper_bound_stops_at_bmp() {
        let docs = vec![
            doc("1", "Al\u{fffe}", 90),
            doc("2", "Al\u{ffff}", 70),
            doc("3", "Al\u{1f600}", 80),
            doc("4", "Alice", 60),
        ];
        let query = Query::new().prefix("name", "Al");
        assert_eq!(ids(&query.apply(docs)), vec!["1", "4"]);
    }

    #[test]
    fn test_order_and_limit_with_id_tiebreak() {
        let docs = vec![
            doc("c", "C", 80),
            doc("a", "A", 95),
            doc("d", "D", 80),
            doc("b", "B", 80),
        ];
        let query = Query::new()
            .order_by("marks", Direction::Descending)
            .limit(3);
        assert_eq!(ids(&query.apply(docs)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_order_field_excluded() {
        let mut partial = doc("x", "X", 0);
        partial.fields.remove("marks");
        let docs = vec![doc("a", "A", 10), partial];

        let ordered = Query::new().order_by("marks", Direction::Ascending).apply(docs.clone());
        assert_eq!(ids(&ordered), vec!["a"]);

        let unordered = Query::new().apply(docs);
        assert_eq!(ids(&unordered), vec!["a", "x"]);
    }

    #[test]
    fn test_filters_match_same_kind_only() {
        let docs = vec![doc("a", "A", 10)];
        let query = Query::new().filter("marks", FilterOp::GreaterThan, "0");
        assert!(query.apply(docs).is_empty());
    }

    #[test]
    fn test_document_id_ordering() {
        let docs = vec![doc("b", "X", 1), doc("a", "X", 1)];
        let query = Query::new().order_by(DOCUMENT_ID, Direction::Descending);
        assert_eq!(ids(&query.apply(docs)), vec!["b", "a"]);
    }
}
