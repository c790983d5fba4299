use serde_json::{Map, Value};

use super::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-key ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Field equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub equals: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        document.get(&self.field) == Some(&self.equals)
    }
}

/// A paginated query. The collection comes from the document type.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub filter: Option<Filter>,
    pub order: Option<OrderBy>,
    pub limit: usize,
    pub after: Option<Cursor>,
}

impl PageQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            filter: None,
            order: None,
            limit,
            after: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order: Option<OrderBy>) -> Self {
        self.order = order;
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.after = cursor;
        self
    }
}

/// One page of results and the cursor of its last record.
#[derive(Debug, Clone)]
pub struct Page<D> {
    pub records: Vec<D>,
    pub cursor: Option<Cursor>,
}

impl<D> Page<D> {
    /// Short-page heuristic: anything smaller than the requested size means
    /// the end of the data has been reached.
    pub fn is_full(&self, limit: usize) -> bool {
        self.records.len() >= limit
    }
}

/// A set of field overwrites for a point update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch(Map<String, Value>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite the patched fields of a JSON object. Non-objects are left alone.
    pub fn apply_to(&self, document: &mut Value) {
        if let Value::Object(fields) = document {
            for (field, value) in &self.0 {
                fields.insert(field.clone(), value.clone());
            }
        }
    }
}
