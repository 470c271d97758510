//! Query specification types

use super::filter::FilterSet;

/// Sort direction: `1` ascending, `-1` descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Reads the `1` / `-1` wire form
    pub fn from_wire(n: i64) -> Option<Self> {
        match n {
            1 => Some(SortDirection::Asc),
            -1 => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Field projection applied to results. `_id` is always returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    pub fn keeps(&self, field: &str) -> bool {
        match self {
            Projection::All => true,
            Projection::Include(fields) => fields.iter().any(|f| f == field),
            Projection::Exclude(fields) => !fields.iter().any(|f| f == field),
        }
    }
}

/// Parsed query: filters, then sort, then skip / limit, then projection.
///
/// The default spec returns the whole collection in insertion order.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub filters: FilterSet,
    pub sort: Vec<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
    pub fields: Projection,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort key
    pub fn order_by(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the spec leaves the collection untouched
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sort.is_empty()
            && self.skip == 0
            && self.limit.is_none()
            && self.fields == Projection::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_empty() {
        assert!(QuerySpec::default().is_empty());
        assert!(!QuerySpec::new().order_by(SortSpec::asc("title")).is_empty());
    }

    #[test]
    fn test_direction_wire_form() {
        assert_eq!(SortDirection::from_wire(1), Some(SortDirection::Asc));
        assert_eq!(SortDirection::from_wire(-1), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_wire(0), None);
    }

    #[test]
    fn test_projection_keeps() {
        let include = Projection::Include(vec!["title".to_string()]);
        assert!(include.keeps("title"));
        assert!(!include.keeps("order"));

        let exclude = Projection::Exclude(vec!["title".to_string()]);
        assert!(!exclude.keeps("title"));
        assert!(exclude.keeps("order"));
    }
}
