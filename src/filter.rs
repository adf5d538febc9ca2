//! Filter and sort construction for list/search queries.
//!
//! Request DTOs hand their optional fields to a [`FilterBuilder`]. Every field
//! is recorded as a `(predicate, active)` pair and only active pairs survive
//! [`FilterBuilder::build`], so absent or `null` request fields never leak into
//! the query. Repositories receive the resulting [`Conjunction`] and translate
//! each [`Predicate`] into their own query language.

use std::fmt::Debug;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors detected while assembling a filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Both range bounds were supplied and the lower one exceeds the upper one.
    #[error("invalid range for `{0}`: lower bound is greater than upper bound")]
    InvertedRange(&'static str),
}

/// A column that list queries are allowed to filter on.
pub trait FilterColumn: Copy + Debug + PartialEq {
    /// Public name of the column used in error messages and logs.
    fn name(self) -> &'static str;
}

/// Typed value carried by a predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Int(i32),
    Text(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
}

impl FilterValue {
    /// Returns `true` when `self` is strictly greater than `other`.
    ///
    /// Values of different kinds are never ordered.
    fn exceeds(&self, other: &FilterValue) -> bool {
        match (self, other) {
            (FilterValue::Int(a), FilterValue::Int(b)) => a > b,
            (FilterValue::Text(a), FilterValue::Text(b)) => a > b,
            (FilterValue::Bool(a), FilterValue::Bool(b)) => a > b,
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => a > b,
            _ => false,
        }
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(value: NaiveDateTime) -> Self {
        FilterValue::Timestamp(value)
    }
}

/// A single condition on one column.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate<C> {
    /// `column == value`
    Eq(C, FilterValue),
    /// `column LIKE %value%`
    Contains(C, String),
    /// `column >= value`
    Gte(C, FilterValue),
    /// `column <= value`
    Lte(C, FilterValue),
}

impl<C: FilterColumn> Predicate<C> {
    /// Column the predicate applies to.
    pub fn column(&self) -> C {
        match self {
            Predicate::Eq(column, _)
            | Predicate::Contains(column, _)
            | Predicate::Gte(column, _)
            | Predicate::Lte(column, _) => *column,
        }
    }
}

/// Conjunction ("AND") of predicates. An empty conjunction matches every row.
#[derive(Clone, Debug, PartialEq)]
pub struct Conjunction<C> {
    predicates: Vec<Predicate<C>>,
}

impl<C> Default for Conjunction<C> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<C> Conjunction<C> {
    /// Conjunction without predicates.
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate<C>] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Appends the predicates of `other`; neither side is replaced.
    #[must_use]
    pub fn and(mut self, other: Conjunction<C>) -> Self {
        self.predicates.extend(other.predicates);
        self
    }
}

/// Collects `(predicate, active)` pairs and folds the active ones into a
/// [`Conjunction`].
#[derive(Debug)]
pub struct FilterBuilder<C> {
    entries: Vec<(Predicate<C>, bool)>,
    error: Option<FilterError>,
}

impl<C: FilterColumn> Default for FilterBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FilterColumn> FilterBuilder<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            error: None,
        }
    }

    /// Records a predicate together with its activation flag.
    #[must_use]
    pub fn when(mut self, active: bool, predicate: Predicate<C>) -> Self {
        self.entries.push((predicate, active));
        self
    }

    /// Adds a predicate that is always applied, e.g. the tenant scope.
    #[must_use]
    pub fn require(self, predicate: Predicate<C>) -> Self {
        self.when(true, predicate)
    }

    /// Exact match, applied only when a value is present.
    #[must_use]
    pub fn eq<V: Into<FilterValue>>(self, column: C, value: Option<V>) -> Self {
        match value {
            Some(value) => self.require(Predicate::Eq(column, value.into())),
            None => self,
        }
    }

    /// Substring match on the trimmed value, skipped for blank input.
    #[must_use]
    pub fn contains(self, column: C, value: Option<&str>) -> Self {
        match value {
            Some(value) => {
                let trimmed = value.trim();
                self.when(
                    !trimmed.is_empty(),
                    Predicate::Contains(column, trimmed.to_string()),
                )
            }
            None => self,
        }
    }

    /// Inclusive range with independently optional bounds.
    #[must_use]
    pub fn range<V: Into<FilterValue>>(mut self, column: C, from: Option<V>, to: Option<V>) -> Self {
        let from = from.map(Into::into);
        let to = to.map(Into::into);

        if let (Some(lower), Some(upper)) = (&from, &to)
            && lower.exceeds(upper)
        {
            self.error
                .get_or_insert(FilterError::InvertedRange(column.name()));
        }

        if let Some(lower) = from {
            self = self.require(Predicate::Gte(column, lower));
        }
        if let Some(upper) = to {
            self = self.require(Predicate::Lte(column, upper));
        }
        self
    }

    /// Folds the active entries, in insertion order, into a conjunction.
    pub fn build(self) -> Result<Conjunction<C>, FilterError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let predicates = self
            .entries
            .into_iter()
            .filter_map(|(predicate, active)| active.then_some(predicate))
            .collect();

        Ok(Conjunction { predicates })
    }
}

/// Escapes `value` for a `LIKE ... ESCAPE '\'` substring pattern.
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Sort direction accepted by list endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Allow-list of sortable columns for one entity.
pub trait SortKey: Copy + Debug + PartialEq {
    /// Column used when the caller asks for nothing or for an unknown key.
    const DEFAULT: Self;
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Desc;

    /// Maps a caller supplied key onto the allow-list.
    fn parse(value: &str) -> Option<Self>;

    fn name(self) -> &'static str;
}

/// Resolved ordering for a list query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortSpec<S> {
    pub key: S,
    pub direction: SortDirection,
}

impl<S: SortKey> Default for SortSpec<S> {
    fn default() -> Self {
        Self {
            key: S::DEFAULT,
            direction: S::DEFAULT_DIRECTION,
        }
    }
}

impl<S: SortKey> SortSpec<S> {
    /// Resolves a caller supplied key against the allow-list, falling back to
    /// [`SortKey::DEFAULT`] for unknown keys.
    pub fn resolve(key: Option<&str>, direction: Option<SortDirection>) -> Self {
        let key = match key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(raw) => S::parse(raw).unwrap_or_else(|| {
                log::debug!(
                    "Unsupported sort key `{raw}`, falling back to `{}`",
                    S::DEFAULT.name()
                );
                S::DEFAULT
            }),
            None => S::DEFAULT,
        };

        Self {
            key,
            direction: direction.unwrap_or(S::DEFAULT_DIRECTION),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Column {
        Owner,
        Title,
        Amount,
        CreatedAt,
    }

    impl FilterColumn for Column {
        fn name(self) -> &'static str {
            match self {
                Column::Owner => "owner",
                Column::Title => "title",
                Column::Amount => "amount",
                Column::CreatedAt => "created_at",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Sort {
        CreatedAt,
        Title,
    }

    impl SortKey for Sort {
        const DEFAULT: Self = Sort::CreatedAt;

        fn parse(value: &str) -> Option<Self> {
            match value {
                "created_at" => Some(Sort::CreatedAt),
                "title" => Some(Sort::Title),
                _ => None,
            }
        }

        fn name(self) -> &'static str {
            match self {
                Sort::CreatedAt => "created_at",
                Sort::Title => "title",
            }
        }
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_builder_matches_everything() {
        let filter = FilterBuilder::<Column>::new().build().unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn absent_fields_produce_no_predicates() {
        let filter = FilterBuilder::new()
            .eq(Column::Owner, None::<i32>)
            .contains(Column::Title, None)
            .range(Column::Amount, None::<i32>, None)
            .build()
            .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn present_fields_keep_insertion_order() {
        let filter = FilterBuilder::new()
            .eq(Column::Owner, Some(7))
            .contains(Column::Title, Some("  report "))
            .build()
            .unwrap();

        assert_eq!(
            filter.predicates(),
            &[
                Predicate::Eq(Column::Owner, FilterValue::Int(7)),
                Predicate::Contains(Column::Title, "report".to_string()),
            ]
        );
    }

    #[test]
    fn blank_substring_is_inactive() {
        let filter = FilterBuilder::new()
            .contains(Column::Title, Some("   "))
            .build()
            .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn single_bound_gives_open_range() {
        let filter = FilterBuilder::new()
            .range(Column::CreatedAt, Some(at(3)), None)
            .build()
            .unwrap();
        assert_eq!(
            filter.predicates(),
            &[Predicate::Gte(Column::CreatedAt, FilterValue::Timestamp(at(3)))]
        );

        let filter = FilterBuilder::new()
            .range(Column::Amount, None, Some(100))
            .build()
            .unwrap();
        assert_eq!(
            filter.predicates(),
            &[Predicate::Lte(Column::Amount, FilterValue::Int(100))]
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = FilterBuilder::new()
            .range(Column::CreatedAt, Some(at(5)), Some(at(1)))
            .build();
        assert_eq!(result, Err(FilterError::InvertedRange("created_at")));
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let filter = FilterBuilder::new()
            .range(Column::Amount, Some(10), Some(10))
            .build()
            .unwrap();
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn scope_predicates_compose_with_request_filters() {
        let scope = FilterBuilder::new()
            .require(Predicate::Eq(Column::Owner, FilterValue::Int(1)))
            .build()
            .unwrap();
        let request = FilterBuilder::new()
            .eq(Column::Owner, Some(2))
            .build()
            .unwrap();

        let combined = scope.and(request);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined.predicates()[0].column(), Column::Owner);
        assert_eq!(
            combined.predicates()[1],
            Predicate::Eq(Column::Owner, FilterValue::Int(2))
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn unknown_sort_key_falls_back_to_default() {
        let spec = SortSpec::<Sort>::resolve(Some("password; DROP TABLE"), None);
        assert_eq!(spec.key, Sort::CreatedAt);
        assert_eq!(spec.direction, SortDirection::Desc);
    }

    #[test]
    fn known_sort_key_and_direction_are_kept() {
        let spec = SortSpec::<Sort>::resolve(Some("title"), Some(SortDirection::Asc));
        assert_eq!(spec.key, Sort::Title);
        assert_eq!(spec.direction, SortDirection::Asc);
    }

    #[test]
    fn sort_direction_deserializes_lowercase() {
        let direction: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(direction, SortDirection::Asc);
        assert!(serde_json::from_str::<SortDirection>("\"sideways\"").is_err());
    }
}
