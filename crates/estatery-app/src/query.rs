// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::{Label, SortDirection, Uncategorized};
use crate::record::{Record, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    #[default]
    All,
    Only(S),
}

/// Same shape as the status filter, over a table's category.
pub type CategoryFilter<C> = StatusFilter<C>;

impl<S: Label> StatusFilter<S> {
    /// `all` (any case) or a label.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        S::parse_label(value).map(Self::Only)
    }

    pub fn admits(self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// A row without a value only passes `All`.
    pub fn admits_optional(self, value: Option<S>) -> bool {
        match value {
            Some(value) => self.admits(value),
            None => self == Self::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<S, C = Uncategorized> {
    pub search_term: String,
    pub status: StatusFilter<S>,
    pub category: CategoryFilter<C>,
}

impl<S, C> Default for FilterState<S, C> {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            status: StatusFilter::All,
            category: StatusFilter::All,
        }
    }
}

impl<S: Label, C: Label> FilterState<S, C> {
    /// Trimmed, lowercased search term; `None` when it carries no constraint.
    pub fn normalized_term(&self) -> Option<String> {
        let term = self.search_term.trim().to_lowercase();
        (!term.is_empty()).then_some(term)
    }
}

pub type RecordFilter<R> = FilterState<<R as Record>::Status, <R as Record>::Category>;

/// Search, status and category constraints combined with AND.
pub fn matches<R: Record>(row: &R, filter: &RecordFilter<R>) -> bool {
    admits(row, filter, filter.normalized_term().as_deref())
}

/// Rows matching `filter`, in dataset order.
pub fn filter_rows<'a, R: Record>(rows: &'a [R], filter: &RecordFilter<R>) -> Vec<&'a R> {
    let term = filter.normalized_term();
    rows.iter()
        .filter(|row| admits(*row, filter, term.as_deref()))
        .collect()
}

fn admits<R: Record>(row: &R, filter: &RecordFilter<R>, term: Option<&str>) -> bool {
    filter.status.admits(row.status())
        && filter.category.admits_optional(row.category())
        && term.is_none_or(|term| {
            row.searchable_fields()
                .into_iter()
                .any(|field| field.to_lowercase().contains(term))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Label> SortState<F> {
    pub fn new(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Same field flips direction; a new field starts ascending.
    pub fn select(&mut self, field: F) {
        if field == self.field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }
}

/// Parses a sort field name, falling back to the entity default for unknown input.
pub fn sort_field_or_default<R: Record>(raw: &str) -> R::SortField {
    match <R::SortField as Label>::parse_label(raw) {
        Some(field) => field,
        None => {
            tracing::debug!(
                entity = R::KIND.as_str(),
                field = raw,
                "unknown sort field; using default"
            );
            R::DEFAULT_SORT
        }
    }
}

pub fn compare<R: Record>(
    left: &R,
    right: &R,
    field: R::SortField,
    direction: SortDirection,
) -> Ordering {
    let ascending = compare_keys(left.sort_key(field), right.sort_key(field));
    match direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

fn compare_keys(left: SortKey<'_>, right: SortKey<'_>) -> Ordering {
    match (left, right) {
        (SortKey::Text(left), SortKey::Text(right)) => collate(left, right),
        (SortKey::Integer(left), SortKey::Integer(right)) => left.cmp(&right),
        (SortKey::Decimal(left), SortKey::Decimal(right)) => left.total_cmp(&right),
        (SortKey::Date(left), SortKey::Date(right)) => left.cmp(&right),
        _ => Ordering::Equal,
    }
}

/// Stable in-place sort; equal rows keep their relative order.
pub fn sort_rows<R: Record>(rows: &mut [&R], sort: SortState<R::SortField>) {
    rows.sort_by(|left, right| compare(*left, *right, sort.field, sort.direction));
}

/// Locale-style text ordering: accents and case are secondary to the base letters.
pub fn collate(left: &str, right: &str) -> Ordering {
    fold(left)
        .cmp(&fold(right))
        .then_with(|| left.to_lowercase().cmp(&right.to_lowercase()))
        .then_with(|| right.cmp(left))
}

fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
