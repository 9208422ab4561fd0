// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::model::Label;
use crate::page::{PageWindow, paginate};
use crate::query::{
    CategoryFilter, FilterState, RecordFilter, SortState, StatusFilter, filter_rows, sort_rows,
};
use crate::record::Record;
use crate::selection::Selection;

/// Eight rows.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(7);

/// Which rows a select-all checkbox covers. Hidden rows are never included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectScope {
    /// The visible page slice.
    #[default]
    Page,
    /// Every row matching the current filter, across pages.
    Filtered,
}

impl SelectScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Filtered => "filtered",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand<S, C, F> {
    SetSearch(String),
    SetStatusFilter(StatusFilter<S>),
    SetCategoryFilter(CategoryFilter<C>),
    SelectSort(F),
    GoToPage(i64),
    NextPage,
    PrevPage,
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent<S, C, F> {
    SearchChanged(String),
    StatusFilterChanged(StatusFilter<S>),
    CategoryFilterChanged(CategoryFilter<C>),
    SortChanged(SortState<F>),
    PageReset,
    PageChanged(i64),
    SelectionCleared,
}

pub type Command<R> =
    TableCommand<<R as Record>::Status, <R as Record>::Category, <R as Record>::SortField>;
pub type Event<R> =
    TableEvent<<R as Record>::Status, <R as Record>::Category, <R as Record>::SortField>;

/// Ordered matches plus the window over them.
#[derive(Debug)]
pub struct Projection<'a, R> {
    pub rows: Vec<&'a R>,
    pub window: PageWindow,
}

impl<'a, R> Projection<'a, R> {
    pub fn visible(&self) -> &[&'a R] {
        self.window.slice(&self.rows)
    }
}

/// Filter, sort, pagination and selection for one table view.
#[derive(Debug, Clone)]
pub struct TableState<R: Record> {
    pub filter: RecordFilter<R>,
    pub sort: SortState<R::SortField>,
    pub page_size: NonZeroUsize,
    /// Requested page; clamped on every projection.
    pub current_page: i64,
    pub selection: Selection,
    pub select_scope: SelectScope,
}

impl<R: Record> Default for TableState<R> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, SelectScope::default())
    }
}

impl<R: Record> TableState<R> {
    pub fn new(page_size: NonZeroUsize, select_scope: SelectScope) -> Self {
        Self {
            filter: FilterState::default(),
            sort: SortState::new(R::DEFAULT_SORT),
            page_size,
            current_page: 1,
            selection: Selection::new(),
            select_scope,
        }
    }

    pub fn dispatch(&mut self, command: Command<R>) -> Vec<Event<R>> {
        match command {
            TableCommand::SetSearch(term) => {
                self.filter.search_term = term.clone();
                vec![TableEvent::SearchChanged(term), self.reset_page()]
            }
            TableCommand::SetStatusFilter(status) => {
                self.filter.status = status;
                vec![TableEvent::StatusFilterChanged(status), self.reset_page()]
            }
            TableCommand::SetCategoryFilter(category) => {
                self.filter.category = category;
                vec![TableEvent::CategoryFilterChanged(category), self.reset_page()]
            }
            TableCommand::SelectSort(field) => {
                self.sort.select(field);
                vec![TableEvent::SortChanged(self.sort), self.reset_page()]
            }
            TableCommand::GoToPage(page) => self.go_to(page),
            TableCommand::NextPage => self.go_to(self.current_page.saturating_add(1)),
            TableCommand::PrevPage => self.go_to(self.current_page.saturating_sub(1)),
            TableCommand::ClearSelection => {
                self.selection.clear();
                vec![TableEvent::SelectionCleared]
            }
        }
    }

    fn reset_page(&mut self) -> Event<R> {
        self.current_page = 1;
        TableEvent::PageReset
    }

    fn go_to(&mut self, page: i64) -> Vec<Event<R>> {
        self.current_page = page.max(1);
        vec![TableEvent::PageChanged(self.current_page)]
    }

    /// Filter, then stable sort, then paginate. The stored page is clamped
    /// so that paging past the end stays on the last page.
    pub fn project<'a>(&mut self, rows: &'a [R]) -> Projection<'a, R> {
        let mut matched = filter_rows(rows, &self.filter);
        sort_rows(&mut matched, self.sort);
        let window = paginate(matched.len(), self.page_size, self.current_page);
        self.current_page = window.safe_page as i64;
        tracing::trace!(
            entity = R::KIND.as_str(),
            matched = matched.len(),
            page = window.safe_page,
            sort = self.sort.field.label(),
            "projected table"
        );
        Projection {
            rows: matched,
            window,
        }
    }

    /// Rows covered by the select-all checkbox under the configured scope.
    pub fn scope_rows<'p, 'a>(&self, projection: &'p Projection<'a, R>) -> &'p [&'a R] {
        match self.select_scope {
            SelectScope::Page => projection.visible(),
            SelectScope::Filtered => &projection.rows,
        }
    }

    pub fn toggle_all(&mut self, projection: &Projection<'_, R>, checked: bool) {
        let scoped = self.scope_rows(projection);
        self.selection.toggle_all(scoped, checked);
    }

    pub fn is_all_selected(&self, projection: &Projection<'_, R>) -> bool {
        self.selection.is_all_selected(self.scope_rows(projection))
    }

    pub fn is_indeterminate(&self, projection: &Projection<'_, R>) -> bool {
        self.selection.is_indeterminate(self.scope_rows(projection))
    }
}

#[cfg(test)]
mod tests {
    use super::{Projection, SelectScope, TableCommand, TableEvent, TableState};
    use crate::ids::RowId;
    use crate::model::{
        Discount, DiscountSortField, DiscountStatus, NewDiscount, NewPayment, Payment,
        PaymentStatus, PaymentType, SortDirection,
    };
    use crate::query::{CategoryFilter, SortState, StatusFilter};
    use std::num::NonZeroUsize;
    use time::{Date, Month};

    fn discounts(count: usize) -> Vec<Discount> {
        let date = Date::from_calendar_date(2025, Month::March, 1).unwrap_or(Date::MIN);
        (0..count)
            .map(|index| {
                let status = if index % 2 == 0 {
                    DiscountStatus::Active
                } else {
                    DiscountStatus::Expired
                };
                Discount::from_new(
                    RowId::new(format!("D-{}", 1001 + index)),
                    NewDiscount {
                        name: format!("Promo {index:02}"),
                        code: format!("SAVE{index}"),
                        percentage: (index as i64 % 4) * 5,
                        properties_count: 1,
                        start_date: date,
                        end_date: date,
                        status,
                    },
                )
            })
            .collect()
    }

    fn page_size(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
    }

    fn ids<'a>(rows: &[&'a Discount]) -> Vec<&'a str> {
        rows.iter().map(|row| row.id.as_str()).collect()
    }

    #[test]
    fn filter_and_sort_changes_reset_page() {
        let mut state = TableState::<Discount>::default();
        state.dispatch(TableCommand::GoToPage(3));
        assert_eq!(state.current_page, 3);

        let events = state.dispatch(TableCommand::SetSearch("promo".to_owned()));
        assert_eq!(state.current_page, 1);
        assert_eq!(
            events,
            vec![
                TableEvent::SearchChanged("promo".to_owned()),
                TableEvent::PageReset,
            ]
        );

        state.dispatch(TableCommand::GoToPage(2));
        let events = state.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
            DiscountStatus::Active,
        )));
        assert_eq!(state.current_page, 1);
        assert_eq!(events.last(), Some(&TableEvent::PageReset));

        state.dispatch(TableCommand::GoToPage(2));
        let events = state.dispatch(TableCommand::SelectSort(DiscountSortField::Percentage));
        assert_eq!(state.current_page, 1);
        assert_eq!(
            events[0],
            TableEvent::SortChanged(SortState {
                field: DiscountSortField::Percentage,
                direction: SortDirection::Asc,
            })
        );
    }

    #[test]
    fn category_filter_resets_page_and_narrows_rows() {
        let mut payments = Vec::new();
        let date = Date::from_calendar_date(2025, Month::July, 1).unwrap_or(Date::MIN);
        for index in 0..12_i64 {
            let kind = if index % 3 == 0 {
                PaymentType::Sale
            } else {
                PaymentType::Rent
            };
            payments.push(Payment::from_new(
                RowId::new(format!("P-{}", 2001 + index)),
                NewPayment {
                    date,
                    property: "Pine View".to_owned(),
                    address: "1 Road".to_owned(),
                    customer: format!("Customer {index}"),
                    kind,
                    amount_cents: 100 * index,
                    status: PaymentStatus::Completed,
                },
            ));
        }
        let mut state = TableState::<Payment>::new(page_size(4), SelectScope::Page);
        state.dispatch(TableCommand::GoToPage(2));

        let events = state.dispatch(TableCommand::SetCategoryFilter(CategoryFilter::Only(
            PaymentType::Sale,
        )));
        assert_eq!(state.current_page, 1);
        assert_eq!(
            events,
            vec![
                TableEvent::CategoryFilterChanged(CategoryFilter::Only(PaymentType::Sale)),
                TableEvent::PageReset,
            ]
        );
        let projection = state.project(&payments);
        assert_eq!(projection.rows.len(), 4);
        assert!(projection.rows.iter().all(|row| row.kind == PaymentType::Sale));
        assert_eq!(projection.window.page_count, 1);
    }

    #[test]
    fn page_navigation_does_not_reset_and_is_clamped_on_projection() {
        let rows = discounts(10);
        let mut state = TableState::<Discount>::new(page_size(4), SelectScope::Page);
        state.dispatch(TableCommand::NextPage);
        state.dispatch(TableCommand::NextPage);
        state.dispatch(TableCommand::NextPage);
        assert_eq!(state.current_page, 4);

        let projection = state.project(&rows);
        assert_eq!(projection.window.safe_page, 3);
        assert_eq!(state.current_page, 3);
        assert_eq!(projection.visible().len(), 2);

        state.dispatch(TableCommand::PrevPage);
        assert_eq!(state.current_page, 2);
        state.dispatch(TableCommand::GoToPage(-7));
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn project_filters_then_sorts_stably() {
        let rows = discounts(8);
        let mut state = TableState::<Discount>::new(page_size(10), SelectScope::Page);
        state.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
            DiscountStatus::Active,
        )));
        state.dispatch(TableCommand::SelectSort(DiscountSortField::Percentage));
        let projection = state.project(&rows);
        // Active rows are even indices; percentages 0, 10, 0, 10.
        assert_eq!(
            ids(&projection.rows),
            vec!["D-1001", "D-1005", "D-1003", "D-1007"]
        );
    }

    #[test]
    fn page_scope_select_all_covers_only_visible_page() {
        let rows = discounts(10);
        let mut state = TableState::<Discount>::new(page_size(4), SelectScope::Page);
        let projection: Projection<'_, Discount> = state.project(&rows);
        state.toggle_all(&projection, true);
        assert_eq!(state.selection.len(), 4);
        assert!(state.is_all_selected(&projection));
    }

    #[test]
    fn filtered_scope_select_all_excludes_hidden_rows() {
        let rows = discounts(10);
        let mut state = TableState::<Discount>::new(page_size(2), SelectScope::Filtered);
        state.dispatch(TableCommand::SetSearch("promo 0".to_owned()));
        let projection = state.project(&rows);
        assert_eq!(projection.rows.len(), 10);

        state.dispatch(TableCommand::SetSearch("SAVE1".to_owned()));
        let projection = state.project(&rows);
        assert_eq!(projection.rows.len(), 1);

        state.dispatch(TableCommand::SetStatusFilter(StatusFilter::Only(
            DiscountStatus::Expired,
        )));
        state.dispatch(TableCommand::SetSearch(String::new()));
        let projection = state.project(&rows);
        state.toggle_all(&projection, true);
        assert_eq!(state.selection.len(), 5);
        assert!(state.is_all_selected(&projection));
        assert!(!state.is_indeterminate(&projection));

        state.dispatch(TableCommand::SetStatusFilter(StatusFilter::All));
        let projection = state.project(&rows);
        assert!(state.is_indeterminate(&projection));
        state.toggle_all(&projection, false);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn clear_selection_command() {
        let rows = discounts(3);
        let mut state = TableState::<Discount>::default();
        let projection = state.project(&rows);
        state.toggle_all(&projection, true);
        let events = state.dispatch(TableCommand::ClearSelection);
        assert_eq!(events, vec![TableEvent::SelectionCleared]);
        assert!(state.selection.is_empty());
    }
}
