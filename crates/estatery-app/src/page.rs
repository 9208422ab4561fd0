// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::num::NonZeroUsize;
use std::ops::Range;

/// Clamped page window over a filtered and sorted result of `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total: usize,
    pub page_size: NonZeroUsize,
    pub page_count: usize,
    /// 1-based, always in `[1, page_count]`.
    pub safe_page: usize,
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

const FULL_STRIP_MAX: usize = 7;

/// Any requested page, however large or negative, lands in `[1, page_count]`.
pub fn paginate(total: usize, page_size: NonZeroUsize, requested_page: i64) -> PageWindow {
    let size = page_size.get();
    let page_count = total.div_ceil(size).max(1);
    let safe_page = clamp_page(requested_page, page_count);
    let start_index = (safe_page - 1) * size;
    let end_index = (start_index + size).min(total);
    PageWindow {
        total,
        page_size,
        page_count,
        safe_page,
        start_index,
        end_index,
    }
}

fn clamp_page(requested: i64, page_count: usize) -> usize {
    if requested < 1 {
        return 1;
    }
    usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(page_count)
}

impl PageWindow {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let end = self.end_index.min(rows.len());
        let start = self.start_index.min(end);
        &rows[start..end]
    }

    /// 1-based index of the first visible row; 0 when empty.
    pub fn showing_from(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.start_index + 1
        }
    }

    pub fn showing_to(&self) -> usize {
        self.end_index
    }

    pub fn prev_page(&self) -> usize {
        self.safe_page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> usize {
        (self.safe_page + 1).min(self.page_count)
    }

    pub fn has_prev(&self) -> bool {
        self.safe_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.safe_page < self.page_count
    }

    /// Page-number strip with ellipses for long result sets.
    pub fn links(&self) -> Vec<PageLink> {
        let count = self.page_count;
        let page = self.safe_page;
        if count <= FULL_STRIP_MAX {
            return (1..=count).map(PageLink::Page).collect();
        }

        let mut links = Vec::with_capacity(FULL_STRIP_MAX);
        if page <= 4 {
            links.extend((1..=5).map(PageLink::Page));
            links.push(PageLink::Ellipsis);
            links.push(PageLink::Page(count));
        } else if page >= count - 3 {
            links.push(PageLink::Page(1));
            links.push(PageLink::Ellipsis);
            links.extend((count - 4..=count).map(PageLink::Page));
        } else {
            links.push(PageLink::Page(1));
            links.push(PageLink::Ellipsis);
            links.extend((page - 1..=page + 1).map(PageLink::Page));
            links.push(PageLink::Ellipsis);
            links.push(PageLink::Page(count));
        }
        links
    }
}
