//! Bounded, strictly sequential paging over collection endpoints.
//!
//! The pagers only hold state; the async and blocking request loops in the
//! resource modules drive them one page at a time.

use log::{debug, warn};
use url::Url;

use crate::models::CursorPage;

/// Hard upper bound on the number of records any single call returns.
pub const MAX_COUNT: usize = 2000;

pub fn clamp_count(requested: usize) -> usize {
    requested.min(MAX_COUNT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub count: usize,
}

/// Offset/count pagination.
///
/// Stops once `limit` records are collected or the server returns a page
/// shorter than requested.
#[derive(Debug)]
pub struct OffsetPager<T> {
    limit: usize,
    page_size: usize,
    offset: usize,
    exhausted: bool,
    items: Vec<T>,
}

impl<T> OffsetPager<T> {
    pub fn new(limit: usize, page_size: usize) -> Self {
        let limit = clamp_count(limit);
        Self {
            limit,
            page_size: page_size.max(1),
            offset: 0,
            exhausted: false,
            items: Vec::with_capacity(limit),
        }
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }

        let remaining = self.limit.saturating_sub(self.items.len());
        if remaining == 0 {
            return None;
        }

        Some(PageRequest {
            offset: self.offset,
            count: remaining.min(self.page_size),
        })
    }

    pub fn record(&mut self, request: PageRequest, page: Vec<T>) {
        debug!(
            "Page at offset {} returned {} of {} requested",
            request.offset,
            page.len(),
            request.count
        );

        if page.len() < request.count {
            self.exhausted = true;
        }

        self.offset += page.len();
        self.items.extend(page);
    }

    pub fn finish(mut self) -> Vec<T> {
        self.items.truncate(self.limit);
        self.items
    }
}

/// Follows the `next` link of page-number envelopes.
#[derive(Debug)]
pub struct CursorPager<T> {
    limit: usize,
    next: Option<Url>,
    items: Vec<T>,
}

impl<T> CursorPager<T> {
    pub fn new(first_page: Url, limit: usize) -> Self {
        Self {
            limit: clamp_count(limit),
            next: Some(first_page),
            items: Vec::new(),
        }
    }

    pub fn next_url(&mut self) -> Option<Url> {
        if self.items.len() >= self.limit {
            return None;
        }
        self.next.take()
    }

    pub fn record(&mut self, page: CursorPage<T>) {
        // An empty page with a `next` link would otherwise loop forever.
        let has_results = !page.results.is_empty();
        self.items.extend(page.results);

        self.next = match page.next {
            Some(next) if has_results => match Url::parse(&next) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Ignoring unparseable next page link {next}: {e}");
                    None
                }
            },
            _ => None,
        };
    }

    pub fn finish(mut self) -> Vec<T> {
        self.items.truncate(self.limit);
        self.items
    }
}
