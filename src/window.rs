//! Caller-sized page windows over the fixed-size upstream pagination.
//!
//! A logical `(page, page_size)` request is mapped onto the inclusive range
//! of upstream pages that covers it. Those pages are fetched in order, so
//! that an empty page or a 404 past the first page can end the walk early,
//! and the collected items are sliced down to the exact window.

use serde_json::Value as JsonValue;

use crate::{Resource, Result, SwapiClient};

/// A logical window: 1-based page, page size and an optional search term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowRequest {
    pub page: usize,
    pub page_size: usize,
    pub search: Option<String>,
}

impl WindowRequest {
    /// Zero values are raised to 1; range validation belongs to the caller.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }
}

/// Items of one logical window plus the upstream total, when reported.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowResult {
    /// At most `page_size` raw upstream items, in upstream order.
    pub items: Vec<JsonValue>,
    /// `count` from the first fetched page; `None` if never reported.
    pub total: Option<u64>,
}

impl WindowResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Upstream pages covering a logical window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WindowPlan {
    /// First upstream page (1-based).
    pub first_page: usize,
    /// Last upstream page (inclusive).
    pub last_page: usize,
    /// Index of the window's first item within the collected pages.
    pub offset: usize,
    pub take: usize,
}

impl WindowPlan {
    pub fn new(page: usize, page_size: usize, upstream_page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let upstream = upstream_page_size.max(1);
        let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);

        let first_page = (start / upstream).saturating_add(1);
        let last_page = ((end - 1) / upstream).saturating_add(1);
        Self {
            first_page,
            last_page,
            offset: start % upstream,
            take: page_size,
        }
    }
}

impl SwapiClient {
    /// Resolves a logical window of a list resource.
    ///
    /// A 404 on the first upstream page propagates: the window starts past
    /// the end (or the resource does not exist). A 404 on any later page
    /// means the collection ended and is not an error.
    pub async fn window(&self, resource: &str, request: &WindowRequest) -> Result<WindowResult> {
        let plan = WindowPlan::new(request.page, request.page_size, self.upstream_page_size());
        let search = request.search.as_deref();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            resource,
            page = request.page,
            page_size = request.page_size,
            first_upstream_page = plan.first_page,
            last_upstream_page = plan.last_page,
            "resolving window"
        );

        let mut collected = Vec::new();
        let mut total = None;

        for page in plan.first_page..=plan.last_page {
            let list = match self.fetch_list_page(resource, page, search).await {
                Ok(list) => list,
                Err(err) if err.is_not_found() && page != plan.first_page => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(resource, page, "upstream 404 past first page, end of list");
                    break;
                }
                Err(err) => return Err(err),
            };

            if total.is_none() {
                total = list.total();
            }

            let results = list.into_results();
            if results.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::debug!(resource, page, "empty upstream page, end of list");
                break;
            }
            collected.extend(results);
        }

        let items = collected
            .into_iter()
            .skip(plan.offset)
            .take(plan.take)
            .collect();
        Ok(WindowResult { items, total })
    }

    /// [`SwapiClient::window`] for a known collection.
    pub async fn window_of(
        &self,
        resource: Resource,
        request: &WindowRequest,
    ) -> Result<WindowResult> {
        self.window(resource.path(), request).await
    }
}
