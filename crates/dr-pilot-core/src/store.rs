//! Policy store: filtering and pagination over the loaded policy collection
//!
//! Pure views over an immutable snapshot. Filtering always applies before
//! pagination; neither mutates the underlying collection. The current page
//! is deliberately not reset when the search text changes, so narrowing a
//! search can leave the view on an out-of-range page, which renders as an
//! empty window rather than an error.

use crate::types::DataPolicy;
use serde::{Deserialize, Serialize};

/// Retain the policies whose name contains `search` case-insensitively
///
/// An empty search matches everything; input order is preserved.
pub fn filter_policies<'a>(policies: &'a [DataPolicy], search: &str) -> Vec<&'a DataPolicy> {
    let needle = search.to_lowercase();
    policies
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Return the 1-based page window `[(page-1)*page_size, page*page_size)`
///
/// An out-of-range page (or a zero page/page size) yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let end = page.saturating_mul(page_size);
    let start = end.saturating_sub(page_size);
    if page == 0 || start >= items.len() {
        return &[];
    }
    &items[start..end.min(items.len())]
}

/// Number of pages needed to show `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One rendered page of the filtered policy collection
#[derive(Debug)]
pub struct PageView<'a> {
    /// Policies visible on the requested page
    pub rows: Vec<&'a DataPolicy>,
    /// Policies matching the filter across all pages
    pub total_filtered: usize,
    pub page: usize,
    pub page_count: usize,
}

/// Snapshot of the loaded policies, exposing filter/paginate views
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyStore {
    policies: Vec<DataPolicy>,
}

impl PolicyStore {
    pub fn new(policies: Vec<DataPolicy>) -> Self {
        Self { policies }
    }

    /// The unfiltered collection
    pub fn policies(&self) -> &[DataPolicy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Filter then paginate, producing the rows for one page
    pub fn view(&self, search: &str, page: usize, page_size: usize) -> PageView<'_> {
        let filtered = filter_policies(&self.policies, search);
        let total_filtered = filtered.len();
        let rows = paginate(&filtered, page, page_size).to_vec();
        PageView {
            rows,
            total_filtered,
            page,
            page_count: page_count(total_filtered, page_size),
        }
    }
}
