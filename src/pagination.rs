//! Pagination utilities for hub API responses.
//!
//! Collection endpoints answer with `{"totalCount": n, "items": [...]}` and
//! page through `offset`/`limit` query parameters.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::HubClient;
use crate::error::Result;
use crate::media::MediaType;
use crate::params::QueryParams;
use crate::traits::DEFAULT_PAGE_SIZE;

/// A page of results from the hub API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages (if known).
    pub total: Option<u64>,
    /// Offset of the first item on this page.
    pub offset: u32,
    /// Requested page size.
    pub limit: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, limit: u32, total: Option<u64>) -> Self {
        let has_more = match total {
            Some(t) => (u64::from(offset) + items.len() as u64) < t,
            None => items.len() >= limit as usize,
        };
        Self {
            items,
            total,
            offset,
            limit,
            has_more,
        }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Collection body shared by every list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Fetch one page of a collection endpoint.
///
/// `filters` come first in the query string, followed by `offset` and `limit`.
pub(crate) async fn fetch_page<T: DeserializeOwned>(
    client: &HubClient,
    target: &str,
    filters: &QueryParams,
    offset: u32,
    limit: u32,
    media: MediaType,
) -> Result<Page<T>> {
    let mut params = filters.clone();
    params.push("offset", offset);
    params.push("limit", limit);

    let response = client.get_with_query(target, &params, media).await?;
    let response = HubClient::check_response(response).await?;
    let body: ListResponse<T> = HubClient::read_json(response).await?;
    Ok(Page::new(body.items, offset, limit, body.total_count))
}

/// Fetch every page of a collection endpoint.
pub(crate) async fn fetch_all<T: DeserializeOwned>(
    client: &HubClient,
    target: &str,
    filters: &QueryParams,
    media: MediaType,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let page: Page<T> =
            fetch_page(client, target, filters, offset, DEFAULT_PAGE_SIZE, media).await?;
        let done = !page.has_more || page.is_empty();
        items.extend(page.items);
        if done {
            return Ok(items);
        }
        offset += DEFAULT_PAGE_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more_with_total() {
        // First of three pages (total 250, 100 per page)
        let page: Page<i32> = Page::new(vec![1; 100], 0, 100, Some(250));
        assert!(page.has_more);

        // Last page
        let page: Page<i32> = Page::new(vec![1; 50], 200, 100, Some(250));
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_has_more_without_total() {
        // Full page suggests more
        let page: Page<i32> = Page::new(vec![1; 100], 0, 100, None);
        assert!(page.has_more);

        // Partial page means no more
        let page: Page<i32> = Page::new(vec![1; 50], 0, 100, None);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 0, 100, Some(3));
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.offset, 0);
        assert!(!mapped.has_more);
    }

    #[test]
    fn test_list_response_tolerates_missing_fields() {
        let body: ListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"_meta": {"href": "x"}}"#).unwrap();
        assert!(body.items.is_empty());
        assert_eq!(body.total_count, None);
    }
}
