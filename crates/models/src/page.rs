//! The `{ data, pagination }` envelope returned by every list endpoint.

use serde::{Deserialize, Serialize};

/// Pagination metadata; after normalization `1 <= page <= page_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_count: u32,
    pub total_count: u64,
    pub limit: u32,
}

impl PaginationMeta {
    /// Safe defaults used when the server omits metadata or a fetch fails.
    pub fn empty(limit: u32) -> Self {
        Self { page: 1, page_count: 1, total_count: 0, limit }
    }

    /// Metadata for `total` records split into pages of `limit`.
    pub fn for_total(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let page_count = total.div_ceil(u64::from(limit)).max(1);
        let page_count = u32::try_from(page_count).unwrap_or(u32::MAX);
        Self { page, page_count, total_count: total, limit }.normalized()
    }

    pub fn normalized(mut self) -> Self {
        self.page_count = self.page_count.max(1);
        self.page = self.page.clamp(1, self.page_count);
        self
    }

    pub fn is_last_page(&self) -> bool { self.page >= self.page_count }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    page: Option<u32>,
    page_count: Option<u32>,
    total_count: Option<u64>,
}

/// List envelope as it arrives; every field may be missing.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct RawPage<T> {
    #[serde(default)]
    data: Option<Vec<T>>,
    #[serde(default)]
    pagination: Option<RawMeta>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Normalize a raw envelope, echoing the requested `limit`.
    ///
    /// Missing or zero values fall back to `page=1, pageCount=1, totalCount=0`.
    pub fn from_raw(raw: RawPage<T>, limit: u32) -> Self {
        let meta = raw.pagination.unwrap_or_default();
        let pagination = PaginationMeta {
            page: meta.page.filter(|p| *p > 0).unwrap_or(1),
            page_count: meta.page_count.filter(|p| *p > 0).unwrap_or(1),
            total_count: meta.total_count.unwrap_or(0),
            limit,
        }
        .normalized();
        Self { data: raw.data.unwrap_or_default(), pagination }
    }

    /// Cut one page out of a full, already ordered collection.
    pub fn paginate(items: Vec<T>, page: u32, limit: u32) -> Self {
        let pagination = PaginationMeta::for_total(page, limit, items.len() as u64);
        let skip = (pagination.page as usize - 1) * pagination.limit as usize;
        let data = items.into_iter().skip(skip).take(pagination.limit as usize).collect();
        Self { data, pagination }
    }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_pagination_falls_back_to_defaults() {
        let raw: RawPage<u32> = serde_json::from_value(json!({"data": [1, 2]})).unwrap();
        let page = Page::from_raw(raw, 10);
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.pagination, PaginationMeta::empty(10));
    }

    #[test]
    fn missing_data_is_empty() {
        let raw: RawPage<u32> = serde_json::from_value(json!({})).unwrap();
        assert!(Page::from_raw(raw, 5).is_empty());
    }

    #[test]
    fn page_beyond_page_count_is_clamped() {
        let raw: RawPage<u32> =
            serde_json::from_value(json!({"data": [], "pagination": {"page": 9, "pageCount": 3, "totalCount": 25}})).unwrap();
        let page = Page::from_raw(raw, 10);
        assert_eq!(page.pagination.page, 3);
        assert_eq!(page.pagination.total_count, 25);
    }

    #[test]
    fn paginate_slices_and_counts() {
        let page = Page::paginate((1..=23).collect::<Vec<u32>>(), 3, 10);
        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(page.pagination.page_count, 3);
        assert_eq!(page.pagination.total_count, 23);
        assert!(page.pagination.is_last_page());
    }

    #[test]
    fn paginate_empty_collection_has_one_page() {
        let page = Page::paginate(Vec::<u32>::new(), 4, 10);
        assert_eq!(page.pagination, PaginationMeta::empty(10));
    }
}
