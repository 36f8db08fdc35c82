//! List query normalization and paginated results.

use std::collections::BTreeMap;

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound applied to `limit`; larger requests are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized list parameters.
///
/// `page` and `limit` are always positive; every other query key is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    extra: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            extra: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    /// Build from raw query-string pairs.
    ///
    /// For repeated keys the first occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut page = None;
        let mut limit = None;
        let mut extra = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "page" => {
                    page.get_or_insert(value);
                }
                "limit" => {
                    limit.get_or_insert(value);
                }
                _ => {
                    extra.entry(key).or_insert(value);
                }
            }
        }

        Self {
            page: parse_positive(page.as_deref()).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit.as_deref())
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_PAGE_SIZE),
            extra,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Trimmed, non-empty `search` term.
    pub fn search(&self) -> Option<&str> {
        self.get("search").map(str::trim).filter(|s| !s.is_empty())
    }

    /// Take this page's window out of an already-filtered, ordered list.
    pub fn window<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(start)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// One page of results plus totals for the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, query: &ListQuery, total: u64) -> Self {
        Self {
            items,
            page: query.page(),
            limit: query.limit(),
            total,
            total_pages: total.div_ceil(u64::from(query.limit())),
        }
    }
}
