//! Query types passed to the two event sources.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default page size requested from the external source.
pub const DEFAULT_EXTERNAL_PAGE_SIZE: usize = 200;

/// Default cap on manual events fetched per query.
pub const DEFAULT_MANUAL_EVENT_LIMIT: usize = 200;

/// Parameters of one external search.
///
/// The same value is used for the external request and, after
/// [`QueryParams::canonical`], for deriving the cache key, so two requests
/// that differ only in list ordering or surrounding whitespace share a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Free-text search term (`q`).
    pub text: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category_ids: Vec<String>,
    pub areas: Vec<String>,
    pub tags: Vec<String>,
    pub targets: Vec<String>,
    pub sort: Option<String>,
    pub page_size: usize,
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub skip: usize,
    pub show_images: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            text: None,
            start: None,
            end: None,
            category_ids: Vec::new(),
            areas: Vec::new(),
            tags: Vec::new(),
            targets: Vec::new(),
            sort: None,
            page_size: DEFAULT_EXTERNAL_PAGE_SIZE,
            page: None,
            size: None,
            skip: 0,
            show_images: true,
        }
    }
}

impl QueryParams {
    /// Creates parameters with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the search term.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set the date bounds.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Builder: set the category filter.
    pub fn with_category_ids(mut self, ids: Vec<String>) -> Self {
        self.category_ids = ids;
        self
    }

    /// Builder: set the sort field.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Builder: set the external page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the trimmed search term, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Returns a normalized copy: trimmed text, blank strings removed and
    /// every id list sorted and deduplicated.
    pub fn canonical(&self) -> Self {
        Self {
            text: self.search_text().map(str::to_string),
            sort: self
                .sort
                .as_deref()
                .map(str::trim)
                .filter(|sort| !sort.is_empty())
                .map(str::to_string),
            category_ids: canonical_ids(&self.category_ids),
            areas: canonical_ids(&self.areas),
            tags: canonical_ids(&self.tags),
            targets: canonical_ids(&self.targets),
            ..self.clone()
        }
    }

    /// Renders the parameters as URL query pairs. Empty values are omitted
    /// and id lists are comma-joined.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let lists = [
            ("category_id", &self.category_ids),
            ("areas", &self.areas),
            ("tags", &self.tags),
            ("targets", &self.targets),
        ];
        for (key, ids) in lists {
            let ids = canonical_ids(ids);
            if !ids.is_empty() {
                pairs.push((key, ids.join(",")));
            }
        }

        if let Some(text) = self.search_text() {
            pairs.push(("q", text.to_string()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("sort", sort.trim().to_string()));
        }
        pairs.push(("page_size", self.page_size.to_string()));
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if self.skip > 0 {
            pairs.push(("skip", self.skip.to_string()));
        }
        pairs.push(("show_images", self.show_images.to_string()));

        pairs
    }
}

fn canonical_ids(ids: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Filter for the manual event repository.
///
/// Date bounds compare calendar dates in the event time zone and only apply
/// to single-window events; recurring events are filtered by text and
/// category and their dates are resolved afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEventQuery {
    /// Keep events ending on or after this date.
    pub end_from: Option<NaiveDate>,
    /// Keep events ending on or before this date.
    pub end_to: Option<NaiveDate>,
    /// Keep events starting on or after this date.
    pub start_from: Option<NaiveDate>,
    /// Case-insensitive match on title and descriptions.
    pub text: Option<String>,
    /// Keep events having at least one of these category terms.
    pub category_ids: Vec<u64>,
    pub limit: usize,
}

impl Default for ManualEventQuery {
    fn default() -> Self {
        Self {
            end_from: None,
            end_to: None,
            start_from: None,
            text: None,
            category_ids: Vec::new(),
            limit: DEFAULT_MANUAL_EVENT_LIMIT,
        }
    }
}

impl ManualEventQuery {
    /// Events still running or upcoming on `today`.
    pub fn ending_from(today: NaiveDate) -> Self {
        Self {
            end_from: Some(today),
            ..Self::default()
        }
    }

    /// Builder: set the text filter.
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|t| !t.trim().is_empty());
        self
    }

    /// Builder: set the category filter.
    pub fn with_category_ids(mut self, ids: Vec<u64>) -> Self {
        self.category_ids = ids;
        self
    }

    /// Builder: set the result cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn canonical_sorts_and_trims() {
        let params = QueryParams::new()
            .with_text("  jazz ")
            .with_category_ids(vec!["b".into(), "a".into(), "b".into(), " ".into()]);
        let canonical = params.canonical();

        assert_eq!(canonical.text.as_deref(), Some("jazz"));
        assert_eq!(canonical.category_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn canonical_is_order_insensitive() {
        let a = QueryParams::new().with_category_ids(vec!["x".into(), "y".into()]);
        let b = QueryParams::new().with_category_ids(vec!["y".into(), "x".into()]);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn blank_text_is_no_text() {
        let params = QueryParams::new().with_text("   ");
        assert_eq!(params.search_text(), None);
        assert_eq!(params.canonical().text, None);
    }

    #[test]
    fn query_pairs_omit_empty_values() {
        let params = QueryParams::new()
            .with_text("choir")
            .with_dates(Some(date(2, 5)), Some(date(3, 1)))
            .with_category_ids(vec!["k2".into(), "k1".into()])
            .with_sort("startDate");
        let pairs = params.to_query_pairs();

        assert!(pairs.contains(&("category_id", "k1,k2".to_string())));
        assert!(pairs.contains(&("q", "choir".to_string())));
        assert!(pairs.contains(&("start", "2025-02-05".to_string())));
        assert!(pairs.contains(&("end", "2025-03-01".to_string())));
        assert!(pairs.contains(&("sort", "startDate".to_string())));
        assert!(pairs.contains(&("page_size", "200".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "skip" || *k == "areas"));
    }

    #[test]
    fn manual_query_ignores_blank_text() {
        let query = ManualEventQuery::ending_from(date(2, 5)).with_text(Some(" ".into()));
        assert_eq!(query.text, None);
        assert_eq!(query.limit, DEFAULT_MANUAL_EVENT_LIMIT);
    }
}
