//! Page models for the combined list and combined search pages.
//!
//! Both pages ask the aggregator for the full merged listing and slice it
//! locally. Aggregation failures are logged and rendered as an empty list;
//! raw error text never reaches the page.

use chrono::NaiveDate;
use eventdeck_core::{NormalizedEvent, Pagination};
use eventdeck_providers::QueryParams;
use serde::Serialize;
use tracing::{error, warn};

use crate::aggregator::{AggregationMode, EventAggregator, one_year_after};
use crate::config::PageSettings;
use crate::query::SearchFlags;

/// Sort field requested from the external source on search pages.
pub const SEARCH_SORT: &str = "startDate";

/// One rendered page of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEvents {
    pub events: Vec<NormalizedEvent>,
    pub pagination: Pagination,
}

impl PageEvents {
    fn paginate(all: Vec<NormalizedEvent>, per_page: usize, page: usize) -> Self {
        let pagination = Pagination::new(all.len(), per_page, page);
        Self {
            events: pagination.slice(&all),
            pagination,
        }
    }

    fn empty(per_page: usize, page: usize) -> Self {
        Self::paginate(Vec::new(), per_page, page)
    }
}

/// The combined upcoming events page.
pub struct CombinedEventsList<'a> {
    aggregator: &'a EventAggregator,
    settings: PageSettings,
    page: usize,
}

impl<'a> CombinedEventsList<'a> {
    /// Creates the page model for 1-based `page`.
    pub fn new(aggregator: &'a EventAggregator, settings: PageSettings, page: usize) -> Self {
        Self {
            aggregator,
            settings,
            page,
        }
    }

    /// Returns the intro text.
    pub fn description(&self) -> Option<&str> {
        self.settings.description.as_deref()
    }

    /// Returns the empty-list copy.
    pub fn no_results(&self) -> &str {
        &self.settings.no_results
    }

    /// Parameters sent to the external source.
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            start: Some(self.aggregator.today()),
            category_ids: self.settings.category_ids.clone(),
            page_size: self.aggregator.config().external_page_size,
            show_images: self.settings.show_images,
            ..QueryParams::default()
        }
    }

    /// Returns the current page of events.
    pub async fn events(&self) -> PageEvents {
        let per_page = self.settings.per_page();
        match self
            .aggregator
            .get_events(&self.query_params(), AggregationMode::List)
            .await
        {
            Ok(events) => PageEvents::paginate(events, per_page, self.page),
            Err(e) => {
                error!(
                    error = %e,
                    page = "list",
                    retryable = e.is_retryable(),
                    "Failed to load events"
                );
                PageEvents::empty(per_page, self.page)
            }
        }
    }
}

/// Raw search form input, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    pub text: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

impl SearchInput {
    fn term(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Values echoed back into the search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchForm {
    pub search_term: String,
    pub form_start_date: String,
    pub form_end_date: String,
}

/// The resolved date window of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub flags: SearchFlags,
}

impl SearchDates {
    /// Applies the search defaults: start is today unless typed and never
    /// before today, end is one year after today unless typed.
    ///
    /// Inputs that are not `YYYY-MM-DD` dates are ignored.
    pub fn resolve(input: &SearchInput, today: NaiveDate) -> Self {
        let start = parse_input("start_date", input.start_date.as_deref());
        let end = parse_input("end_date", input.end_date.as_deref());

        Self {
            start: start.map_or(today, |start| start.max(today)),
            end: end.unwrap_or_else(|| one_year_after(today)),
            flags: SearchFlags {
                explicit_start: start.is_some(),
                explicit_end: end.is_some(),
            },
        }
    }
}

fn parse_input(field: &'static str, value: Option<&str>) -> Option<NaiveDate> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(error) => {
            warn!(field, value, %error, "Ignoring invalid search date");
            None
        }
    }
}

/// The combined events search page.
pub struct CombinedEventsSearch<'a> {
    aggregator: &'a EventAggregator,
    settings: PageSettings,
    input: SearchInput,
    page: usize,
}

impl<'a> CombinedEventsSearch<'a> {
    /// Creates the page model for 1-based `page`.
    pub fn new(
        aggregator: &'a EventAggregator,
        settings: PageSettings,
        input: SearchInput,
        page: usize,
    ) -> Self {
        Self {
            aggregator,
            settings,
            input,
            page,
        }
    }

    /// Returns the intro text.
    pub fn description(&self) -> Option<&str> {
        self.settings.description.as_deref()
    }

    /// Returns the empty-list copy: a prompt when no term was entered.
    pub fn no_results(&self) -> &str {
        if self.input.term().is_empty() {
            &self.settings.no_search_term
        } else {
            &self.settings.no_results
        }
    }

    /// Returns the form values to echo back.
    pub fn form(&self) -> SearchForm {
        SearchForm {
            search_term: self.input.term().to_string(),
            form_start_date: self.input.start_date.clone().unwrap_or_default(),
            form_end_date: self.input.end_date.clone().unwrap_or_default(),
        }
    }

    /// Returns the resolved date window.
    pub fn dates(&self) -> SearchDates {
        SearchDates::resolve(&self.input, self.aggregator.today())
    }

    /// Parameters sent to the external source.
    pub fn query_params(&self) -> QueryParams {
        let dates = self.dates();
        let term = self.input.term();
        QueryParams {
            text: (!term.is_empty()).then(|| term.to_string()),
            start: Some(dates.start),
            end: Some(dates.end),
            category_ids: self.settings.category_ids.clone(),
            sort: Some(SEARCH_SORT.to_string()),
            page_size: self.aggregator.config().external_page_size,
            page: Some(1),
            show_images: self.settings.show_images,
            ..QueryParams::default()
        }
    }

    /// Returns the current page of results.
    pub async fn events(&self) -> PageEvents {
        let per_page = self.settings.per_page();
        let mode = AggregationMode::Search(self.dates().flags);
        match self
            .aggregator
            .get_events(&self.query_params(), mode)
            .await
        {
            Ok(events) => PageEvents::paginate(events, per_page, self.page),
            Err(e) => {
                error!(
                    error = %e,
                    page = "search",
                    retryable = e.is_retryable(),
                    "Failed to load events"
                );
                PageEvents::empty(per_page, self.page)
            }
        }
    }
}
