//! Typed request parameters for the transaction routes.
//!
//! Query strings are first deserialized as plain strings so that bad values
//! are reported with the same JSON error body as any other invalid input,
//! then validated once into the typed requests used by the queries.

use serde::Deserialize;
use time::Month;

use crate::{
    Error,
    pagination::{Page, PaginationConfig},
    transaction::month::{MonthRange, parse_month, parse_year, resolve_month_range},
};

/// The raw query parameters accepted by the report routes.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthQuery {
    /// The month number, 1-12.
    pub month: Option<String>,
    /// The year, defaults to the configured reference year.
    pub year: Option<String>,
}

/// The raw query parameters accepted by the listing route.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// The month number, 1-12.
    pub month: Option<String>,
    /// The year, defaults to the configured reference year.
    pub year: Option<String>,
    /// Text to search for in the title, description or price.
    pub search: Option<String>,
    /// The page number, starting at 1.
    pub page: Option<String>,
    /// The number of transactions per page.
    pub per_page: Option<String>,
}

/// A validated request for data about one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    /// The month to report on.
    pub month: Month,
    /// The year the month belongs to.
    pub year: i32,
}

impl ReportRequest {
    /// Validate the raw query, using `default_year` when no year was given.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the month is missing or invalid, or the year is invalid.
    pub fn from_query(query: &MonthQuery, default_year: i32) -> Result<Self, Error> {
        Ok(Self {
            month: parse_month(query.month.as_deref())?,
            year: parse_year(query.year.as_deref(), default_year)?,
        })
    }

    /// The range of instants covered by the requested month in `local_timezone`.
    ///
    /// # Errors
    /// See [resolve_month_range].
    pub fn month_range(&self, local_timezone: &str) -> Result<MonthRange, Error> {
        resolve_month_range(self.month, self.year, local_timezone)
    }
}

/// Free text to match against transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    /// The trimmed search text, matched as a case-insensitive substring.
    pub text: String,
    /// The search text as a price, if it is a number.
    pub price: Option<f64>,
}

impl Search {
    /// Create a search from user input, returns `None` if there is nothing to search for.
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_owned(),
            price: text.parse::<f64>().ok().filter(|price| price.is_finite()),
        })
    }
}

/// A validated request for a page of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    /// The month to list transactions for.
    pub period: ReportRequest,
    /// The optional search filter.
    pub search: Option<Search>,
    /// The page of results to return.
    pub page: Page,
}

impl ListingRequest {
    /// Validate the raw query.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the month, year, page or page size is invalid.
    pub fn from_query(
        query: &ListingQuery,
        default_year: i32,
        pagination_config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let period = ReportRequest::from_query(
            &MonthQuery {
                month: query.month.clone(),
                year: query.year.clone(),
            },
            default_year,
        )?;

        let page = Page::new(
            parse_positive_integer("page", query.page.as_deref())?,
            parse_positive_integer("perPage", query.per_page.as_deref())?,
            pagination_config,
        )?;

        Ok(Self {
            period,
            search: query.search.as_deref().and_then(Search::new),
            page,
        })
    }
}

fn parse_positive_integer(name: &str, value: Option<&str>) -> Result<Option<u64>, Error> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            Error::InvalidInput(format!(
                "Invalid {name} parameter \"{value}\", expected a positive whole number"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use crate::{
        Error,
        pagination::{Page, PaginationConfig},
    };

    use super::{ListingQuery, ListingRequest, MonthQuery, ReportRequest, Search};

    fn month_query(month: Option<&str>, year: Option<&str>) -> MonthQuery {
        MonthQuery {
            month: month.map(str::to_owned),
            year: year.map(str::to_owned),
        }
    }

    #[test]
    fn report_request_uses_default_year() {
        let got = ReportRequest::from_query(&month_query(Some("03"), None), 2022).unwrap();

        assert_eq!(
            got,
            ReportRequest {
                month: Month::March,
                year: 2022
            }
        );
    }

    #[test]
    fn report_request_rejects_bad_months() {
        for month in [None, Some("0"), Some("13"), Some("abc")] {
            let got = ReportRequest::from_query(&month_query(month, Some("2022")), 2022);

            assert!(
                matches!(got, Err(Error::InvalidInput(_))),
                "want invalid input for month {month:?}, got {got:?}"
            );
        }
    }

    #[test]
    fn listing_request_applies_defaults() {
        let query = ListingQuery {
            month: Some("3".to_owned()),
            ..Default::default()
        };

        let got = ListingRequest::from_query(&query, 2022, &PaginationConfig::default()).unwrap();

        assert_eq!(got.period.year, 2022);
        assert_eq!(got.search, None);
        assert_eq!(got.page, Page { number: 1, size: 10 });
    }

    #[test]
    fn listing_request_parses_page_and_search() {
        let query = ListingQuery {
            month: Some("3".to_owned()),
            year: Some("2021".to_owned()),
            search: Some("  Shirt ".to_owned()),
            page: Some("2".to_owned()),
            per_page: Some("5".to_owned()),
        };

        let got = ListingRequest::from_query(&query, 2022, &PaginationConfig::default()).unwrap();

        assert_eq!(got.period.year, 2021);
        assert_eq!(
            got.search,
            Some(Search {
                text: "Shirt".to_owned(),
                price: None
            })
        );
        assert_eq!(got.page, Page { number: 2, size: 5 });
    }

    #[test]
    fn listing_request_rejects_bad_pages() {
        for (page, per_page) in [("-1", "10"), ("one", "10"), ("0", "10"), ("1", "0")] {
            let query = ListingQuery {
                month: Some("3".to_owned()),
                page: Some(page.to_owned()),
                per_page: Some(per_page.to_owned()),
                ..Default::default()
            };

            let got = ListingRequest::from_query(&query, 2022, &PaginationConfig::default());

            assert!(
                matches!(got, Err(Error::InvalidInput(_))),
                "want invalid input for page={page} perPage={per_page}, got {got:?}"
            );
        }
    }

    #[test]
    fn numeric_search_also_matches_price() {
        let search = Search::new("329.85").unwrap();

        assert_eq!(search.text, "329.85");
        assert_eq!(search.price, Some(329.85));
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(Search::new("   "), None);
        assert_eq!(Search::new("NaN").and_then(|search| search.price), None);
    }
}
