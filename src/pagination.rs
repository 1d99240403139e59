//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions to return per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A validated, 1-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The page number, starting at 1.
    pub number: u64,
    /// The maximum number of items on the page.
    pub size: u64,
}

impl Page {
    /// Build a page from optional request values, falling back to the defaults in `config`.
    ///
    /// Page sizes larger than [PaginationConfig::max_page_size] are reduced to it.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the page number or size is zero.
    pub fn new(
        number: Option<u64>,
        size: Option<u64>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let number = number.unwrap_or(config.default_page);
        let size = size.unwrap_or(config.default_page_size);

        if number == 0 {
            return Err(Error::InvalidInput(
                "Invalid page parameter, pages start at 1".to_owned(),
            ));
        }

        if size == 0 {
            return Err(Error::InvalidInput(
                "Invalid perPage parameter, must be at least 1".to_owned(),
            ));
        }

        if size > config.max_page_size {
            tracing::debug!(
                "Reducing page size {size} to the maximum of {}",
                config.max_page_size
            );
        }

        Ok(Self {
            number,
            size: size.min(config.max_page_size),
        })
    }

    /// The number of items to skip to get to the start of this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        pagination::{Page, PaginationConfig},
    };

    #[test]
    fn uses_defaults_when_not_specified() {
        let config = PaginationConfig::default();

        let page = Page::new(None, None, &config).unwrap();

        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let config = PaginationConfig::default();

        let page = Page::new(Some(3), Some(25), &config).unwrap();

        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn rejects_page_zero() {
        let config = PaginationConfig::default();

        let result = Page::new(Some(0), None, &config);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_page_size_zero() {
        let config = PaginationConfig::default();

        let result = Page::new(None, Some(0), &config);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn clamps_page_size_to_maximum() {
        let config = PaginationConfig {
            max_page_size: 50,
            ..Default::default()
        };

        assert_eq!(Page::new(None, Some(50), &config).unwrap().size, 50);
        assert_eq!(Page::new(None, Some(51), &config).unwrap().size, 50);
        assert_eq!(Page::new(Some(2), Some(1000), &config).unwrap().offset(), 50);
    }
}
