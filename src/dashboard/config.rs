//! Configuration for the month reports.

use crate::Error;

/// The year used by requests that do not specify one.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2022;

/// The price boundaries used for the histogram when none are configured.
pub const DEFAULT_PRICE_BOUNDARIES: [f64; 10] =
    [0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0];

/// Settings that control how months are resolved and reported on.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// The year to use when a request does not specify one.
    pub reference_year: i32,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Months start and end at midnight in this timezone.
    pub local_timezone: String,
    /// The buckets for the price-range histogram.
    pub price_ranges: PriceRanges,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            local_timezone: "Etc/UTC".to_owned(),
            price_ranges: PriceRanges::default(),
        }
    }
}

/// The lower bounds of the contiguous price ranges used by the histogram.
///
/// Range `i` covers `[boundaries[i], boundaries[i + 1])` and the last range
/// has no upper bound. Prices below the first boundary are counted in the
/// first range.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRanges {
    boundaries: Vec<f64>,
}

impl PriceRanges {
    /// Create price ranges from their lower bounds.
    ///
    /// # Errors
    /// Returns [Error::InvalidPriceRanges] if `boundaries` is empty, contains a
    /// value that is not finite, or is not strictly increasing.
    pub fn new(boundaries: Vec<f64>) -> Result<Self, Error> {
        if boundaries.is_empty() {
            return Err(Error::InvalidPriceRanges(
                "at least one boundary is required".to_owned(),
            ));
        }

        if let Some(boundary) = boundaries.iter().find(|boundary| !boundary.is_finite()) {
            return Err(Error::InvalidPriceRanges(format!(
                "{boundary} is not a finite number"
            )));
        }

        if let Some(pair) = boundaries.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidPriceRanges(format!(
                "boundaries must be strictly increasing, but {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { boundaries })
    }

    /// The number of price ranges.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// The index of the range that `price` falls in.
    pub fn index_of(&self, price: f64) -> usize {
        self.boundaries
            .partition_point(|&boundary| boundary <= price)
            .saturating_sub(1)
    }

    /// The lower and upper bound of the range at `index`, `None` for an unbounded upper bound.
    pub fn bounds(&self, index: usize) -> (f64, Option<f64>) {
        (
            self.boundaries[index],
            self.boundaries.get(index + 1).copied(),
        )
    }

    /// A label for the range at `index`, e.g. "100-200" or "900+" for the last range.
    pub fn label(&self, index: usize) -> String {
        match self.bounds(index) {
            (min, Some(max)) => format!("{}-{}", format_bound(min), format_bound(max)),
            (min, None) => format!("{}+", format_bound(min)),
        }
    }
}

impl Default for PriceRanges {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_PRICE_BOUNDARIES.to_vec(),
        }
    }
}

/// Format whole numbers without a trailing ".0".
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::PriceRanges;

    #[test]
    fn default_ranges_are_hundreds_up_to_nine_hundred() {
        let ranges = PriceRanges::default();

        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges.label(0), "0-100");
        assert_eq!(ranges.label(8), "800-900");
        assert_eq!(ranges.label(9), "900+");
        assert_eq!(ranges.bounds(9), (900.0, None));
    }

    #[test]
    fn index_of_uses_half_open_ranges() {
        let ranges = PriceRanges::default();

        assert_eq!(ranges.index_of(0.0), 0);
        assert_eq!(ranges.index_of(99.99), 0);
        assert_eq!(ranges.index_of(100.0), 1);
        assert_eq!(ranges.index_of(899.99), 8);
        assert_eq!(ranges.index_of(900.0), 9);
        assert_eq!(ranges.index_of(1_000_000.0), 9);
    }

    #[test]
    fn prices_below_first_boundary_go_in_first_range() {
        let ranges = PriceRanges::new(vec![10.0, 20.0]).unwrap();

        assert_eq!(ranges.index_of(-5.0), 0);
        assert_eq!(ranges.index_of(5.0), 0);
    }

    #[test]
    fn labels_fractional_bounds() {
        let ranges = PriceRanges::new(vec![0.0, 9.99]).unwrap();

        assert_eq!(ranges.label(0), "0-9.99");
        assert_eq!(ranges.label(1), "9.99+");
    }

    #[test]
    fn rejects_invalid_boundaries() {
        for boundaries in [
            vec![],
            vec![0.0, f64::INFINITY],
            vec![0.0, f64::NAN],
            vec![0.0, 100.0, 100.0],
            vec![200.0, 100.0],
        ] {
            let result = PriceRanges::new(boundaries.clone());

            assert!(
                matches!(result, Err(Error::InvalidPriceRanges(_))),
                "want error for {boundaries:?}, got {result:?}"
            );
        }
    }
}
