//! The client for the external transaction feed and the rules for turning
//! feed items into transactions.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{
    Error,
    transaction::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_TITLE, Transaction, TransactionBuilder},
};

/// The feed used when no other URL is configured.
pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// How long to wait for the feed before giving up.
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to fetch the transaction feed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// The URL of the JSON feed.
    pub url: String,
    /// The timeout for the whole request.
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_owned(),
            timeout: DEFAULT_FEED_TIMEOUT,
        }
    }
}

/// One item of the transaction feed.
///
/// Every field is optional. Values of the wrong type are read leniently:
/// numeric strings are accepted as prices, numbers as epoch millisecond
/// dates, and anything that cannot be read is treated as missing. Missing
/// values are filled in by [FeedItem::normalize].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// The product name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    /// The product description.
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    /// The listed price.
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    /// When the sale happened.
    #[serde(default, deserialize_with = "lenient_sale_date")]
    pub date_of_sale: Option<SaleDate>,
    /// Whether the product sold. The live feed calls this `sold`.
    #[serde(default, alias = "sold", deserialize_with = "lenient_flag")]
    pub is_sold: Option<bool>,
    /// The product category.
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    /// A URL to an image of the product.
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
}

/// A sale date as it appears in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleDate {
    /// An RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
    Text(String),
    /// Milliseconds since the Unix epoch.
    UnixMillis(i64),
}

impl SaleDate {
    fn to_date_time(&self) -> Option<OffsetDateTime> {
        match self {
            SaleDate::Text(text) => parse_date_of_sale(text),
            SaleDate::UnixMillis(millis) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(*millis) * 1_000_000).ok()
            }
        }
    }
}

impl FeedItem {
    /// Turn the feed item into a transaction, applying the defaults for
    /// missing or empty values.
    ///
    /// `ingested_at` is used as the sale date when the item has no usable date.
    pub fn normalize(self, ingested_at: OffsetDateTime) -> TransactionBuilder {
        let date_of_sale = match &self.date_of_sale {
            Some(date) => date.to_date_time().unwrap_or_else(|| {
                tracing::warn!("Could not parse sale date {date:?}, using the ingest time");
                ingested_at
            }),
            None => ingested_at,
        };

        let price = self.price.filter(|price| price.is_finite()).unwrap_or(0.0);

        Transaction::build(
            non_empty_or(self.title, DEFAULT_TITLE).as_str(),
            price,
            date_of_sale,
        )
        .description(&non_empty_or(self.description, DEFAULT_DESCRIPTION))
        .is_sold(self.is_sold.unwrap_or(false))
        .category(&non_empty_or(self.category, DEFAULT_CATEGORY))
        .image(&self.image.unwrap_or_default())
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Parse an RFC 3339 timestamp, or a plain date which is taken as midnight UTC.
fn parse_date_of_sale(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight().assume_utc())
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_f64().map(|number| number != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_sale_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SaleDate>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) if !text.trim().is_empty() => Some(SaleDate::Text(text)),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis as i64)
            })
            .map(SaleDate::UnixMillis),
        _ => None,
    })
}

/// A HTTP client for the transaction feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Create a client for the feed described by `config`.
    ///
    /// # Errors
    /// Returns [Error::FeedError] if the HTTP client could not be built.
    pub fn new(config: &FeedConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::FeedError(error.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// The URL the client fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode every item in the feed.
    ///
    /// # Errors
    /// Returns [Error::FeedError] if the request fails, the feed responds
    /// with a non-success status or the body is not a JSON array. Array
    /// elements that are not objects are skipped.
    pub async fn fetch(&self) -> Result<Vec<FeedItem>, Error> {
        tracing::info!("Fetching transactions from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|error| Error::FeedError(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedError(format!("the feed responded with {status}")));
        }

        let values: Vec<Value> = response
            .json()
            .await
            .map_err(|error| Error::FeedError(error.to_string()))?;

        let items: Vec<FeedItem> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(error) => {
                    tracing::warn!("Skipping feed item {index}: {error}");
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} items", items.len());

        Ok(items)
    }
}
