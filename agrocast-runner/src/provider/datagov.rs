//! Data.gov.in mandi price feed.
//!
//! Queries the daily commodity price resource for the ten most recent
//! records of a crop. Records arrive newest first; they are reversed into
//! chronological order before estimation.

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use agrocast_core::{classify_price_state, PriceRecord};

use super::fallback::fallback_prices;
use super::{
    api_key_from_env, http_client, transport_error, FeedError, PriceFeed, PriceObservations,
    SourceTag,
};

pub const DATA_GOV_ENDPOINT: &str =
    "https://api.data.gov.in/resource/9ef84268-d588-465a-a308-a864a43d0070";
pub const DATA_GOV_KEY_VAR: &str = "DATA_GOV_API_KEY";
pub const DATA_GOV_SOURCE_NAME: &str = "Data.gov.in";

const RECORD_LIMIT: &str = "10";
const ARRIVAL_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize)]
struct MandiResponse {
    #[serde(default)]
    records: Vec<MandiRecord>,
}

#[derive(Debug, Deserialize)]
struct MandiRecord {
    #[serde(default)]
    modal_price: Option<serde_json::Value>,
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    arrival_date: Option<String>,
}

impl MandiRecord {
    /// The API serves prices as strings; accept numbers too.
    fn price(&self) -> Option<f64> {
        let p = match self.modal_price.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64()?,
            serde_json::Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (p.is_finite() && p > 0.0).then_some(p)
    }
}

/// Crop key to the commodity name the resource filters on.
const COMMODITIES: &[(&str, &str)] = &[
    ("wheat", "Wheat"),
    ("rice", "Rice"),
    ("cotton", "Cotton"),
    ("sugarcane", "Sugarcane"),
    ("groundnut", "Groundnut"),
    ("maize", "Maize"),
    ("paddy", "Paddy"),
    ("pulses", "Arhar"),
];

/// Commodity name the resource filters on. Unknown crops pass through as
/// given.
pub fn commodity_name(crop: &str) -> String {
    let key = crop.trim().to_lowercase();
    COMMODITIES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or_else(|| crop.to_string(), |(_, name)| (*name).to_string())
}

/// Parse a response body into observations. `today` dates records that
/// carry no arrival date.
pub fn parse_response(
    crop: &str,
    body: &str,
    today: NaiveDate,
) -> Result<PriceObservations, FeedError> {
    let resp: MandiResponse = serde_json::from_str(body)
        .map_err(|e| FeedError::ResponseFormatChanged(format!("mandi prices for {crop}: {e}")))?;
    observations_from_records(crop, &resp.records, today)
}

fn observations_from_records(
    crop: &str,
    records: &[MandiRecord],
    today: NaiveDate,
) -> Result<PriceObservations, FeedError> {
    let latest = records.first().ok_or_else(|| FeedError::NoRecords {
        subject: crop.to_string(),
    })?;
    let current_price = latest.price().ok_or_else(|| {
        FeedError::ResponseFormatChanged(format!("latest {crop} record has no usable modal_price"))
    })?;

    let change_pct = records
        .get(1)
        .and_then(MandiRecord::price)
        .map_or(0.0, |prev| {
            agrocast_core::simulate::round_to((current_price - prev) / prev * 100.0, 2)
        });

    let mut history: Vec<PriceRecord> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let price = r.price()?;
            let date = r
                .arrival_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), ARRIVAL_DATE_FORMAT).ok())
                .unwrap_or(today - Duration::days(i as i64));
            Some(PriceRecord { date, price })
        })
        .collect();
    history.reverse();

    Ok(PriceObservations {
        crop: crop.to_string(),
        current_price,
        change_pct,
        trend: classify_price_state(change_pct),
        history,
        market: latest
            .market
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        source: SourceTag::Live,
        source_name: DATA_GOV_SOURCE_NAME.to_string(),
    })
}

/// Live price feed backed by the Data.gov.in API.
pub struct DataGovPriceFeed {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl DataGovPriceFeed {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FeedError> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            endpoint: DATA_GOV_ENDPOINT.to_string(),
        })
    }

    /// Build from `DATA_GOV_API_KEY`.
    pub fn from_env() -> Result<Self, FeedError> {
        Self::new(api_key_from_env(DATA_GOV_KEY_VAR)?)
    }

    /// Point at a different resource URL (a proxy or a local stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn try_fetch(&self, crop: &str) -> Result<PriceObservations, FeedError> {
        let commodity = commodity_name(crop);
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("filters[commodity]", commodity.as_str()),
                ("limit", RECORD_LIMIT),
                ("sort[timestamp]", "desc"),
            ])
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                subject: crop.to_string(),
            });
        }
        let body = resp.text().map_err(transport_error)?;
        parse_response(crop, &body, Utc::now().date_naive())
    }
}

impl PriceFeed for DataGovPriceFeed {
    fn name(&self) -> &str {
        DATA_GOV_SOURCE_NAME
    }

    fn fetch_prices(&self, crop: &str) -> PriceObservations {
        match self.try_fetch(crop) {
            Ok(obs) => {
                info!(crop, records = obs.history.len(), "live prices fetched");
                obs
            }
            Err(e) => {
                warn!(crop, error = %e, "price feed failed, using fallback");
                fallback_prices(crop)
            }
        }
    }
}
