//! Alpha Vantage daily time series client.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::error::FetchError;
use crate::domain::ohlcv::RawRow;
use crate::ports::quote_port::QuotePort;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

const SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

pub struct AlphaVantageAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    output_size: String,
}

impl AlphaVantageAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        output_size: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            output_size: output_size.into(),
        })
    }
}

impl QuotePort for AlphaVantageAdapter {
    fn fetch_daily(&self, symbol: &str) -> Result<Vec<RawRow>, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
                ("outputsize", self.output_size.as_str()),
            ])
            .send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let rows = parse_daily_response(&body)?;
        tracing::info!(symbol, bars = rows.len(), "fetched daily bars");
        Ok(rows)
    }
}

/// Turn a daily time series body into rows, ascending by date.
pub fn parse_daily_response(body: &str) -> Result<Vec<RawRow>, FetchError> {
    let parsed: DailyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let Some(series) = parsed.series else {
        let detail = parsed
            .error_message
            .or(parsed.note)
            .or(parsed.information)
            .map(|m| format!(": {m}"))
            .unwrap_or_default();
        return Err(FetchError::Malformed(format!("'{SERIES_KEY}' not in data{detail}")));
    };

    Ok(series
        .into_iter()
        .map(|(date, bar)| RawRow {
            date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect())
}
