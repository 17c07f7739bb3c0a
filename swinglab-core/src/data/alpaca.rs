//! Alpaca market-data source.
//!
//! Fetches daily bars from the v2 stock bars endpoint (IEX feed), following
//! `next_page_token` until exhausted. Retries connection failures, timeouts,
//! 429s and 5xx responses with exponential backoff.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

use super::provider::{clean_bars, BarSource, DataError};
use crate::domain::Bar;

const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets";

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: String,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: u64,
}

/// API credentials for the market-data endpoint.
#[derive(Clone)]
pub struct AlpacaCredentials {
    pub key_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for AlpacaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaCredentials")
            .field("key_id", &self.key_id)
            .field("secret_key", &"***")
            .finish()
    }
}

pub struct AlpacaBarSource {
    client: reqwest::blocking::Client,
    credentials: AlpacaCredentials,
    base_url: String,
    feed: String,
    max_retries: u32,
    base_delay: Duration,
}

impl AlpacaBarSource {
    pub fn new(credentials: AlpacaCredentials) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            feed: "iex".to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn bars_url(&self, symbol: &str) -> String {
        format!("{}/v2/stocks/{symbol}/bars", self.base_url.trim_end_matches('/'))
    }

    fn parse_bar(symbol: &str, raw: AlpacaBar) -> Result<Bar, DataError> {
        let date = DateTime::parse_from_rfc3339(&raw.t)
            .map(|dt| dt.naive_utc().date())
            .map_err(|e| DataError::ResponseFormatChanged(format!("bad timestamp {}: {e}", raw.t)))?;
        Ok(Bar {
            symbol: symbol.to_string(),
            date,
            open: raw.o,
            high: raw.h,
            low: raw.l,
            close: raw.c,
            volume: raw.v,
        })
    }

    fn fetch_page(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        page_token: Option<&str>,
    ) -> Result<BarsResponse, DataError> {
        let mut query: Vec<(&str, String)> = vec![
            ("timeframe", "1Day".to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("feed", self.feed.clone()),
            ("adjustment", "raw".to_string()),
            ("limit", "10000".to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let url = self.bars_url(symbol);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }

            let sent = self
                .client
                .get(&url)
                .header("APCA-API-KEY-ID", &self.credentials.key_id)
                .header("APCA-API-SECRET-KEY", &self.credentials.secret_key)
                .query(&query)
                .send();

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(DataError::AuthenticationRequired(format!(
                    "HTTP {status} from Alpaca market data"
                )));
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status.is_server_error() {
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }
            if !status.is_success() {
                return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
            }

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
            return serde_json::from_str(&body).map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse bars for {symbol}: {e}"))
            });
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl BarSource for AlpacaBarSource {
    fn name(&self) -> &str {
        "alpaca"
    }

    fn get_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let symbol = symbol.to_uppercase();
        let mut bars = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.fetch_page(&symbol, start, end, token.as_deref())?;
            for raw in page.bars.unwrap_or_default() {
                bars.push(Self::parse_bar(&symbol, raw)?);
            }
            match page.next_page_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }
        log::debug!("alpaca: {} bars for {symbol} {start}..{end}", bars.len());
        Ok(clean_bars(&symbol, bars))
    }
}
