use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::RestConfig;
use crate::domain::{Order, Restaurant};
use crate::geometry::Region;

const USER_AGENT: &str = concat!("dronepath/", env!("CARGO_PKG_VERSION"));

/// Seconds to wait before the first retry; later retries wait proportionally longer.
const RETRY_BACKOFF_SECS: u64 = 2;

/// Blocking client for the order/restaurant/region REST service.
pub struct RestClient {
    base_url: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

impl RestClient {
    pub fn new(base_url: &str, config: &RestConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: normalize_base_url(base_url),
            client,
            max_retries: config.max_retries.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Orders placed on `date`.
    pub fn fetch_orders(&self, date: NaiveDate) -> Result<Vec<Order>> {
        self.get_json(&format!("orders/{}", date.format("%Y-%m-%d")))
            .context("Failed to fetch orders")
    }

    pub fn fetch_restaurants(&self) -> Result<Vec<Restaurant>> {
        self.get_json("restaurants").context("Failed to fetch restaurants")
    }

    pub fn fetch_no_fly_zones(&self) -> Result<Vec<Region>> {
        self.get_json("noFlyZones")
            .context("Failed to fetch no-fly zones")
    }

    pub fn fetch_central_area(&self) -> Result<Region> {
        self.get_json("centralArea")
            .context("Failed to fetch central area")
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    ///
    /// Rate limiting (429) and server errors (5xx) are retried with a linear
    /// back-off; any other non-success status fails immediately.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let wait_secs = RETRY_BACKOFF_SECS * attempt as u64;
                log::warn!(
                    "{} unavailable, retrying in {} seconds (attempt {}/{})",
                    url,
                    wait_secs,
                    attempt + 1,
                    self.max_retries
                );
                std::thread::sleep(Duration::from_secs(wait_secs));
            }

            let response = self
                .client
                .get(&url)
                .send()
                .with_context(|| format!("Failed to send request to {}", url))?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json()
                    .with_context(|| format!("Failed to parse JSON response from {}", url));
            }
            if is_retriable(status) {
                last_error = Some(format!(
                    "{} returned status {} (attempt {})",
                    url,
                    status,
                    attempt + 1
                ));
                continue;
            }
            bail!("{} returned error status: {}", url, status);
        }

        bail!(
            "{} failed after {} attempts: {}",
            url,
            self.max_retries,
            last_error.unwrap_or_else(|| "Unknown error".to_string())
        )
    }
}

fn is_retriable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
