/*
 *  weather.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	weatherapi.com current conditions client
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use log::{debug, info};
use reqwest::{Client, Request, header};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::config::ApiConfig;

/// Errors raised while talking to the weather API.
#[derive(Debug, Error)]
pub enum WeatherApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Weather API error {0}: {1}")]
    Status(u16, String),
    #[error("JSON deserialization error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Weather API key required: {0}")]
    ApiKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub temp_c: Option<f64>,
    #[serde(default)]
    pub cloud: Option<i64>,
    #[serde(default)]
    pub is_day: Option<u8>,
    #[serde(default)]
    pub condition: Option<Condition>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// As reported, e.g. "2024-05-01 14:05".
    #[serde(default)]
    pub localtime: Option<String>,
    #[serde(default)]
    pub tz_id: Option<String>,
}

/// One fetched payload for one location. Every field is optional so a
/// partial response still decodes; consumers check what they need.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub location: LocationInfo,
    #[serde(default)]
    pub current: CurrentWeather,
}

impl WeatherSnapshot {
    pub fn temp_c(&self) -> Option<f64> {
        self.current.temp_c
    }

    pub fn cloud(&self) -> Option<i64> {
        self.current.cloud
    }

    pub fn condition_text(&self) -> Option<&str> {
        self.current.condition.as_ref().and_then(|c| c.text.as_deref())
    }

    pub fn icon_url(&self) -> Option<String> {
        let icon = self.current.condition.as_ref()?.icon.as_deref()?;
        // the API hands back protocol-relative urls
        if icon.starts_with("//") {
            Some(format!("https:{}", icon))
        } else {
            Some(icon.to_string())
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.lat.zip(self.location.lon)
    }

    /// Timezone id, only when the clock can also fall back to `localtime`.
    pub fn clock_zone(&self) -> Option<&str> {
        match (&self.location.tz_id, &self.location.localtime) {
            (Some(tz), Some(_)) if !tz.is_empty() => Some(tz.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[allow(dead_code)]
    code: Option<i64>,
    message: String,
}

/// Anything that can produce a snapshot for a location query.
pub trait WeatherSource {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<WeatherSnapshot, WeatherApiError>> + Send;
}

/// weatherapi.com `current.json` client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl WeatherClient {
    pub fn new(api_key: &str, api: &ApiConfig) -> Result<Self, WeatherApiError> {
        const VERSION: &str = concat!("SkyCard ", env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        if api_key.trim().is_empty() {
            return Err(WeatherApiError::ApiKey("no key specified".to_string()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(api.connect_timeout_ms))
            .default_headers(headers)
            .timeout(Duration::from_millis(api.timeout_ms))
            .build()?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            client,
        })
    }

    /// Builds the GET for `query` without sending it.
    pub fn build_request(&self, query: &str) -> Result<Request, WeatherApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherApiError::InvalidInput("empty location query".to_string()));
        }
        let url = format!("{}/current.json", self.base_url);
        let request = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .build()?;
        Ok(request)
    }
}

impl WeatherSource for WeatherClient {
    async fn fetch(&self, query: &str) -> Result<WeatherSnapshot, WeatherApiError> {
        let request = self.build_request(query)?;
        info!("Fetching weather for {}...", query.trim());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Weather API replied {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        info!(
            "Weather fetched for {}",
            snapshot.location.name.as_deref().unwrap_or(query.trim())
        );
        Ok(snapshot)
    }
}

fn status_error(status: u16, body: &str) -> WeatherApiError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => WeatherApiError::Status(status, parsed.error.message),
        Err(_) => WeatherApiError::Status(status, "unexpected response".to_string()),
    }
}
