use reqwest::Client as HttpClient;
use serde_json::Value;
use url::Url;

use crate::api::models::{CountryOption, RawCountry};
use crate::error::ApiError;

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,idd,cca2,flags";

/// Dialing-code directory used to fill the country selector.
pub struct CountryClient {
    pub http: HttpClient,
    pub url: Url,
}

impl CountryClient {
    pub fn new(url: &str) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { http, url: Url::parse(url)? })
    }

    /// Fetch and validate the country list. Malformed entries are dropped
    /// here so callers only ever see usable calling codes.
    pub async fn countries(&self) -> Result<Vec<CountryOption>, ApiError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        parse_countries(&body)
    }
}

/// Turn a restcountries JSON array into sorted selector options.
///
/// Accepts a bare array or an object wrapping it under `data`. Entries without
/// a common name or an `idd.root` are skipped, as are entries that do not
/// decode at all.
pub fn parse_countries(body: &str) -> Result<Vec<CountryOption>, ApiError> {
    let json: Value = serde_json::from_str(body)?;
    let items = json
        .as_array()
        .cloned()
        .or_else(|| json.get("data").and_then(|v| v.as_array()).cloned())
        .unwrap_or_default();

    let mut out: Vec<CountryOption> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawCountry>(item).ok())
        .filter_map(RawCountry::into_option)
        .collect();
    out.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    log::debug!("country directory: {} usable entries", out.len());
    Ok(out)
}
