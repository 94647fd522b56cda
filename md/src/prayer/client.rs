//! Prayer-time API client
//!
//! Fetches a full-year table for a fixed location from a muftyat.kz-style
//! endpoint and normalizes each day: `suhoor` is derived from fajr, `iftar`
//! is sunset (falling back to maghrib).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::subtract_minutes;

/// Errors from the prayer-time source
#[derive(Debug, Error)]
pub enum PrayerError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("prayer API returned no data for {0}")]
    EmptyYear(i32),

    #[error("no entry for date {0}")]
    DateNotFound(String),
}

/// One normalized day of prayer times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerDay {
    /// Gregorian date as `YYYY-MM-DD`.
    pub date: String,
    /// Display form, e.g. "6 Aug 2026".
    pub display_date: String,
    pub imsak: String,
    pub suhoor: String,
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub sunset: String,
    pub iftar: String,
    pub maghrib: String,
    pub isha: String,
    pub midnight: String,
}

// Raw wire format of the year endpoint

#[derive(Debug, Deserialize)]
struct YearResponse {
    #[serde(default)]
    result: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    #[serde(rename = "Date")]
    date: String,
    fajr: String,
    sunrise: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
    #[serde(default)]
    sunset: Option<String>,
    #[serde(default)]
    imsak: Option<String>,
    #[serde(default)]
    midnight: Option<String>,
}

/// Client for the year-table endpoint.
#[derive(Debug, Clone)]
pub struct PrayerClient {
    base_url: String,
    latitude: String,
    longitude: String,
    suhoor_offset_mins: u32,
    http: reqwest::Client,
}

impl PrayerClient {
    pub fn new(base_url: &str, latitude: &str, longitude: &str, suhoor_offset_mins: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            suhoor_offset_mins,
            http: reqwest::Client::new(),
        }
    }

    /// Fetch and normalize the full year table.
    pub async fn fetch_year(&self, year: i32) -> Result<Vec<PrayerDay>, PrayerError> {
        let url = format!(
            "{}/prayer-times/{}/{}/{}",
            self.base_url, year, self.latitude, self.longitude
        );
        info!(year, "fetching prayer times year table");

        let response: YearResponse = self.http.get(&url).send().await?.json().await?;

        if response.result.is_empty() {
            return Err(PrayerError::EmptyYear(year));
        }

        Ok(response
            .result
            .into_iter()
            .map(|raw| self.normalize(raw))
            .collect())
    }

    fn normalize(&self, raw: RawDay) -> PrayerDay {
        let suhoor = subtract_minutes(&raw.fajr, self.suhoor_offset_mins);
        let iftar = raw
            .sunset
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| raw.maghrib.clone());

        PrayerDay {
            display_date: display_date(&raw.date),
            date: raw.date,
            imsak: raw.imsak.unwrap_or_default(),
            suhoor,
            fajr: raw.fajr,
            sunrise: raw.sunrise,
            dhuhr: raw.dhuhr,
            asr: raw.asr,
            sunset: raw.sunset.unwrap_or_default(),
            iftar,
            maghrib: raw.maghrib,
            isha: raw.isha,
            midnight: raw.midnight.unwrap_or_default(),
        }
    }
}

/// `YYYY-MM-DD` → `6 Aug 2026`. Unparsable input is passed through.
fn display_date(date: &str) -> String {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%-d %b %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}
