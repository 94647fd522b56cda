//! Prayer times for a fixed location
//!
//! A cached pass-through to an external year-table API plus pure date
//! arithmetic. The year table is held in an explicit [`TtlCache`] owned by
//! the service (spawned at startup, gone at shutdown) rather than any
//! process-wide state.

mod cache;
mod client;

pub use cache::TtlCache;
pub use client::{PrayerClient, PrayerDay, PrayerError};

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::PrayerConfig;

/// Subtract minutes from an `HH:MM` string, wrapping around midnight.
///
/// Inputs that are not `HH:MM` are returned unchanged.
pub fn subtract_minutes(time: &str, mins: u32) -> String {
    let Some((h, m)) = time.split_once(':') else {
        return time.to_string();
    };
    let (Ok(h), Ok(m)) = (h.parse::<i64>(), m.parse::<i64>()) else {
        return time.to_string();
    };

    let total = (h * 60 + m - mins as i64).rem_euclid(24 * 60);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Today's prayer times in the shape the dashboard consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrayers {
    pub date: String,
    pub source: String,
    pub prayers: PrayerSet,
    pub suhoor: String,
    pub iftar: String,
    pub midnight: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrayerSet {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

/// Fetch-through service: year table per request year, cached with a
/// bounded TTL.
pub struct PrayerService {
    client: PrayerClient,
    cache: Mutex<TtlCache<Vec<PrayerDay>>>,
    source: String,
}

impl PrayerService {
    pub fn new(config: &PrayerConfig) -> Self {
        Self {
            client: PrayerClient::new(
                &config.base_url,
                &config.latitude,
                &config.longitude,
                config.suhoor_offset_mins,
            ),
            cache: Mutex::new(TtlCache::new(Duration::from_secs(config.cache_ttl_secs))),
            source: config.base_url.clone(),
        }
    }

    /// The full year table, from cache when fresh.
    async fn year_data(&self, year: i32) -> Result<Vec<PrayerDay>, PrayerError> {
        let key = format!("year-{}", year);

        {
            let mut cache = self.cache.lock().await;
            if let Some(days) = cache.get(&key) {
                return Ok(days);
            }
        }

        let days = self.client.fetch_year(year).await?;

        let mut cache = self.cache.lock().await;
        cache.insert(key, days.clone());
        Ok(days)
    }

    /// Today's entry.
    pub async fn today(&self) -> Result<DailyPrayers, PrayerError> {
        let now = Local::now();
        let date = now.format("%Y-%m-%d").to_string();

        let days = self.year_data(now.year()).await?;
        let day = days
            .iter()
            .find(|d| d.date == date)
            .ok_or_else(|| PrayerError::DateNotFound(date.clone()))?;

        Ok(DailyPrayers {
            date: day.display_date.clone(),
            source: self.source.clone(),
            prayers: PrayerSet {
                fajr: day.fajr.clone(),
                sunrise: day.sunrise.clone(),
                dhuhr: day.dhuhr.clone(),
                asr: day.asr.clone(),
                maghrib: day.maghrib.clone(),
                isha: day.isha.clone(),
            },
            suhoor: day.suhoor.clone(),
            iftar: day.iftar.clone(),
            midnight: day.midnight.clone(),
        })
    }

    /// All entries of one calendar month (for the fasting calendar view).
    pub async fn month(&self, year: i32, month: u32) -> Result<Vec<PrayerDay>, PrayerError> {
        let days = self.year_data(year).await?;
        Ok(days
            .into_iter()
            .filter(|d| {
                d.date
                    .split('-')
                    .nth(1)
                    .and_then(|m| m.parse::<u32>().ok())
                    .is_some_and(|m| m == month)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtract_minutes_basic() {
        assert_eq!(subtract_minutes("04:10", 10), "04:00");
        assert_eq!(subtract_minutes("13:05", 65), "12:00");
    }

    #[test]
    fn test_subtract_minutes_wraps_midnight() {
        assert_eq!(subtract_minutes("00:05", 10), "23:55");
        assert_eq!(subtract_minutes("00:00", 1), "23:59");
    }

    #[test]
    fn test_subtract_minutes_zero() {
        assert_eq!(subtract_minutes("05:30", 0), "05:30");
    }

    #[test]
    fn test_subtract_minutes_garbage_passthrough() {
        assert_eq!(subtract_minutes("soon", 10), "soon");
        assert_eq!(subtract_minutes("a:b", 10), "a:b");
    }
}
