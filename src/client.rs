// Port Schedule Monitor - HTTP Client
// Fetches the schedule and roster feeds

use crate::config::Settings;
use crate::error::FetchError;
use crate::roster::RosterSnapshot;
use crate::schedule::{transform_records, ScheduleEntry};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    schedule_url: String,
    roster_url: String,
}

impl ScheduleClient {
    pub fn new(schedule_url: impl Into<String>, roster_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            schedule_url: schedule_url.into(),
            roster_url: roster_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.schedule_url.clone(), settings.roster_url.clone())
    }

    /// GET the schedule and normalize every record
    pub async fn fetch_schedule(&self) -> Result<Vec<ScheduleEntry>, FetchError> {
        let records: Vec<Value> = self.get_json(&self.schedule_url).await?;
        debug!(records = records.len(), "fetched schedule records");
        Ok(transform_records(&records))
    }

    /// GET the daily roster
    pub async fn fetch_roster(&self) -> Result<RosterSnapshot, FetchError> {
        self.get_json(&self.roster_url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
