use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};
use std::time::Duration;

use crate::{Conditions, Config, ForecastDay};

use super::ForecastService;

/// Generates a plausible forecast locally, with optional delay and failure.
#[derive(Debug, Clone)]
pub struct DemoService {
    location: Option<String>,
    start: NaiveDate,
    days: usize,
    latency: Duration,
    fail_forecast: bool,
}

impl DemoService {
    pub fn new(location: Option<String>, start: NaiveDate, days: usize) -> Self {
        Self { location, start, days, latency: Duration::ZERO, fail_forecast: false }
    }

    pub fn from_config(config: &Config, start: NaiveDate) -> Self {
        Self {
            location: config.location_name().map(str::to_owned),
            start,
            days: config.days,
            latency: Duration::from_millis(config.demo.latency_ms),
            fail_forecast: config.demo.fail_forecast,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_forecast = true;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Deterministic for a given location and date.
    fn conditions_for(&self, date: NaiveDate) -> Conditions {
        let seed: usize = self.location.as_deref().unwrap_or_default().bytes().map(usize::from).sum();
        let all = Conditions::all();
        all[(seed + date.ordinal0() as usize) % all.len()]
    }
}

#[async_trait]
impl ForecastService for DemoService {
    async fn location_name(&self) -> Result<String> {
        self.simulate_latency().await;
        self.location
            .clone()
            .ok_or_else(|| anyhow!("No location configured.\nHint: pass --location or run `forecast configure`."))
    }

    async fn daily_forecast(&self) -> Result<Vec<ForecastDay>> {
        self.simulate_latency().await;
        if self.fail_forecast {
            bail!("Demo forecast service is configured to fail");
        }

        (0..self.days)
            .map(|offset| {
                let date = self
                    .start
                    .checked_add_days(Days::new(offset as u64))
                    .ok_or_else(|| anyhow!("Forecast date out of range: {} + {offset} days", self.start))?;
                Ok::<_, anyhow::Error>(ForecastDay::with_default_icon(date, self.conditions_for(date)))
            })
            .collect()
    }
}
