use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{Config, ForecastDay, service::demo::DemoService};

pub mod demo;

/// Request/response access to forecast data, independent of any screen.
#[async_trait]
pub trait ForecastService: Send + Sync + Debug {
    async fn location_name(&self) -> anyhow::Result<String>;

    async fn daily_forecast(&self) -> anyhow::Result<Vec<ForecastDay>>;
}

/// Construct the service described by `config`, with forecasts starting on `start`.
pub fn service_from_config(config: &Config, start: NaiveDate) -> Box<dyn ForecastService> {
    Box::new(DemoService::from_config(config, start))
}
