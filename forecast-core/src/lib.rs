//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The forecast screen and its grid layout
//! - The capabilities the screen talks through (data source, delegate)
//! - A service-backed data source that marshals results onto the UI thread
//! - Configuration handling
//!
//! The screen knows nothing about navigation or where its data comes from;
//! containers wire it up through [`ForecastDataSource`] and [`ForecastDelegate`].

pub mod capability;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod model;
pub mod screen;
pub mod service;
pub mod source;
pub mod task;
pub mod testing;

pub use capability::{ForecastCallback, ForecastDataSource, ForecastDelegate, LocationCallback};
pub use config::{Config, DemoConfig};
pub use error::{ForecastError, ScreenError};
pub use format::{AssetResolver, DateFormatter, GlyphResolver, PatternDateFormatter};
pub use layout::{GridMetrics, GridSpec};
pub use model::{Conditions, ForecastDay};
pub use screen::{ForecastCell, ForecastScreen, ScreenState};
pub use service::{ForecastService, service_from_config};
pub use source::{ServiceDataSource, UNKNOWN_LOCATION};
pub use task::Task;
