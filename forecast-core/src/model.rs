use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Classification of the weather for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conditions {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
    Windy,
}

impl Conditions {
    /// Human-readable label shown under the cell icon.
    pub fn displayable(&self) -> &'static str {
        match self {
            Conditions::Sunny => "Sunny",
            Conditions::PartlyCloudy => "Partly Cloudy",
            Conditions::Cloudy => "Cloudy",
            Conditions::Rain => "Rain",
            Conditions::Thunderstorm => "Thunderstorm",
            Conditions::Snow => "Snow",
            Conditions::Fog => "Fog",
            Conditions::Windy => "Windy",
        }
    }

    /// Icon identifier used when a forecast is generated without an explicit one.
    pub fn default_icon_name(&self) -> &'static str {
        match self {
            Conditions::Sunny => "sunny",
            Conditions::PartlyCloudy => "partly-cloudy",
            Conditions::Cloudy => "cloudy",
            Conditions::Rain => "rain",
            Conditions::Thunderstorm => "thunderstorm",
            Conditions::Snow => "snow",
            Conditions::Fog => "fog",
            Conditions::Windy => "windy",
        }
    }

    pub const fn all() -> &'static [Conditions] {
        &[
            Conditions::Sunny,
            Conditions::PartlyCloudy,
            Conditions::Cloudy,
            Conditions::Rain,
            Conditions::Thunderstorm,
            Conditions::Snow,
            Conditions::Fog,
            Conditions::Windy,
        ]
    }
}

impl std::fmt::Display for Conditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.displayable())
    }
}

/// One day of forecast. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub conditions: Conditions,
    pub icon_name: String,
}

impl ForecastDay {
    pub fn new(date: NaiveDate, conditions: Conditions, icon_name: impl Into<String>) -> Self {
        Self { date, conditions, icon_name: icon_name.into() }
    }

    /// Build a day whose icon is the default one for its conditions.
    pub fn with_default_icon(date: NaiveDate, conditions: Conditions) -> Self {
        Self::new(date, conditions, conditions.default_icon_name())
    }
}
