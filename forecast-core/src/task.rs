use serde::{Deserialize, Serialize};

/// The user tasks that compose the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// State of the app on cold launch. Cannot be switched to from another task.
    #[default]
    Startup,

    /// Log the user in.
    Login,

    /// Get a current weather forecast.
    Forecast,

    /// Get help and information about the app.
    Help,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Startup => "startup",
            Task::Login => "login",
            Task::Forecast => "forecast",
            Task::Help => "help",
        }
    }

    pub fn can_switch_to(&self, next: Task) -> bool {
        next != Task::Startup && next != *self
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
