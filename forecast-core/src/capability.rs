//! The two seams between the forecast screen and the rest of the app.

use crate::error::ForecastError;
use crate::model::ForecastDay;

/// Completion for the location request. Cannot fail.
pub type LocationCallback = Box<dyn FnOnce(String)>;

/// Completion for the forecast request.
pub type ForecastCallback = Box<dyn FnOnce(Result<Vec<ForecastDay>, ForecastError>)>;

/// Supplies the data the screen displays.
///
/// Each method must invoke its completion exactly once, either before
/// returning or later on the UI thread.
pub trait ForecastDataSource {
    /// Display name of the current location. Implementations fall back to
    /// `"Unknown"` instead of failing.
    fn get_location(&self, completion: LocationCallback);

    fn get_forecast(&self, completion: ForecastCallback);
}

/// Receives the user's intents. Owns navigation.
pub trait ForecastDelegate {
    /// The user tapped a day for more details.
    fn details_requested(&self, day: &ForecastDay);

    /// The user tapped the help control.
    fn help_requested(&self);
}
